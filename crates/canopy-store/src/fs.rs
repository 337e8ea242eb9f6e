//! Directory-backed remote: one file per object plus a `pins` file.
//!
//! Layout under the root directory:
//!
//! ```text
//! objects/<address>   encoded block bytes, named by the address text form
//! pins                one pinned address per line
//! ```

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use canopy_crypto::ContentHasher;
use canopy_types::Address;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use crate::block::RawBlock;
use crate::error::{StoreError, StoreResult};
use crate::remote::RemoteProvider;

const OBJECTS_DIR: &str = "objects";
const PINS_FILE: &str = "pins";

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Filesystem remote provider.
#[derive(Debug)]
pub struct FsRemote {
    root: PathBuf,
    pins: Mutex<()>,
}

impl FsRemote {
    /// Open (creating if needed) a store rooted at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(root.join(OBJECTS_DIR))
            .await
            .map_err(StoreError::remote)?;
        Ok(Self {
            root,
            pins: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, address: &Address) -> PathBuf {
        self.root.join(OBJECTS_DIR).join(address.to_string())
    }

    /// Currently pinned addresses.
    pub async fn pinned(&self) -> StoreResult<BTreeSet<String>> {
        let _guard = self.pins.lock().await;
        self.read_pins().await
    }

    async fn read_pins(&self) -> StoreResult<BTreeSet<String>> {
        match fs::read_to_string(self.root.join(PINS_FILE)).await {
            Ok(text) => Ok(text
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeSet::new()),
            Err(e) => Err(StoreError::remote(e)),
        }
    }

    async fn write_pins(&self, pins: &BTreeSet<String>) -> StoreResult<()> {
        let mut text = String::new();
        for pin in pins {
            text.push_str(pin);
            text.push('\n');
        }
        write_atomic(&self.root.join(PINS_FILE), text.as_bytes()).await
    }
}

/// Write through a temp file unique to this call, then rename into place.
async fn write_atomic(path: &Path, bytes: &[u8]) -> StoreResult<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(format!(
        ".{}.{}.tmp",
        std::process::id(),
        TMP_SEQ.fetch_add(1, Ordering::Relaxed)
    ));
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, bytes).await.map_err(StoreError::remote)?;
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(StoreError::remote(e));
    }
    Ok(())
}

#[async_trait]
impl RemoteProvider for FsRemote {
    async fn get(&self, address: &Address) -> StoreResult<Option<Vec<u8>>> {
        match fs::read(self.object_path(address)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::remote(e)),
        }
    }

    async fn put(&self, block: &RawBlock) -> StoreResult<Address> {
        let address =
            ContentHasher::new(block.codec(), block.address().hash_alg()).hash(block.bytes());
        let path = self.object_path(&address);
        if fs::try_exists(&path).await.map_err(StoreError::remote)? {
            return Ok(address);
        }
        write_atomic(&path, block.bytes()).await?;
        debug!(address = %address, bytes = block.len(), "wrote object file");
        Ok(address)
    }

    async fn pin(&self, address: &Address) -> StoreResult<()> {
        let _guard = self.pins.lock().await;
        let mut pins = self.read_pins().await?;
        if pins.insert(address.to_string()) {
            self.write_pins(&pins).await?;
        }
        Ok(())
    }

    async fn unpin(&self, address: &Address) -> StoreResult<()> {
        let _guard = self.pins.lock().await;
        let mut pins = self.read_pins().await?;
        if pins.remove(&address.to_string()) {
            self.write_pins(&pins).await?;
        }
        Ok(())
    }
}
