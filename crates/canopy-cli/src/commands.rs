use std::sync::Arc;

use anyhow::Context;
use canopy_crypto::{DerivedKeys, Keys, SymmetricKey};
use canopy_dag::DocumentGraph;
use canopy_refs::{FileRootRegistry, RootRegistry};
use canopy_sdk::Canopy;
use canopy_store::{FsRemote, ObjectStore};
use canopy_types::{Address, Fields, NodeValue};
use colored::Colorize;
use serde_json::Value;
use tracing::debug;

use crate::cli::*;
use crate::config::CliConfig;

/// Everything a command needs, built from the global flags.
struct Env {
    store: Arc<ObjectStore>,
    registry: Arc<FileRootRegistry>,
    keys: Keys,
    account: String,
}

impl Env {
    async fn open(cli: &Cli) -> anyhow::Result<Self> {
        let config = CliConfig::load(cli.config.as_deref()).await?;
        let remote = FsRemote::open(&config.objects)
            .await
            .with_context(|| format!("opening objects in {}", config.objects.display()))?;
        let identity = cli
            .identity
            .as_deref()
            .map(|signature| -> anyhow::Result<DerivedKeys> {
                let bytes = hex::decode(signature.trim()).context("parsing --identity")?;
                Ok(DerivedKeys::from_signature(&bytes))
            })
            .transpose()?;
        let (keys, account) = resolve_identity(cli, identity.as_ref())?;
        debug!(
            account = %account,
            keys = keys.kind(),
            objects = %config.objects.display(),
            "opened environment"
        );
        Ok(Self {
            store: Arc::new(ObjectStore::with_config(Arc::new(remote), config.store)),
            registry: Arc::new(FileRootRegistry::new(config.registry)),
            keys,
            account,
        })
    }

    async fn document(&self, label: &str) -> anyhow::Result<Canopy> {
        let mut canopy = Canopy::new(self.store.clone(), self.registry.clone(), &self.account)?;
        canopy.open_root(label, self.keys.clone()).await?;
        Ok(canopy)
    }

    /// An address in text form, or the root published under a label.
    async fn target(&self, target: &str) -> anyhow::Result<Address> {
        if let Ok(address) = target.parse::<Address>() {
            return Ok(address);
        }
        Ok(self.registry.require(&self.account, target).await?)
    }
}

/// `--key` wins over identity-derived keys; `--account` wins over the
/// identity's account.
fn resolve_identity(cli: &Cli, identity: Option<&DerivedKeys>) -> anyhow::Result<(Keys, String)> {
    let keys = match (&cli.key, identity) {
        (Some(hex), _) => Keys::shared(SymmetricKey::from_hex(hex).context("parsing --key")?),
        (None, Some(identity)) => identity.for_self(),
        (None, None) => Keys::None,
    };
    let account = cli
        .account
        .clone()
        .or_else(|| identity.map(DerivedKeys::account_id))
        .unwrap_or_else(|| "default".to_string());
    Ok((keys, account))
}

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let env = Env::open(&cli).await?;
    match cli.command {
        Command::Init(args) => cmd_init(&env, args).await,
        Command::Put(args) => cmd_put(&env, args).await,
        Command::Cat(args) => cmd_cat(&env, args).await,
        Command::Walk(args) => cmd_walk(&env, args).await,
        Command::Add(args) => cmd_add(&env, args).await,
        Command::Set(args) => cmd_set(&env, args).await,
        Command::Rm(args) => cmd_rm(&env, args).await,
        Command::Root(args) => cmd_root(&env, args).await,
    }
}

fn to_fields(pairs: Vec<(String, Value)>) -> Fields {
    pairs.into_iter().collect()
}

fn print_root(canopy: &Canopy) -> anyhow::Result<()> {
    let label = canopy.label().unwrap_or_default();
    println!("  {} {}", format!("{label}:").bold(), canopy.root_address()?.to_string().yellow());
    Ok(())
}

async fn cmd_init(env: &Env, args: InitArgs) -> anyhow::Result<()> {
    let existing = env.registry.resolve(&env.account, &args.label).await?;
    let canopy = env.document(&args.label).await?;
    if existing.is_some() {
        println!("{} {} already exists", "!".yellow().bold(), args.label.bold());
    } else {
        println!("{} Created {}", "✓".green().bold(), args.label.bold());
    }
    print_root(&canopy)
}

async fn cmd_put(env: &Env, args: PutArgs) -> anyhow::Result<()> {
    let mut value = NodeValue::new(args.name);
    value.replace_fields(to_fields(args.fields));
    let block = env.store.encode(value)?;
    let address = env.store.persist(&block, &env.keys).await?;
    println!("{address}");
    Ok(())
}

async fn cmd_cat(env: &Env, args: CatArgs) -> anyhow::Result<()> {
    let address = env.target(&args.address).await?;
    let block = env.store.read(&address, &env.keys).await?;
    println!("{}", serde_json::to_string_pretty(block.value())?);
    Ok(())
}

async fn cmd_walk(env: &Env, args: WalkArgs) -> anyhow::Result<()> {
    let root = env.target(&args.target).await?;
    let mut graph = DocumentGraph::new(env.store.clone());
    let mut lines = Vec::new();
    graph
        .walk(&root, &env.keys, |node, depth| {
            let address = node.address().map(|a| a.short_hex()).unwrap_or_default();
            lines.push(format!(
                "{}{} {}",
                "  ".repeat(depth),
                node.name().bold(),
                address.dimmed()
            ));
        })
        .await?;
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

async fn cmd_add(env: &Env, args: AddArgs) -> anyhow::Result<()> {
    let mut canopy = env.document(&args.label).await?;
    let mut value = NodeValue::new(args.name.clone());
    value.replace_fields(to_fields(args.fields));
    canopy.add(&args.path, value).await?;
    println!("{} Added {}", "✓".green().bold(), args.name.bold());
    print_root(&canopy)
}

async fn cmd_set(env: &Env, args: SetArgs) -> anyhow::Result<()> {
    let mut canopy = env.document(&args.label).await?;
    let address = canopy.set(&args.path, to_fields(args.fields)).await?;
    println!("{} Updated {} {}", "✓".green().bold(), args.path.bold(), address.short_hex().dimmed());
    print_root(&canopy)
}

async fn cmd_rm(env: &Env, args: RmArgs) -> anyhow::Result<()> {
    let mut canopy = env.document(&args.label).await?;
    canopy.remove(&args.path).await?;
    println!("{} Removed {}", "✓".green().bold(), args.path.bold());
    print_root(&canopy)
}

async fn cmd_root(env: &Env, args: RootArgs) -> anyhow::Result<()> {
    match args.action {
        RootAction::Get { label } => {
            let address = env.registry.require(&env.account, &label).await?;
            println!("{address}");
        }
        RootAction::Set { label, address } => {
            let address: Address = address.parse()?;
            match env.registry.publish(&env.account, &label, address).await? {
                Some(previous) => println!(
                    "{} {} {} → {}",
                    "✓".green().bold(),
                    label.bold(),
                    previous.short_hex().dimmed(),
                    address.short_hex().yellow()
                ),
                None => println!("{} {} → {}", "✓".green().bold(), label.bold(), address.short_hex().yellow()),
            }
        }
        RootAction::Ls => {
            let roots = env.registry.list(&env.account).await?;
            if roots.is_empty() {
                println!("No published roots.");
            }
            for root in roots {
                println!(
                    "{}  {}  {}",
                    root.label.bold(),
                    root.address.to_string().yellow(),
                    root.published_at.to_string().dimmed()
                );
            }
        }
    }
    Ok(())
}
