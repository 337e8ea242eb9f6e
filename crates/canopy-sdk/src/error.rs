use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("no document is open")]
    NotAttached,

    #[error("path not found: {0}")]
    PathNotFound(String),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("graph error: {0}")]
    Dag(#[from] canopy_dag::DagError),

    #[error("registry error: {0}")]
    Registry(#[from] canopy_refs::RegistryError),
}

pub type SdkResult<T> = Result<T, SdkError>;
