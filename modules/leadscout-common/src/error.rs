use thiserror::Error;

#[derive(Error, Debug)]
pub enum LeadScoutError {
    #[error("Upstream fetch failed: {0}")]
    UpstreamFetch(String),

    #[error("Storage conflict: {0}")]
    StorageConflict(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Ingestion run cancelled")]
    Cancelled,

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
