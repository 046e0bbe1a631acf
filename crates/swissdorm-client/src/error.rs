use swissdorm_store::StoreError;
use thiserror::Error;

/// Errors produced by photo backends and the photo lifecycle manager.
#[derive(Error, Debug)]
pub enum PhotoError {
    #[error("Photo not found: {0}")]
    NotFound(String),

    #[error("Invalid photo filename: {0}")]
    InvalidName(String),

    /// The backend refused or failed the operation.
    #[error("Photo backend error: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Some photos of a batch operation failed; the listed filenames are
    /// still picked so the operation can be retried.
    #[error("{operation} failed for {} photo(s): {}", .failed.len(), .failed.join(", "))]
    Incomplete {
        operation: &'static str,
        failed: Vec<String>,
    },
}

/// Errors produced by the cached repositories.
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// The remote document store failed.
    #[error("Remote store error: {0}")]
    Remote(String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Cache error: {0}")]
    Cache(#[from] StoreError),
}

/// Errors surfaced while wiring up the client.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Photo(#[from] PhotoError),
}
