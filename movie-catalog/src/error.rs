//! Process-level error types
//!
//! Request-path failures have their own structured types
//! ([`StoreError`](crate::store::StoreError),
//! [`RepositoryError`](crate::repository::RepositoryError),
//! [`ApiError`](crate::gateway::ApiError)). This type covers what can stop a
//! binary from starting or serving.

use crate::store::StoreError;

/// Result type alias for process-level operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the service and gateway binaries
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// I/O error (binding a listener, serving)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// gRPC transport error
    #[error("Transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    /// Document store bootstrap error
    #[error("{0}")]
    Store(#[from] StoreError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}
