//! Document-store port for movie records
//!
//! [`MovieStore`] is the narrow set of store operations the repository needs:
//! a skip/limit scan, an estimated count, an exact-match lookup and an insert.
//! Implementations must be safe to share between concurrent requests.
//!
//! Failures are reported as [`StoreError`], which records the operation being
//! performed and a coarse category. "No matching record" is not an error at
//! this level; lookups return `Ok(None)`.

pub mod surreal;

use std::fmt;
use std::future::Future;

use crate::ids::MovieId;
use crate::models::{Movie, NewMovie};

pub use surreal::SurrealMovieStore;

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Storage operations backing the movie repository.
pub trait MovieStore: Send + Sync {
    /// Returns up to `limit` records after skipping `skip`, in store order.
    fn find_page(&self, skip: u64, limit: u64)
        -> impl Future<Output = StoreResult<Vec<Movie>>> + Send;

    /// Returns an estimate of the number of records in the collection.
    fn estimated_count(&self) -> impl Future<Output = StoreResult<u64>> + Send;

    /// Looks up a record by identifier.
    fn find_by_id(&self, id: &MovieId) -> impl Future<Output = StoreResult<Option<Movie>>> + Send;

    /// Inserts a record under the given identifier.
    fn insert(&self, id: MovieId, movie: NewMovie)
        -> impl Future<Output = StoreResult<Movie>> + Send;
}

/// Store operation being performed when the error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    /// Establishing the connection
    Connect,
    /// Scanning a page of records
    Find,
    /// Counting records
    Count,
    /// Looking up a single record
    FindOne,
    /// Inserting a record
    Insert,
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect => write!(f, "connect"),
            Self::Find => write!(f, "find"),
            Self::Count => write!(f, "count"),
            Self::FindOne => write!(f, "find_one"),
            Self::Insert => write!(f, "insert"),
        }
    }
}

/// Category of store error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreErrorKind {
    /// The store could not be reached
    ConnectionFailed,
    /// Credentials were rejected
    AuthenticationFailed,
    /// The query was rejected or failed to execute
    QueryFailed,
    /// A stored record could not be decoded
    Decode,
    /// Operation timed out
    Timeout,
}

impl fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionFailed => write!(f, "connection_failed"),
            Self::AuthenticationFailed => write!(f, "authentication_failed"),
            Self::QueryFailed => write!(f, "query_failed"),
            Self::Decode => write!(f, "decode"),
            Self::Timeout => write!(f, "timeout"),
        }
    }
}

/// Structured store error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    /// The operation being performed when the error occurred
    pub operation: StoreOperation,
    /// The category of error
    pub kind: StoreErrorKind,
    /// Detail from the store driver; never shown to clients
    pub message: String,
}

impl StoreError {
    /// Create a new store error
    pub fn new(operation: StoreOperation, kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
        }
    }

    /// Create a decode error for a record the store returned
    pub fn decode(operation: StoreOperation, message: impl Into<String>) -> Self {
        Self::new(operation, StoreErrorKind::Decode, message)
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Store {} error during {}: {}",
            self.kind, self.operation, self.message
        )
    }
}

impl std::error::Error for StoreError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::new(
            StoreOperation::FindOne,
            StoreErrorKind::ConnectionFailed,
            "connection refused",
        );
        assert_eq!(
            err.to_string(),
            "Store connection_failed error during find_one: connection refused"
        );
    }

    #[test]
    fn test_decode_constructor() {
        let err = StoreError::decode(StoreOperation::Find, "bad year");
        assert_eq!(err.kind, StoreErrorKind::Decode);
        assert_eq!(err.operation, StoreOperation::Find);
    }

    #[test]
    fn test_operation_display() {
        assert_eq!(StoreOperation::Connect.to_string(), "connect");
        assert_eq!(StoreOperation::Find.to_string(), "find");
        assert_eq!(StoreOperation::Count.to_string(), "count");
        assert_eq!(StoreOperation::FindOne.to_string(), "find_one");
        assert_eq!(StoreOperation::Insert.to_string(), "insert");
    }
}
