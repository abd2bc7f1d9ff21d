//! Repository error types
//!
//! Repository failures fall into three kinds, and each maps to exactly one RPC
//! status code at the service boundary:
//!
//! ```rust
//! use movie_catalog::repository::{RepositoryError, RepositoryErrorKind};
//!
//! let error = RepositoryError::not_found("0190c9a4e5b77c3a8f1d2e3f4a5b6c7d");
//! assert_eq!(error.kind, RepositoryErrorKind::NotFound);
//! assert_eq!(tonic::Status::from(error).code(), tonic::Code::NotFound);
//! ```

use std::fmt;

use crate::ids::DecodeError;
use crate::models::FieldError;
use crate::pagination::ValidationError;
use crate::store::StoreError;

/// Operation being performed when the repository error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryOperation {
    /// Listing a page of movies
    List,
    /// Finding a single movie by ID
    GetById,
    /// Creating a new movie
    Create,
}

impl fmt::Display for RepositoryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => write!(f, "list"),
            Self::GetById => write!(f, "get_by_id"),
            Self::Create => write!(f, "create"),
        }
    }
}

/// Category of repository error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryErrorKind {
    /// Input was malformed; the caller can correct it
    InvalidArgument,
    /// The identifier was well-formed but no record matched
    NotFound,
    /// Store or infrastructure failure
    Internal,
}

impl fmt::Display for RepositoryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument => write!(f, "invalid_argument"),
            Self::NotFound => write!(f, "not_found"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

/// Structured repository error with operation context
///
/// `message` is for logs. Store failures and lookups reach clients only as
/// the generic text chosen by the `tonic::Status` conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryError {
    /// The operation being performed when the error occurred
    pub operation: RepositoryOperation,
    /// The category of error
    pub kind: RepositoryErrorKind,
    /// Detailed error message
    pub message: String,
    /// The external ID of the movie involved
    pub entity_id: Option<String>,
}

impl RepositoryError {
    /// Create a new repository error
    pub fn new(
        operation: RepositoryOperation,
        kind: RepositoryErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            entity_id: None,
        }
    }

    /// Create a "not found" error for a lookup
    pub fn not_found(entity_id: impl Into<String>) -> Self {
        Self {
            operation: RepositoryOperation::GetById,
            kind: RepositoryErrorKind::NotFound,
            message: "Movie not found".to_string(),
            entity_id: Some(entity_id.into()),
        }
    }

    /// Create an error for an identifier that failed to decode
    pub fn invalid_id(entity_id: impl Into<String>, err: &DecodeError) -> Self {
        Self {
            operation: RepositoryOperation::GetById,
            kind: RepositoryErrorKind::InvalidArgument,
            message: err.to_string(),
            entity_id: Some(entity_id.into()),
        }
    }

    /// Create an error for rejected pagination input
    pub fn invalid_page(err: ValidationError) -> Self {
        Self::new(
            RepositoryOperation::List,
            RepositoryErrorKind::InvalidArgument,
            err.to_string(),
        )
    }

    /// Create an error for a movie that failed field validation
    pub fn invalid_movie(err: FieldError) -> Self {
        Self::new(
            RepositoryOperation::Create,
            RepositoryErrorKind::InvalidArgument,
            err.to_string(),
        )
    }

    /// Create an internal error from a store failure
    pub fn store(operation: RepositoryOperation, err: &StoreError) -> Self {
        Self::new(operation, RepositoryErrorKind::Internal, err.to_string())
    }

    /// Attach the ID of the movie involved
    #[must_use]
    pub fn with_entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Repository {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        if let Some(ref id) = self.entity_id {
            write!(f, " [movie: {}]", id)?;
        }
        Ok(())
    }
}

impl std::error::Error for RepositoryError {}

impl From<RepositoryError> for tonic::Status {
    fn from(err: RepositoryError) -> Self {
        match err.kind {
            RepositoryErrorKind::InvalidArgument => match err.operation {
                RepositoryOperation::GetById => tonic::Status::invalid_argument("Invalid ID"),
                // Validation messages are client-facing already
                _ => tonic::Status::invalid_argument(err.message),
            },
            RepositoryErrorKind::NotFound => tonic::Status::not_found("Movie not found"),
            RepositoryErrorKind::Internal => tonic::Status::internal("Internal error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{StoreErrorKind, StoreOperation};

    #[test]
    fn test_display_with_entity() {
        let err = RepositoryError::not_found("abc");
        assert_eq!(
            err.to_string(),
            "Repository not_found error during get_by_id: Movie not found [movie: abc]"
        );
    }

    #[test]
    fn test_status_mapping() {
        let invalid = RepositoryError::invalid_id("zz", &DecodeError::InvalidLength {
            expected: 32,
            actual: 2,
        });
        let status = tonic::Status::from(invalid);
        assert_eq!(status.code(), tonic::Code::InvalidArgument);
        assert_eq!(status.message(), "Invalid ID");

        let status = tonic::Status::from(RepositoryError::not_found("abc"));
        assert_eq!(status.code(), tonic::Code::NotFound);
        assert_eq!(status.message(), "Movie not found");

        let store_err = StoreError::new(
            StoreOperation::Find,
            StoreErrorKind::ConnectionFailed,
            "connection refused by 10.0.0.5",
        );
        let status = tonic::Status::from(RepositoryError::store(RepositoryOperation::List, &store_err));
        assert_eq!(status.code(), tonic::Code::Internal);
        assert_eq!(status.message(), "Internal error");
    }

    #[test]
    fn test_validation_messages_pass_through() {
        let status = tonic::Status::from(RepositoryError::invalid_page(ValidationError::InvalidPerPage));
        assert_eq!(status.code(), tonic::Code::InvalidArgument);
        assert_eq!(status.message(), "invalid per_page");

        let status = tonic::Status::from(RepositoryError::invalid_movie(FieldError::MissingDirector));
        assert_eq!(status.code(), tonic::Code::InvalidArgument);
        assert_eq!(status.message(), "director is required");
    }

    #[test]
    fn test_internal_detail_not_leaked() {
        let store_err = StoreError::new(
            StoreOperation::Insert,
            StoreErrorKind::QueryFailed,
            "secret table layout",
        );
        let err = RepositoryError::store(RepositoryOperation::Create, &store_err);
        assert!(err.message.contains("secret table layout"));
        assert!(!tonic::Status::from(err).message().contains("secret"));
    }
}
