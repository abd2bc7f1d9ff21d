//! API error types for gateway handlers
//!
//! Every gateway failure renders as `{"error": "<reason>"}`. RPC outcomes are translated uniformly: `InvalidArgument` is
//! 400, `NotFound` is 404, anything else (including transport failures) is 500.
//!
//! ```rust
//! use movie_catalog::gateway::{ApiError, ApiErrorKind, ApiOperation};
//!
//! let error = ApiError::from_status(ApiOperation::Get, &tonic::Status::not_found("Movie not found"));
//! assert_eq!(error.kind, ApiErrorKind::NotFound);
//! assert_eq!(error.message, "movie not found");
//! ```

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::trace::TraceContext;

/// Operation being performed when the API error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOperation {
    /// Listing movies
    List,
    /// Getting a single movie by ID
    Get,
    /// Creating a new movie
    Create,
    /// Routing, before any handler ran
    Route,
}

impl fmt::Display for ApiOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => write!(f, "list"),
            Self::Get => write!(f, "get"),
            Self::Create => write!(f, "create"),
            Self::Route => write!(f, "route"),
        }
    }
}

/// Category of API error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    /// Invalid request format or parameters
    BadRequest,
    /// Movie or route was not found
    NotFound,
    /// Route exists but not for this method
    MethodNotAllowed,
    /// Internal server error
    InternalError,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadRequest => write!(f, "bad_request"),
            Self::NotFound => write!(f, "not_found"),
            Self::MethodNotAllowed => write!(f, "method_not_allowed"),
            Self::InternalError => write!(f, "internal_error"),
        }
    }
}

impl ApiErrorKind {
    /// Get the HTTP status code for this error kind
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Structured API error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// The operation being performed when the error occurred
    pub operation: ApiOperation,
    /// The category of error
    pub kind: ApiErrorKind,
    /// Client-facing reason
    pub message: String,
    /// Upstream detail, logged but never rendered
    pub detail: Option<String>,
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Client-facing reason
    pub error: String,
}

impl ApiError {
    /// Create a new API error
    pub fn new(operation: ApiOperation, kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            detail: None,
        }
    }

    /// Create a bad request error
    pub fn bad_request(operation: ApiOperation, message: impl Into<String>) -> Self {
        Self::new(operation, ApiErrorKind::BadRequest, message)
    }

    /// Translate an RPC failure
    pub fn from_status(operation: ApiOperation, status: &tonic::Status) -> Self {
        let (kind, message) = match status.code() {
            tonic::Code::InvalidArgument => (ApiErrorKind::BadRequest, "invalid argument"),
            tonic::Code::NotFound => (ApiErrorKind::NotFound, "movie not found"),
            _ => (ApiErrorKind::InternalError, "internal server error"),
        };
        Self {
            operation,
            kind,
            message: message.to_string(),
            detail: Some(format!("{:?}: {}", status.code(), status.message())),
        }
    }

    /// Attach upstream detail for the log
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Log the rejection with its trace id
    #[must_use]
    pub fn logged(self, trace: &TraceContext) -> Self {
        let detail = self.detail.as_deref().unwrap_or("");
        match self.kind {
            ApiErrorKind::InternalError => tracing::error!(
                x_tracer_id = %trace,
                operation = %self.operation,
                error = %self.message,
                detail,
                "request failed"
            ),
            _ => tracing::warn!(
                x_tracer_id = %trace,
                operation = %self.operation,
                error = %self.message,
                detail,
                "request rejected"
            ),
        }
        self
    }

    /// Get the HTTP status code
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.kind.status_code()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "API {} error during {}: {}",
            self.kind, self.operation, self.message
        )
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
        };
        (self.kind.status_code(), Json(body)).into_response()
    }
}
