//! Per-request trace identifiers
//!
//! The gateway assigns every inbound request a trace id (or keeps the one the
//! client sent in `x-tracer-id`), echoes it on the response and forwards it to
//! the movie service as gRPC metadata under the same key. The service reads it
//! back and logs it; it never rejects a call because the id is missing.
//!
//! The id travels as an explicit [`TraceContext`] value: handlers extract it,
//! hand it to the RPC client, and the service passes it down to the repository.

use std::convert::Infallible;
use std::fmt;

use axum::extract::FromRequestParts;
use http::request::Parts;
use http::{HeaderName, HeaderValue, Request};
use tonic::metadata::{MetadataMap, MetadataValue};
use tower::util::MapRequestLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use uuid::Uuid;

/// Header and metadata key carrying the trace id.
pub const TRACE_HEADER: &str = "x-tracer-id";

/// Logged by the service when a call arrives without trace metadata.
pub const MISSING_TRACE_ID: &str = "no-tracer-id";

/// The trace id of one inbound gateway request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TraceContext {
    trace_id: String,
}

impl TraceContext {
    /// Generates a fresh trace id.
    #[must_use]
    pub fn generate() -> Self {
        Self {
            trace_id: Uuid::new_v4().to_string(),
        }
    }

    /// Wraps a trace id received from upstream.
    #[must_use]
    pub fn from_id(trace_id: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
        }
    }

    /// Returns the trace id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.trace_id
    }

    /// Reads the trace id from incoming gRPC metadata.
    ///
    /// Falls back to [`MISSING_TRACE_ID`] when the caller sent none.
    #[must_use]
    pub fn from_metadata(metadata: &MetadataMap) -> Self {
        metadata
            .get(TRACE_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map_or_else(|| Self::from_id(MISSING_TRACE_ID), Self::from_id)
    }

    /// Reads the trace context of a gRPC request.
    ///
    /// Prefers the value stored by the trace interceptor, then the raw metadata.
    #[must_use]
    pub fn from_request<T>(request: &tonic::Request<T>) -> Self {
        request
            .extensions()
            .get::<TraceContext>()
            .cloned()
            .unwrap_or_else(|| Self::from_metadata(request.metadata()))
    }

    /// Attaches the trace id to an outgoing gRPC request.
    pub fn inject<T>(&self, request: &mut tonic::Request<T>) {
        match MetadataValue::try_from(self.trace_id.as_str()) {
            Ok(value) => {
                request.metadata_mut().insert(TRACE_HEADER, value);
            }
            Err(_) => {
                tracing::warn!(x_tracer_id = %self.trace_id, "trace id is not valid metadata, not forwarded");
            }
        }
    }

    fn from_header_value(value: &HeaderValue) -> Option<Self> {
        usable_trace_id(value).map(Self::from_id)
    }
}

/// The header value as a trace id, unless it is blank or not visible ASCII.
fn usable_trace_id(value: &HeaderValue) -> Option<&str> {
    value.to_str().ok().filter(|v| !v.trim().is_empty())
}

impl fmt::Display for TraceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.trace_id)
    }
}

impl<S> FromRequestParts<S> for TraceContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Same id the propagation layer echoes on the response
        let from_extension = parts
            .extensions
            .get::<RequestId>()
            .and_then(|id| Self::from_header_value(id.header_value()));
        let context = from_extension
            .or_else(|| parts.headers.get(TRACE_HEADER).and_then(Self::from_header_value))
            .unwrap_or_else(Self::generate);
        Ok(context)
    }
}

/// Generates trace ids for requests that arrive without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeTraceId;

impl MakeRequestId for MakeTraceId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = TraceContext::generate();
        let header_value = HeaderValue::from_str(id.as_str()).ok()?;
        Some(RequestId::new(header_value))
    }
}

fn trace_header() -> HeaderName {
    HeaderName::from_static(TRACE_HEADER)
}

/// Drops an inbound `x-tracer-id` that cannot be logged or forwarded.
///
/// Runs before [`trace_id_layer`], which then assigns a fresh id.
pub fn discard_unusable_trace_id<B>(mut request: Request<B>) -> Request<B> {
    let unusable = request
        .headers()
        .get(TRACE_HEADER)
        .is_some_and(|value| usable_trace_id(value).is_none());
    if unusable {
        request.headers_mut().remove(TRACE_HEADER);
    }
    request
}

type RequestMap = fn(axum::extract::Request) -> axum::extract::Request;

/// Layer form of [`discard_unusable_trace_id`] for the gateway router.
pub fn trace_id_cleanup_layer() -> MapRequestLayer<RequestMap> {
    MapRequestLayer::new(discard_unusable_trace_id as RequestMap)
}

/// Sets `x-tracer-id` on requests that lack one.
pub fn trace_id_layer() -> SetRequestIdLayer<MakeTraceId> {
    SetRequestIdLayer::new(trace_header(), MakeTraceId)
}

/// Copies `x-tracer-id` from the request onto the response.
pub fn trace_id_propagation_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(trace_header())
}
