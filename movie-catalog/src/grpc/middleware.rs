//! gRPC middleware utilities
//!
//! Tower middleware applied to the tonic server with `Server::builder().layer(..)`.
//! It sees raw HTTP/2 requests, so the RPC method comes from the URI path.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use http::{Request, Response};
use tower::{Layer, Service};
use tracing::Instrument;

use crate::trace::{MISSING_TRACE_ID, TRACE_HEADER};

/// Tracing middleware layer for gRPC
///
/// Wraps each call in a `grpc_request` span carrying the service, method and
/// trace id, and logs the outcome with its duration.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrpcTracingLayer;

impl<S> Layer<S> for GrpcTracingLayer {
    type Service = GrpcTracingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        GrpcTracingService { inner }
    }
}

/// Tracing service implementation
#[derive(Debug, Clone)]
pub struct GrpcTracingService<S> {
    inner: S,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for GrpcTracingService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        // Call the instance that was polled ready
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        let trace_id = req
            .headers()
            .get(TRACE_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(MISSING_TRACE_ID)
            .to_string();
        let path = req.uri().path().to_string();

        let span = tracing::info_span!(
            "grpc_request",
            rpc.system = "grpc",
            rpc.service = %extract_service_name(&path),
            rpc.method = %extract_method_name(&path),
            x_tracer_id = %trace_id,
        );

        Box::pin(
            async move {
                let start = Instant::now();
                tracing::debug!(path = %path, "gRPC request started");

                let result = inner.call(req).await;
                let duration = start.elapsed();

                if let Ok(response) = &result {
                    // Trailers-only responses carry the status in the headers
                    let status = response
                        .headers()
                        .get("grpc-status")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("0");

                    if status == "0" {
                        tracing::info!(
                            duration_ms = duration.as_millis(),
                            grpc.status_code = status,
                            "gRPC request completed"
                        );
                    } else {
                        tracing::warn!(
                            duration_ms = duration.as_millis(),
                            grpc.status_code = status,
                            "gRPC request failed"
                        );
                    }
                } else {
                    tracing::error!(duration_ms = duration.as_millis(), "gRPC transport error");
                }

                result
            }
            .instrument(span),
        )
    }
}

/// Extract service name from gRPC method path
///
/// gRPC method paths are in the format: /package.Service/Method
fn extract_service_name(path: &str) -> &str {
    path.trim_start_matches('/')
        .split('/')
        .next()
        .and_then(|s| s.rsplit('.').next())
        .unwrap_or("unknown")
}

/// Extract method name from gRPC method path
fn extract_method_name(path: &str) -> &str {
    path.trim_start_matches('/')
        .split('/')
        .nth(1)
        .unwrap_or("unknown")
}
