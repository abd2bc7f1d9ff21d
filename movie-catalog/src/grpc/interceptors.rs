//! gRPC interceptors for cross-cutting concerns

use tonic::{Request, Status};

use crate::trace::TraceContext;

/// Trace interceptor
///
/// Reads `x-tracer-id` from the call metadata, logs it, and stores the
/// resulting [`TraceContext`] in the request extensions for the handler.
/// A missing id is logged as `no-tracer-id`; calls are never rejected here.
pub fn trace_interceptor(mut req: Request<()>) -> Result<Request<()>, Status> {
    let trace = TraceContext::from_metadata(req.metadata());

    tracing::info!(x_tracer_id = %trace, "gRPC request received");

    req.extensions_mut().insert(trace);
    Ok(req)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{MISSING_TRACE_ID, TRACE_HEADER};

    #[test]
    fn test_trace_id_stored_in_extensions() {
        let mut req = Request::new(());
        req.metadata_mut()
            .insert(TRACE_HEADER, "abc-123".parse().unwrap());

        let req = trace_interceptor(req).unwrap();
        let trace = req.extensions().get::<TraceContext>().unwrap();
        assert_eq!(trace.as_str(), "abc-123");
    }

    #[test]
    fn test_missing_trace_id_is_not_rejected() {
        let req = trace_interceptor(Request::new(())).unwrap();
        let trace = req.extensions().get::<TraceContext>().unwrap();
        assert_eq!(trace.as_str(), MISSING_TRACE_ID);
    }
}
