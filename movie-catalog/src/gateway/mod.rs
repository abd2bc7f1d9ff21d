//! Public HTTP gateway
//!
//! | Method | Path    | Success body              |
//! |--------|---------|---------------------------|
//! | GET    | `/`     | `{"movies": [..], "total": n}` |
//! | GET    | `/{id}` | `{"movie": {..}}`         |
//! | POST   | `/`     | `{"movie": {..}, "id": ".."}` |
//!
//! Every response carries `x-tracer-id`: the inbound value when the client
//! sent a usable one, a fresh UUID otherwise. Every response body is JSON,
//! including those produced by routing and middleware.

mod error;
pub mod handlers;
mod state;

pub use error::{ApiError, ApiErrorKind, ApiOperation, ErrorBody};
pub use state::GatewayState;

use std::time::Duration;

use axum::{
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

use crate::trace::{trace_id_cleanup_layer, trace_id_layer, trace_id_propagation_layer};

/// Largest accepted request body
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Extra time the HTTP timeout allows past the RPC deadline
///
/// A stalled backend then fails as an RPC error (500) instead of a 408.
pub const RPC_DEADLINE_MARGIN: Duration = Duration::from_secs(1);

/// Build the gateway router with its middleware stack
///
/// `timeout` is the RPC deadline; the HTTP request timeout is
/// `timeout + RPC_DEADLINE_MARGIN`.
pub fn router(state: GatewayState, timeout: Duration) -> Router {
    Router::new()
        .route("/", get(handlers::list_movies).post(handlers::create_movie))
        .route("/{id}", get(handlers::get_movie))
        .fallback(handlers::route_not_found)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .with_state(state)
        // Layers run outermost-last: the trace id is set before anything else
        .layer(CatchPanicLayer::new())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout + RPC_DEADLINE_MARGIN,
        ))
        .layer(middleware::map_response(json_error_body))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(trace_id_propagation_layer())
        .layer(trace_id_layer())
        .layer(trace_id_cleanup_layer())
}

/// Replaces a non-JSON error body from middleware with `{"error": "<reason>"}`
async fn json_error_body(response: Response) -> Response {
    let status = response.status();
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .is_some_and(|v| v.as_bytes().starts_with(b"application/json"));
    if is_json || !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let reason = status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_ascii_lowercase();
    tracing::warn!(status = status.as_u16(), error = %reason, "middleware rejected request");
    (status, Json(ErrorBody { error: reason })).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use serde_json::{json, Value};
    use tokio::net::TcpListener;
    use tower::ServiceExt;

    use crate::config::{GrpcConfig, StoreConfig};
    use crate::grpc::{GrpcServer, MovieClient};
    use crate::repository::MovieRepository;
    use crate::store::SurrealMovieStore;
    use crate::trace::TRACE_HEADER;

    const TIMEOUT: Duration = Duration::from_secs(5);

    /// Starts a movie service on an ephemeral port over an empty in-memory store.
    async fn backend() -> MovieClient {
        let store = SurrealMovieStore::connect(&StoreConfig::default()).await.unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(GrpcServer::new(GrpcConfig::default()).serve_with_listener(
            MovieRepository::new(store),
            listener,
            std::future::pending(),
        ));

        MovieClient::connect_lazy(&format!("http://{addr}"), TIMEOUT).unwrap()
    }

    async fn app() -> Router {
        router(GatewayState::new(backend().await, None), TIMEOUT)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn post_json(body: &Value) -> Request<Body> {
        Request::post("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_echoes_input_and_assigns_id() {
        let app = app().await;
        let (status, body) = send(
            &app,
            post_json(&json!({"title": "Inception", "director": "Nolan", "year": 2010})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["movie"]["title"], "Inception");
        assert_eq!(body["movie"]["director"], "Nolan");
        assert_eq!(body["movie"]["year"], 2010);
        let id = body["id"].as_str().unwrap();
        assert_eq!(id.len(), 32);
        assert_eq!(body["movie"]["id"], id);

        let (status, found) = send(&app, get_req(&format!("/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(found["movie"], body["movie"]);
    }

    #[tokio::test]
    async fn test_get_missing_movie_is_404() {
        let app = app().await;
        let id = crate::ids::MovieId::new().encode();
        let (status, body) = send(&app, get_req(&format!("/{id}"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "movie not found"}));
    }

    #[tokio::test]
    async fn test_get_malformed_id_is_400() {
        let app = app().await;
        let (status, body) = send(&app, get_req("/not-a-valid-id")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "invalid argument"}));

        let (status, body) = send(&app, get_req("/%20")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "id is required"}));
    }

    #[tokio::test]
    async fn test_list_rejects_bad_pagination() {
        let app = app().await;
        let cases = [
            ("/?per_page=abc", "invalid per_page"),
            ("/?page=abc", "invalid page"),
            ("/?page=0", "invalid page"),
            ("/?page=-1&per_page=10", "invalid page"),
            ("/?page=1&per_page=0", "invalid per_page"),
            ("/?per_page=3000000000", "invalid per_page"),
        ];
        for (uri, reason) in cases {
            let (status, body) = send(&app, get_req(uri)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body, json!({"error": reason}), "{uri}");
        }
    }

    #[tokio::test]
    async fn test_list_defaults_and_total() {
        let app = app().await;
        for n in 0..5 {
            let (status, _) = send(
                &app,
                post_json(&json!({"title": format!("Movie {n}"), "director": "X", "year": 2000 + n})),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) = send(&app, get_req("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["movies"].as_array().unwrap().len(), 5);
        assert_eq!(body["total"], 5);

        let (status, body) = send(&app, get_req("/?page=2&per_page=1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["movies"].as_array().unwrap().len(), 1);
        assert_eq!(body["total"], 5);

        let (_, body) = send(&app, get_req("/?page=9&per_page=10")).await;
        assert!(body["movies"].as_array().unwrap().is_empty());
        assert_eq!(body["total"], 5);
    }

    #[tokio::test]
    async fn test_create_field_validation() {
        let app = app().await;
        let cases = [
            (json!({"title": "", "director": "X", "year": 2000}), "title is required"),
            (json!({"director": "X", "year": 2000}), "title is required"),
            (json!({"title": "T", "director": "", "year": 2000}), "director is required"),
            (json!({"title": "T", "director": "X", "year": 0}), "year is required"),
            (json!({"title": "T", "director": "X"}), "year is required"),
            (json!({"title": "T", "director": "X", "year": -5}), "invalid year"),
            (json!({"title": "T", "director": "X", "year": "2000"}), "invalid request body"),
            (json!(["not", "an", "object"]), "invalid request body"),
        ];
        for (input, reason) in cases {
            let (status, body) = send(&app, post_json(&input)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{input}");
            assert_eq!(body, json!({"error": reason}), "{input}");
        }
    }

    #[tokio::test]
    async fn test_create_rejects_non_json() {
        let app = app().await;
        let request = Request::post("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "invalid request body"}));
    }

    #[tokio::test]
    async fn test_trace_id_echoed_or_generated() {
        let app = app().await;

        let request = Request::get("/")
            .header(TRACE_HEADER, "client-trace-1")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.headers().get(TRACE_HEADER).unwrap(), "client-trace-1");

        let response = app.clone().oneshot(get_req("/?page=x")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let generated = response.headers().get(TRACE_HEADER).unwrap().to_str().unwrap();
        assert!(uuid::Uuid::parse_str(generated).is_ok());
    }

    #[tokio::test]
    async fn test_max_per_page_cap() {
        let app = router(GatewayState::new(backend().await, Some(50)), TIMEOUT);

        let (status, body) = send(&app, get_req("/?per_page=51")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "invalid per_page"}));

        let (status, _) = send(&app, get_req("/?per_page=50")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_backend_unreachable_is_500() {
        let client = MovieClient::connect_lazy("http://127.0.0.1:1", TIMEOUT).unwrap();
        let app = router(GatewayState::new(client, None), TIMEOUT);

        let (status, body) = send(&app, get_req("/")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "internal server error"}));
    }

    #[tokio::test]
    async fn test_undecodable_path_id_is_json_400() {
        let app = app().await;
        let (status, body) = send(&app, get_req("/%FF")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "invalid argument"}));
    }

    #[tokio::test]
    async fn test_unknown_route_and_method_are_json() {
        let app = app().await;

        let (status, body) = send(&app, get_req("/a/b")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "not found"}));

        let id = crate::ids::MovieId::new().encode();
        let request = Request::post(format!("/{id}")).body(Body::empty()).unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, json!({"error": "method not allowed"}));

        let request = Request::delete("/").body(Body::empty()).unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_oversized_body_is_json_413() {
        let app = app().await;
        let payload = "x".repeat(MAX_BODY_BYTES + 1);
        let request = Request::post("/")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::CONTENT_LENGTH, payload.len())
            .body(Body::from(payload))
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_bare_middleware_errors_become_json() {
        let response = json_error_body(StatusCode::REQUEST_TIMEOUT.into_response()).await;
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({"error": "request timeout"}));

        let ok = json_error_body(StatusCode::NO_CONTENT.into_response()).await;
        assert!(ok.headers().get(header::CONTENT_TYPE).is_none());
    }

    #[tokio::test]
    async fn test_unusable_trace_id_is_replaced() {
        let app = app().await;
        for value in [
            axum::http::HeaderValue::from_static(""),
            axum::http::HeaderValue::from_bytes(&[0xc3, 0xa9]).unwrap(),
        ] {
            let request = Request::get("/?page=x")
                .header(TRACE_HEADER, value.clone())
                .body(Body::empty())
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let echoed = response.headers().get(TRACE_HEADER).unwrap().to_str().unwrap();
            assert!(uuid::Uuid::parse_str(echoed).is_ok(), "{value:?}");
        }
    }

    #[tokio::test]
    async fn test_stalled_backend_is_500() {
        // Accepts connections and never answers
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });

        let timeout = Duration::from_millis(500);
        let client = MovieClient::connect_lazy(&format!("http://{addr}"), timeout).unwrap();
        let app = router(GatewayState::new(client, None), timeout);

        let (status, body) = send(&app, get_req("/")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "internal server error"}));
    }
}
