//! # movie-catalog
//!
//! A movie catalog served through two cooperating processes:
//!
//! - **movies-gateway**: public HTTP/JSON API (axum) that validates requests,
//!   assigns a trace id, and calls the service over gRPC
//! - **movies-service**: gRPC service (tonic) that performs list, lookup and
//!   create against a SurrealDB table
//!
//! ## Error translation
//!
//! | Domain error      | gRPC status       | HTTP status |
//! |-------------------|-------------------|-------------|
//! | invalid argument  | `InvalidArgument` | 400         |
//! | not found         | `NotFound`        | 404         |
//! | store failure     | `Internal`        | 500         |
//!
//! ## Example
//!
//! ```rust,no_run
//! use movie_catalog::config::Config;
//! use movie_catalog::gateway::{self, GatewayState};
//! use movie_catalog::server::Server;
//!
//! #[tokio::main]
//! async fn main() -> movie_catalog::error::Result<()> {
//!     let config = Config::load()?;
//!     let state = GatewayState::from_config(&config.gateway)?;
//!     let app = gateway::router(state, config.gateway.timeout());
//!     Server::new(config.gateway).serve(app).await
//! }
//! ```

pub mod config;
pub mod error;
pub mod gateway;
pub mod grpc;
pub mod ids;
pub mod models;
pub mod observability;
pub mod pagination;
pub mod repository;
pub mod server;
pub mod store;
pub mod trace;
