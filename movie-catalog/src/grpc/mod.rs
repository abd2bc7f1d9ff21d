//! gRPC surface of the movie service
//!
//! The service and the gateway both live in this crate: [`service`] adapts the
//! repository to the generated `MoviesService` trait, [`client`] is what the
//! gateway calls it through.
//!
//! ## Middleware and Interceptors
//!
//! - **Trace id**: [`interceptors::trace_interceptor`] reads `x-tracer-id`
//!   metadata, logs it and stores a [`TraceContext`](crate::trace::TraceContext)
//!   in the request extensions
//! - **Tracing**: [`GrpcTracingLayer`] wraps every call in a span and logs
//!   duration and status
//! - **Health**: the standard `grpc.health.v1` service reports `MoviesService`
//!   as serving once the store is connected

pub mod client;
pub mod interceptors;
pub mod middleware;
pub mod server;
pub mod service;

/// Generated protobuf types and service stubs
#[allow(clippy::all, missing_docs)]
pub mod pb {
    tonic::include_proto!("movies.v1");
}

pub use client::MovieClient;
pub use interceptors::trace_interceptor;
pub use middleware::{GrpcTracingLayer, GrpcTracingService};
pub use server::GrpcServer;
pub use service::MovieRpcService;

use crate::ids::MovieId;
use crate::models::{Movie, NewMovie};

impl From<Movie> for pb::Movie {
    fn from(movie: Movie) -> Self {
        Self {
            id: movie.id.encode(),
            title: movie.title,
            director: movie.director,
            year: movie.year,
        }
    }
}

impl From<pb::Movie> for NewMovie {
    fn from(movie: pb::Movie) -> Self {
        Self {
            title: movie.title,
            director: movie.director,
            year: movie.year,
        }
    }
}

impl TryFrom<pb::Movie> for Movie {
    type Error = tonic::Status;

    fn try_from(movie: pb::Movie) -> Result<Self, Self::Error> {
        let id = MovieId::decode(&movie.id).map_err(|e| {
            tracing::error!(id = %movie.id, error = %e, "service returned a malformed movie id");
            tonic::Status::internal("malformed movie id in response")
        })?;
        Ok(NewMovie::from(movie).with_id(id))
    }
}
