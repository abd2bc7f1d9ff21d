//! gRPC server implementation

use std::future::Future;
use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;

use super::interceptors::trace_interceptor;
use super::middleware::GrpcTracingLayer;
use super::pb::movies_service_server::MoviesServiceServer;
use super::service::MovieRpcService;
use crate::config::GrpcConfig;
use crate::error::Result;
use crate::repository::MovieRepository;
use crate::store::MovieStore;

/// gRPC server for the movie service
///
/// Serves `MoviesService` behind the trace interceptor and tracing layer,
/// alongside the standard health service.
#[derive(Debug)]
pub struct GrpcServer {
    config: GrpcConfig,
}

impl GrpcServer {
    /// Create a new gRPC server with the given configuration
    pub fn new(config: GrpcConfig) -> Self {
        Self { config }
    }

    /// Get the socket address for the gRPC server
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.config.port))
    }

    /// Bind the configured port and serve until `shutdown` resolves
    pub async fn serve<S, F>(self, repository: MovieRepository<S>, shutdown: F) -> Result<()>
    where
        S: MovieStore + 'static,
        F: Future<Output = ()> + Send,
    {
        let addr = self.socket_addr();
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("gRPC server listening on {}", addr);

        self.serve_with_listener(repository, listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve_with_listener<S, F>(
        self,
        repository: MovieRepository<S>,
        listener: TcpListener,
        shutdown: F,
    ) -> Result<()>
    where
        S: MovieStore + 'static,
        F: Future<Output = ()> + Send,
    {
        let (health_reporter, health_service) = tonic_health::server::health_reporter();
        health_reporter
            .set_serving::<MoviesServiceServer<MovieRpcService<S>>>()
            .await;

        let movies = MoviesServiceServer::with_interceptor(
            MovieRpcService::new(repository),
            trace_interceptor,
        );

        Server::builder()
            .timeout(self.config.timeout())
            .layer(GrpcTracingLayer)
            .add_service(health_service)
            .add_service(movies)
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown)
            .await?;

        tracing::info!("gRPC server shutdown complete");
        Ok(())
    }
}
