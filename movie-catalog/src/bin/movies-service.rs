use movie_catalog::{
    config::Config,
    error::Result,
    grpc::GrpcServer,
    observability::init_tracing,
    repository::MovieRepository,
    server::shutdown_signal,
    store::SurrealMovieStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    init_tracing(&config)?;

    tracing::info!(
        "Starting {} movie service on port {}",
        config.service.name,
        config.grpc.port
    );

    // Fail fast: the health service only reports serving once this succeeds
    let store = SurrealMovieStore::connect(&config.store).await?;
    let repository = MovieRepository::new(store);

    tracing::info!("gRPC server: MoviesService (GetMovies, GetMovieById, CreateMovie), grpc.health.v1");

    GrpcServer::new(config.grpc)
        .serve(repository, shutdown_signal())
        .await?;

    tracing::info!("Movie service stopped gracefully");
    Ok(())
}
