use movie_catalog::{
    config::Config,
    error::Result,
    gateway::{self, GatewayState},
    observability::init_tracing,
    server::Server,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    init_tracing(&config)?;

    let state = GatewayState::from_config(&config.gateway)?;
    let app = gateway::router(state, config.gateway.timeout());

    tracing::info!("  GET  /       - List movies (page, per_page)");
    tracing::info!("  GET  /{{id}}  - Get movie");
    tracing::info!("  POST /       - Create movie");

    Server::new(config.gateway).serve(app).await
}
