//! Shared gateway state

use crate::config::GatewayConfig;
use crate::error::Result;
use crate::grpc::MovieClient;

/// State handed to every gateway handler
#[derive(Debug, Clone)]
pub struct GatewayState {
    /// Client for the movie service
    pub client: MovieClient,
    /// Largest accepted `per_page`, if capped
    pub max_per_page: Option<u32>,
}

impl GatewayState {
    /// Create state around an existing client
    pub fn new(client: MovieClient, max_per_page: Option<u32>) -> Self {
        Self {
            client,
            max_per_page,
        }
    }

    /// Build state from configuration; the backend is dialed lazily
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        let client = MovieClient::connect_lazy(&config.backend_url, config.timeout())?;
        Ok(Self::new(client, config.max_per_page))
    }
}
