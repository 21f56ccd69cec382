use std::sync::Arc;
use tokio::sync::RwLock;

use crate::clients::{GeminiClient, ModelGateway};
use crate::config::Config;
use crate::db::Store;
use crate::services::{EnhancementService, GeminiEnhancementService};

/// Build a shared HTTP client with reasonable defaults for API calls.
/// The timeout bounds every provider round trip; the client is constructed
/// once and reused so connections are pooled instead of re-established.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent("Echo/1.0")
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub gateway: Arc<dyn ModelGateway>,

    pub enhancement_service: Arc<dyn EnhancementService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = build_shared_http_client(config.gemini.request_timeout_seconds)?;
        let gateway: Arc<dyn ModelGateway> =
            Arc::new(GeminiClient::new(http_client, &config.gemini));

        Self::with_gateway(config, gateway).await
    }

    /// Construct state around a caller-supplied gateway; tests use this to
    /// script provider behavior without touching the network.
    pub async fn with_gateway(
        config: Config,
        gateway: Arc<dyn ModelGateway>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let enhancement_service: Arc<dyn EnhancementService> = Arc::new(
            GeminiEnhancementService::new(store.clone(), gateway.clone()),
        );

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            gateway,
            enhancement_service,
        })
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
