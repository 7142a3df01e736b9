use crate::captcha::{CapSolverBroker, TokenBroker};
use crate::core::config::SeoConfig;
use crate::core::tools_registry::ToolRegistry;
use crate::signature_cache::SignatureCache;
use std::env;
use std::sync::Arc;
use std::time::Duration;

/// Everything a tool call needs, assembled once at startup and shared as `Arc<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub http_client: reqwest::Client,
    pub config: Arc<SeoConfig>,
    pub tool_registry: Arc<ToolRegistry>,
    /// Clears the Turnstile challenge before every upstream query.
    pub broker: Arc<dyn TokenBroker>,
    pub signature_cache: Arc<SignatureCache>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("signature_cache_enabled", &self.signature_cache.is_enabled())
            .finish()
    }
}

impl AppState {
    /// CapSolver broker and on-disk signature cache, both driven by `config`.
    pub fn new(http_client: reqwest::Client, config: SeoConfig) -> Self {
        let broker: Arc<dyn TokenBroker> = Arc::new(CapSolverBroker::new(http_client.clone(), &config));
        let signature_cache = Arc::new(SignatureCache::new(config.cache_dir.clone()));
        Self {
            http_client,
            config: Arc::new(config),
            tool_registry: Arc::new(ToolRegistry::load()),
            broker,
            signature_cache,
        }
    }

    pub fn with_broker(mut self, broker: Arc<dyn TokenBroker>) -> Self {
        self.broker = broker;
        self
    }

    pub fn with_signature_cache(mut self, cache: Arc<SignatureCache>) -> Self {
        self.signature_cache = cache;
        self
    }

    /// Config and client from the environment, as both binaries start up.
    pub fn from_env() -> anyhow::Result<Self> {
        let config = SeoConfig::from_env();
        tracing::info!("{:?}", config);
        if config.capsolver_api_key.is_none() {
            tracing::warn!(
                "CAPSOLVER_API_KEY not set. Tool calls will fail with a configuration error."
            );
        }
        Ok(Self::new(build_http_client()?, config))
    }
}

/// Shared outbound client; `HTTP_TIMEOUT_SECS` / `HTTP_CONNECT_TIMEOUT_SECS` override the defaults.
pub fn build_http_client() -> reqwest::Result<reqwest::Client> {
    let http_timeout = env::var("HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(30);
    let connect_timeout = env::var("HTTP_CONNECT_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(10);

    reqwest::Client::builder()
        .timeout(Duration::from_secs(http_timeout))
        .connect_timeout(Duration::from_secs(connect_timeout))
        .build()
}
