use std::sync::Arc;

use crate::cache::ReportCache;
use crate::config::{AppConfig, HTTP_TIMEOUT_SECS};
use crate::usage::UsageGate;
use crate::youtube::{VideoSource, YouTubeClient};

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: AppConfig,
    pub source: Arc<dyn VideoSource>,
    pub cache: ReportCache,
    pub usage: UsageGate,
}

impl AppState {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(HTTP_TIMEOUT_SECS))
            .pool_max_idle_per_host(4)
            .build()?;

        let source = Arc::new(YouTubeClient::new(http_client, config.api_key.clone()));
        Self::with_source(config, source)
    }

    /// Construct with an explicit metrics source. Tests use this to swap in
    /// a counting mock.
    pub fn with_source(config: AppConfig, source: Arc<dyn VideoSource>) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        let cache = ReportCache::open(&config.cache_db_path())?;
        let usage = UsageGate::open(&config.usage_db_path())?;

        Ok(Self {
            config,
            source,
            cache,
            usage,
        })
    }
}
