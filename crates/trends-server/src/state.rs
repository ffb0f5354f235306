//! Shared application state.

use std::sync::Arc;

use tracing::info;
use trends::{
    GoogleTrendsProvider, NoopCache, RedisCache, Result, TrendCache, TrendsProvider, TrendsService,
};

use crate::config::Settings;

/// State handed to every request handler.
#[derive(Debug)]
pub struct AppState {
    /// The cache-aside orchestrator.
    pub service: TrendsService,
    /// Settings the server was started with.
    pub settings: Settings,
}

impl AppState {
    /// Wrap a service and its settings for sharing across handlers.
    #[must_use]
    pub fn new(service: TrendsService, settings: Settings) -> Arc<Self> {
        Arc::new(Self { service, settings })
    }

    /// Build the production state: Redis (or no cache) in front of Google Trends.
    ///
    /// An unreachable Redis is not an error; the service runs uncached.
    ///
    /// # Errors
    /// Returns an error if the HTTP client for the provider cannot be built.
    pub async fn connect(settings: Settings) -> Result<Arc<Self>> {
        let cache: Arc<dyn TrendCache> = if settings.cache_enabled {
            Arc::new(RedisCache::connect(&settings.redis_url, settings.cache_ttl()).await)
        } else {
            info!("Caching disabled by configuration");
            Arc::new(NoopCache::new())
        };

        let provider: Arc<dyn TrendsProvider> = Arc::new(
            GoogleTrendsProvider::new()?.with_locale(settings.hl.clone(), settings.tz),
        );

        let service = TrendsService::new(provider, cache).with_ttl(settings.cache_ttl());
        Ok(Self::new(service, settings))
    }
}
