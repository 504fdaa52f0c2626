//! Explicit TTL cache for provider series.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::debug;

use crate::data_source::{MarketDataSource, ProviderFuture, SeriesRequest};
use crate::{PriceSeries, ProviderId};

#[derive(Debug, Clone)]
struct CacheEntry {
    series: PriceSeries,
    expires_at: Instant,
}

/// Series cache keyed by `(symbol, period, interval)`. A zero TTL disables it.
#[derive(Debug, Clone)]
pub struct SeriesCache {
    ttl: Duration,
    entries: Arc<RwLock<HashMap<SeriesRequest, CacheEntry>>>,
}

impl SeriesCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn is_enabled(&self) -> bool {
        self.ttl > Duration::ZERO
    }

    /// Returns the cached series when present and not expired.
    pub async fn get(&self, key: &SeriesRequest) -> Option<PriceSeries> {
        if !self.is_enabled() {
            return None;
        }
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| Instant::now() < entry.expires_at)
            .map(|entry| entry.series.clone())
    }

    pub async fn put(&self, key: SeriesRequest, series: PriceSeries) {
        if !self.is_enabled() {
            return;
        }
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            key,
            CacheEntry {
                series,
                expires_at: now + self.ttl,
            },
        );
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// [`MarketDataSource`] decorator that serves fresh entries from a [`SeriesCache`].
/// Failures are never cached.
pub struct CachedMarketData {
    inner: Arc<dyn MarketDataSource>,
    cache: SeriesCache,
}

impl CachedMarketData {
    pub fn new(inner: Arc<dyn MarketDataSource>, cache: SeriesCache) -> Self {
        Self { inner, cache }
    }
}

impl MarketDataSource for CachedMarketData {
    fn id(&self) -> ProviderId {
        self.inner.id()
    }

    fn series<'a>(&'a self, req: SeriesRequest) -> ProviderFuture<'a, PriceSeries> {
        Box::pin(async move {
            if let Some(series) = self.cache.get(&req).await {
                debug!(symbol = %req.symbol, "series cache hit");
                return Ok(series);
            }

            let series = self.inner.series(req.clone()).await?;
            self.cache.put(req, series.clone()).await;
            Ok(series)
        })
    }
}
