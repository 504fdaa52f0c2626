use std::sync::Arc;

use marketdesk_core::news::bundled_samples;
use marketdesk_core::{
    CachedMarketData, EstimateTable, FredAdapter, HttpClient, LiveUpdate, MacroDataSource,
    MacroReconciler, MarketDataSource, NewsAggregator, NoopHttpClient, ReqwestHttpClient,
    SeriesCache, YahooAdapter,
};
use tokio::sync::broadcast;
use tracing::info;

use crate::config::Cli;
use crate::error::ServerError;

const LIVE_CHANNEL_CAPACITY: usize = 16;

/// Shared handler state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub market: Arc<dyn MarketDataSource>,
    pub macro_data: Arc<MacroReconciler>,
    pub news: Arc<NewsAggregator>,
    pub live: broadcast::Sender<LiveUpdate>,
}

impl AppState {
    pub fn new(market: Arc<dyn MarketDataSource>, macro_data: MacroReconciler, news: NewsAggregator) -> Self {
        let (live, _) = broadcast::channel(LIVE_CHANNEL_CAPACITY);
        Self {
            market,
            macro_data: Arc::new(macro_data),
            news: Arc::new(news),
            live,
        }
    }

    /// Wires the production adapters, or the offline transport under `--mock`.
    pub fn from_cli(cli: &Cli) -> Result<Self, ServerError> {
        let http_client: Arc<dyn HttpClient> = if cli.mock {
            Arc::new(NoopHttpClient)
        } else {
            Arc::new(ReqwestHttpClient::new())
        };

        let yahoo: Arc<dyn MarketDataSource> = Arc::new(YahooAdapter::with_http_client(Arc::clone(&http_client)));
        let market: Arc<dyn MarketDataSource> =
            Arc::new(CachedMarketData::new(yahoo, SeriesCache::new(cli.series_cache_ttl())));

        let estimates = match &cli.macro_estimates {
            Some(path) => {
                info!(path = %path.display(), "loading macro estimates");
                EstimateTable::from_path(path)?
            }
            None => EstimateTable::bundled()?,
        };
        let fred: Arc<dyn MacroDataSource> = Arc::new(FredAdapter::from_env(Arc::clone(&http_client)));

        let news = NewsAggregator::new(http_client, bundled_samples()?).with_dedup(cli.news_dedup);

        info!(
            mock = cli.mock,
            cache_ttl_secs = cli.series_cache_ttl_secs,
            news_dedup = %news.dedup(),
            "application state ready"
        );

        Ok(Self::new(market, MacroReconciler::new(fred, estimates), news))
    }
}
