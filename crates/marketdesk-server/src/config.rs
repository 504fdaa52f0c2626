//! Command-line and environment configuration.
//!
//! | Option | Env | Default |
//! |--------|-----|---------|
//! | `--bind` | `MARKETDESK_BIND` | `127.0.0.1:5001` |
//! | `--enable-live-broadcast` | `MARKETDESK_ENABLE_LIVE_BROADCAST` | `false` |
//! | `--broadcast-interval-secs` | `MARKETDESK_BROADCAST_INTERVAL_SECS` | `30` |
//! | `--series-cache-ttl-secs` | `MARKETDESK_SERIES_CACHE_TTL_SECS` | `0` (disabled) |
//! | `--news-dedup` | `MARKETDESK_NEWS_DEDUP` | `exact` |
//! | `--macro-estimates` | `MARKETDESK_MACRO_ESTIMATES` | bundled table |
//! | `--mock` | `MARKETDESK_MOCK` | `false` |
//! | `--log-json` | `MARKETDESK_LOG_JSON` | `false` |
//!
//! The FRED API key is read from `MARKETDESK_FRED_API_KEY` by the adapter
//! itself and never passes through here.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use marketdesk_core::DedupPolicy;

/// Market data aggregation service
#[derive(Debug, Clone, Parser)]
#[command(name = "marketdesk", author, version, about = "Market data aggregation service")]
pub struct Cli {
    /// Socket address to listen on.
    #[arg(long, env = "MARKETDESK_BIND", default_value = "127.0.0.1:5001")]
    pub bind: SocketAddr,

    /// Publish live equity index prices to `/ws` subscribers.
    #[arg(long, env = "MARKETDESK_ENABLE_LIVE_BROADCAST")]
    pub enable_live_broadcast: bool,

    /// Delay between live broadcast cycles.
    #[arg(long, env = "MARKETDESK_BROADCAST_INTERVAL_SECS", default_value_t = 30)]
    pub broadcast_interval_secs: u64,

    /// Reuse provider series for this many seconds; 0 disables the cache.
    #[arg(long, env = "MARKETDESK_SERIES_CACHE_TTL_SECS", default_value_t = 0)]
    pub series_cache_ttl_secs: u64,

    /// Headline de-duplication: `exact` or `normalized`.
    #[arg(long, env = "MARKETDESK_NEWS_DEDUP", default_value_t = DedupPolicy::Exact)]
    pub news_dedup: DedupPolicy,

    /// JSON file replacing the bundled macro estimate table.
    #[arg(long, env = "MARKETDESK_MACRO_ESTIMATES")]
    pub macro_estimates: Option<PathBuf>,

    /// Serve synthetic prices and skip every outbound request.
    #[arg(long, env = "MARKETDESK_MOCK")]
    pub mock: bool,

    /// Emit logs as JSON lines.
    #[arg(long, env = "MARKETDESK_LOG_JSON")]
    pub log_json: bool,
}

impl Cli {
    pub fn broadcast_interval(&self) -> Duration {
        Duration::from_secs(self.broadcast_interval_secs.max(1))
    }

    pub fn series_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.series_cache_ttl_secs)
    }
}
