//! # Marketdesk Core
//!
//! Aggregation core for the marketdesk service: provider adapters, static
//! instrument catalogs and the routines that turn raw upstream data into the
//! payloads served over HTTP and WebSocket.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Yahoo chart and FRED observation adapters |
//! | [`broadcaster`] | Periodic live price publisher |
//! | [`cache`] | Optional TTL cache in front of a market data source |
//! | [`catalog`] | Instrument tables and quote profiles per asset domain |
//! | [`circuit_breaker`] | Circuit breaker for resilient upstream calls |
//! | [`dashboard`] | Static dashboard summary |
//! | [`data_source`] | Source traits, requests and structured provider errors |
//! | [`domain`] | Wire-level domain types |
//! | [`envelope`] | `{success, data, error}` response wrapper |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP client abstraction |
//! | [`macro_data`] | Macro indicator reconciliation with estimate fallback |
//! | [`news`] | Headline scraping, filtering and de-duplication |
//! | [`normalizer`] | Quote normalization and catalog fan-out |
//! | [`retry`] | Retry with backoff for transient failures |
//! | [`source`] | Provider identifiers |
//! | [`throttling`] | Upstream rate limiting |
//! | [`yield_curve`] | Treasury curve look-back comparison |
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  HTTP handlers  │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Normalizer /    │────▶│ Series Cache     │
//! │ Reconciler      │     │ (optional TTL)   │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Data Source     │────▶│ HTTP Client      │
//! │ (Adapter Trait) │     │ (reqwest/noop)   │
//! └─────────────────┘     └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Per-instrument, per-source and per-series failures degrade in place:
//! quotes are skipped, macro figures fall back to estimates and news sources
//! contribute nothing. Callers match on [`ProviderErrorKind`] when they need
//! to tell the cases apart:
//!
//! ```rust
//! use marketdesk_core::{ProviderError, ProviderErrorKind};
//!
//! fn is_skippable(error: &ProviderError) -> bool {
//!     matches!(
//!         error.kind(),
//!         ProviderErrorKind::InvalidRequest | ProviderErrorKind::Malformed
//!     )
//! }
//! ```
//!
//! ## Security
//!
//! - The FRED API key is read from the environment only and never logged

pub mod adapters;
pub mod broadcaster;
pub mod cache;
pub mod catalog;
pub mod circuit_breaker;
pub mod dashboard;
pub mod data_source;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod http_client;
pub mod macro_data;
pub mod news;
pub mod normalizer;
pub mod retry;
pub mod source;
pub mod throttling;
pub mod yield_curve;

// Adapter implementations
pub use adapters::{FredAdapter, YahooAdapter, FRED_API_KEY_ENV};

// Live updates
pub use broadcaster::{LiveBroadcaster, DEFAULT_BROADCAST_INTERVAL, LIVE_TICKERS};

// Caching
pub use cache::{CachedMarketData, SeriesCache};

// Catalogs
pub use catalog::{Catalog, InstrumentSpec, QuoteDomain, QuoteProfile, ReferencePolicy};

// Circuit breaker
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};

pub use dashboard::{DashboardSummary, MarketStatus, SegmentSummary};

// Data source traits and types
pub use data_source::{
    MacroDataSource, MacroSeriesRequest, MarketDataSource, ProviderError, ProviderErrorKind,
    ProviderFuture, SeriesRequest,
};

// Domain models
pub use domain::{
    ChartBar, Country, Instrument, Interval, LiveTick, LiveUpdate, MacroIndicator,
    MacroObservation, Metric, NewsItem, Period, PricePoint, PriceSeries, Provenance, QuoteRecord,
    Symbol, Trend, UtcDateTime,
};

pub use envelope::ApiEnvelope;

// Error types
pub use error::{CoreError, ValidationError};

// HTTP client types
pub use http_client::{
    HttpClient, HttpError, HttpFuture, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient,
};

// Macro reconciliation
pub use macro_data::{EstimateTable, MacroInsights, MacroReconciler, MacroSnapshot};

// News
pub use news::{DedupPolicy, NewsAggregator, NewsCategory, SampleHeadline};

// Quote normalization
pub use normalizer::{chart_bars, collect_quotes, normalize, round_to};

// Retry logic
pub use retry::{Backoff, RetryConfig};

// Source identifiers
pub use source::ProviderId;

// Throttling
pub use throttling::UpstreamThrottle;

pub use yield_curve::{yield_curves, CurvePoint, YieldCurveComparison};
