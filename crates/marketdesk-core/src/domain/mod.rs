//! # Domain Models
//!
//! Wire-level types shared by the aggregation core and the HTTP surface.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated provider ticker |
//! | [`Period`] / [`Interval`] | Provider lookback window and bar size |
//! | [`PriceSeries`] | Ascending provider bars plus optional previous close |
//! | [`QuoteRecord`] | Normalized quote with change and percent change |
//! | [`MacroIndicator`] | Reconciled macro figure tagged with provenance |
//! | [`NewsItem`] | Scraped or curated headline |
//! | [`LiveUpdate`] | Payload pushed to live subscribers |
//!
//! Numeric fields that may be undefined upstream are `Option<f64>` so that a
//! NaN never reaches the serializer.

mod models;
mod range;
mod symbol;
mod timestamp;

pub use models::{
    ChartBar, Country, Instrument, LiveTick, LiveUpdate, MacroIndicator, MacroObservation, Metric,
    NewsItem, PricePoint, PriceSeries, Provenance, QuoteRecord, Trend,
};
pub use range::{Interval, Period};
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
