use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{Symbol, UtcDateTime};

/// Catalog entry for a tradable or quoted instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    pub symbol: Symbol,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Instrument {
    pub fn new(symbol: Symbol, display_name: impl Into<String>) -> Self {
        Self {
            symbol,
            display_name: display_name.into(),
            category: None,
            unit: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>, unit: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self.unit = Some(unit.into());
        self
    }
}

/// One provider bar. Only `close` is mandatory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: UtcDateTime,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub volume: Option<u64>,
}

impl PricePoint {
    pub fn close_only(timestamp: UtcDateTime, close: f64) -> Self {
        Self {
            timestamp,
            open: None,
            high: None,
            low: None,
            close,
            volume: None,
        }
    }
}

/// Ascending series returned by a [`crate::MarketDataSource`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSeries {
    pub symbol: Symbol,
    pub points: Vec<PricePoint>,
    pub previous_close: Option<f64>,
}

impl PriceSeries {
    pub fn empty(symbol: Symbol) -> Self {
        Self {
            symbol,
            points: Vec::new(),
            previous_close: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.points.last().map(|point| point.close)
    }
}

/// Normalized quote served by the catalog routes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRecord {
    pub symbol: Symbol,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub current_value: Option<f64>,
    pub absolute_change: Option<f64>,
    pub percent_change: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,
    pub as_of: UtcDateTime,
}

/// Rounded OHLCV bar served by the chart route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartBar {
    pub timestamp: UtcDateTime,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: u64,
}

/// Single macro observation. `value` is `None` for the provider's missing marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroObservation {
    pub date: String,
    pub value: Option<f64>,
}

impl MacroObservation {
    pub fn new(date: impl Into<String>, value: Option<f64>) -> Self {
        Self {
            date: date.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Country {
    Us,
    Uk,
    Eu,
}

impl Country {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Us => "us",
            Self::Uk => "uk",
            Self::Eu => "eu",
        }
    }
}

impl Display for Country {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    Inflation,
    Unemployment,
    Gdp,
    PolicyRate,
}

impl Metric {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inflation => "inflation",
            Self::Unemployment => "unemployment",
            Self::Gdp => "gdp",
            Self::PolicyRate => "policyRate",
        }
    }
}

impl Display for Metric {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl Trend {
    pub fn from_change(change: Option<f64>) -> Self {
        match change {
            Some(delta) if delta < 0.0 => Self::Down,
            Some(delta) if delta > 0.0 => Self::Up,
            _ => Self::Stable,
        }
    }
}

/// Whether an indicator came from the live provider or the static table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Live,
    Estimate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroIndicator {
    pub country: Country,
    pub metric: Metric,
    pub current_value: f64,
    pub change_vs_previous: Option<f64>,
    pub trend: Trend,
    pub as_of_date: String,
    pub provenance: Provenance,
    pub series_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub title: String,
    pub source: String,
    pub url: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub published_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveTick {
    pub symbol: Symbol,
    pub price: Option<f64>,
    pub timestamp: UtcDateTime,
}

/// Message published to every live subscriber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveUpdate {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: Vec<LiveTick>,
}

impl LiveUpdate {
    pub fn equities(data: Vec<LiveTick>) -> Self {
        Self {
            kind: String::from("equities"),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trend_follows_sign_of_change() {
        assert_eq!(Trend::from_change(Some(-0.1)), Trend::Down);
        assert_eq!(Trend::from_change(Some(0.2)), Trend::Up);
        assert_eq!(Trend::from_change(Some(0.0)), Trend::Stable);
        assert_eq!(Trend::from_change(None), Trend::Stable);
    }

    #[test]
    fn quote_record_serializes_nan_free_camel_case() {
        let record = QuoteRecord {
            symbol: Symbol::parse("^GSPC").expect("valid symbol"),
            display_name: String::from("S&P 500"),
            category: None,
            unit: None,
            current_value: Some(5000.0),
            absolute_change: None,
            percent_change: Some(0.0),
            volume: None,
            as_of: UtcDateTime::parse("2024-01-01T00:00:00Z").expect("valid ts"),
        };

        let json = serde_json::to_value(&record).expect("serializes");
        assert_eq!(json["displayName"], "S&P 500");
        assert!(json["absoluteChange"].is_null());
        assert!(json.get("category").is_none());
    }

    #[test]
    fn live_update_uses_type_tag() {
        let json = serde_json::to_value(LiveUpdate::equities(Vec::new())).expect("serializes");
        assert_eq!(json["type"], "equities");
    }
}
