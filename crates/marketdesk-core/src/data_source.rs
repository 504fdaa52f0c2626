//! Provider contracts and request types.
//!
//! | Trait | Request | Response |
//! |-------|---------|----------|
//! | [`MarketDataSource`] | [`SeriesRequest`] | [`PriceSeries`] |
//! | [`MacroDataSource`] | [`MacroSeriesRequest`] | `Vec<MacroObservation>` (newest first) |
//!
//! An empty result means "no data right now" and is never an error.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::http_client::HttpError;
use crate::{Interval, MacroObservation, Period, PriceSeries, ProviderId, Symbol};

/// Provider error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    Unavailable,
    RateLimited,
    InvalidRequest,
    Malformed,
    Internal,
}

/// Structured provider error; callers degrade in place rather than failing a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    kind: ProviderErrorKind,
    message: String,
    retryable: bool,
}

impl ProviderError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Malformed,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    /// Maps a non-2xx upstream status onto an error kind.
    pub fn from_status(provider: ProviderId, status: u16) -> Self {
        let message = format!("{provider} responded with status {status}");
        match status {
            429 => Self::rate_limited(message),
            400..=499 => Self::invalid_request(message),
            _ => Self::unavailable(message),
        }
    }

    pub fn from_http(provider: ProviderId, error: &HttpError) -> Self {
        let message = format!("{provider} transport error: {error}");
        if error.retryable() {
            Self::unavailable(message)
        } else {
            Self::internal(message)
        }
    }

    pub fn circuit_open(provider: ProviderId) -> Self {
        Self::unavailable(format!("{provider} circuit is open"))
    }

    pub const fn kind(&self) -> ProviderErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            ProviderErrorKind::Unavailable => "provider.unavailable",
            ProviderErrorKind::RateLimited => "provider.rate_limited",
            ProviderErrorKind::InvalidRequest => "provider.invalid_request",
            ProviderErrorKind::Malformed => "provider.malformed",
            ProviderErrorKind::Internal => "provider.internal",
        }
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ProviderError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesRequest {
    pub symbol: Symbol,
    pub period: Period,
    pub interval: Interval,
}

impl SeriesRequest {
    pub fn new(symbol: Symbol, period: Period, interval: Interval) -> Self {
        Self {
            symbol,
            period,
            interval,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroSeriesRequest {
    pub series_id: String,
    pub limit: usize,
}

impl MacroSeriesRequest {
    pub fn new(series_id: impl Into<String>, limit: usize) -> Result<Self, ProviderError> {
        let series_id = series_id.into();
        if series_id.trim().is_empty() {
            return Err(ProviderError::invalid_request("series id must not be empty"));
        }
        if limit == 0 {
            return Err(ProviderError::invalid_request(
                "observation limit must be greater than zero",
            ));
        }
        Ok(Self { series_id, limit })
    }
}

/// Boxed future returned by provider traits.
pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ProviderError>> + Send + 'a>>;

/// Market-data provider contract (time-series of closes).
pub trait MarketDataSource: Send + Sync {
    fn id(&self) -> ProviderId;

    fn series<'a>(&'a self, req: SeriesRequest) -> ProviderFuture<'a, PriceSeries>;
}

/// Macro-data provider contract (dated observations, newest first).
pub trait MacroDataSource: Send + Sync {
    fn id(&self) -> ProviderId;

    fn observations<'a>(&'a self, req: MacroSeriesRequest) -> ProviderFuture<'a, Vec<MacroObservation>>;
}
