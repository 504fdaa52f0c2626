//! Quote normalization: provider series in, [`QuoteRecord`] out.

use futures_util::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::catalog::{Catalog, InstrumentSpec, QuoteProfile, ReferencePolicy};
use crate::data_source::{MarketDataSource, ProviderError, SeriesRequest};
use crate::{ChartBar, Instrument, Interval, Period, PriceSeries, QuoteRecord, Symbol, UtcDateTime};

/// Upper bound on concurrent provider calls during catalog fan-out.
pub const FANOUT_CONCURRENCY: usize = 6;

const PERCENT_PRECISION: u32 = 2;
const CHART_PRECISION: u32 = 2;

/// Rounds half away from zero. Non-finite input yields `None`.
pub fn round_to(value: f64, precision: u32) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    let factor = 10_f64.powi(precision as i32);
    let rounded = (value * factor).round() / factor;
    rounded.is_finite().then_some(rounded)
}

/// Builds a quote from a series, or `None` when the series is too short.
pub fn normalize(
    instrument: &Instrument,
    series: &PriceSeries,
    profile: &QuoteProfile,
) -> Option<QuoteRecord> {
    if series.points.len() < profile.min_points.max(1) {
        return None;
    }

    let last = series.points.last()?;
    let current = last.close;
    let first_close = series.points.first()?.close;

    let reference = match profile.reference {
        ReferencePolicy::PreviousClose => series
            .previous_close
            .filter(|value| value.is_finite())
            .unwrap_or(first_close),
        ReferencePolicy::WindowOpen => first_close,
        ReferencePolicy::PriorBar => {
            let len = series.points.len();
            if len >= 2 {
                series.points[len - 2].close
            } else {
                first_close
            }
        }
    };

    let change = current - reference;
    let percent = if reference == 0.0 {
        Some(0.0)
    } else {
        round_to(change / reference * 100.0, PERCENT_PRECISION)
    };

    Some(QuoteRecord {
        symbol: instrument.symbol.clone(),
        display_name: instrument.display_name.clone(),
        category: instrument.category.clone(),
        unit: instrument.unit.clone(),
        current_value: round_to(current, profile.precision),
        absolute_change: round_to(change, profile.precision),
        percent_change: percent,
        volume: profile
            .report_volume
            .then(|| last.volume.unwrap_or(0)),
        as_of: UtcDateTime::now(),
    })
}

/// Fetches and normalizes every instrument of `catalog`, in catalog order.
///
/// Provider failures and empty series are logged and skipped; the call itself
/// never fails.
pub async fn collect_quotes(source: &dyn MarketDataSource, catalog: &Catalog) -> Vec<QuoteRecord> {
    let core_len = catalog.instruments.len();

    // Futures are built eagerly (they stay lazy until polled) so the returned
    // future does not capture the closure type; this keeps it provably `Send`.
    let pending = catalog
        .specs()
        .enumerate()
        .map(|(index, spec)| quote_for(source, catalog, spec, index >= core_len))
        .collect::<Vec<_>>();
    let results = stream::iter(pending)
        .buffered(FANOUT_CONCURRENCY)
        .collect::<Vec<_>>()
        .await;

    let records = results.into_iter().flatten().collect::<Vec<_>>();
    debug!(
        domain = %catalog.domain,
        requested = catalog.len(),
        returned = records.len(),
        "collected quotes"
    );
    records
}

async fn quote_for(
    source: &dyn MarketDataSource,
    catalog: &Catalog,
    spec: &InstrumentSpec,
    best_effort: bool,
) -> Option<QuoteRecord> {
    let instrument = match spec.instrument() {
        Ok(instrument) => instrument,
        Err(error) => {
            warn!(ticker = spec.ticker, %error, "skipping invalid catalog entry");
            return None;
        }
    };

    let request = SeriesRequest::new(instrument.symbol.clone(), catalog.period, catalog.interval);
    match source.series(request).await {
        Ok(series) if series.is_empty() => {
            debug!(symbol = %instrument.symbol, "empty series, skipping");
            None
        }
        Ok(series) => normalize(&instrument, &series, &catalog.profile),
        Err(error) if best_effort => {
            debug!(symbol = %instrument.symbol, %error, "optional instrument unavailable");
            None
        }
        Err(error) => {
            warn!(symbol = %instrument.symbol, domain = %catalog.domain, %error, "quote fetch failed");
            None
        }
    }
}

/// Returns the chart bars for `symbol`, prices rounded to 2 decimals and missing volume as 0.
pub async fn chart_bars(
    source: &dyn MarketDataSource,
    symbol: Symbol,
    period: Period,
    interval: Interval,
) -> Result<Vec<ChartBar>, ProviderError> {
    let series = source
        .series(SeriesRequest::new(symbol, period, interval))
        .await?;

    let round = |value: Option<f64>| value.and_then(|v| round_to(v, CHART_PRECISION));
    Ok(series
        .points
        .into_iter()
        .map(|point| ChartBar {
            timestamp: point.timestamp,
            open: round(point.open),
            high: round(point.high),
            low: round(point.low),
            close: round_to(point.close, CHART_PRECISION),
            volume: point.volume.unwrap_or(0),
        })
        .collect())
}
