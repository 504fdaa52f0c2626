//! Macro reconciliation: live series where usable, static estimates otherwise.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::data_source::{MacroDataSource, MacroSeriesRequest};
use crate::normalizer::round_to;
use crate::{
    CoreError, Country, MacroIndicator, MacroObservation, Metric, Provenance, Trend,
    ValidationError,
};

const BUNDLED_ESTIMATES: &str = include_str!("../data/macro_estimates.json");
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const YEAR_OVER_YEAR_LAG: usize = 12;
/// Year-ago candidates scanned past the lag when FRED reports ".".
const YEAR_AGO_WINDOW: usize = 3;

/// How a series' raw values relate to the reported figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesUnit {
    /// Price index; reported as year-over-year percent change.
    PriceIndex,
    /// Already a percentage; passed through.
    Rate,
    /// Level; reported as annualized quarter-over-quarter growth.
    Level,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacroSeriesSpec {
    pub country: Country,
    pub metric: Metric,
    pub series_id: &'static str,
    pub unit: SeriesUnit,
    pub limit: usize,
}

const fn spec(
    country: Country,
    metric: Metric,
    series_id: &'static str,
    unit: SeriesUnit,
    limit: usize,
) -> MacroSeriesSpec {
    MacroSeriesSpec {
        country,
        metric,
        series_id,
        unit,
        limit,
    }
}

/// One series per (country, metric) pair.
pub const MACRO_SERIES: [MacroSeriesSpec; 12] = [
    spec(Country::Us, Metric::Inflation, "CPIAUCSL", SeriesUnit::PriceIndex, 15),
    spec(Country::Uk, Metric::Inflation, "GBRCPIALLMINMEI", SeriesUnit::PriceIndex, 15),
    spec(Country::Eu, Metric::Inflation, "CP0000EZ19M086NEST", SeriesUnit::PriceIndex, 15),
    spec(Country::Us, Metric::Unemployment, "UNRATE", SeriesUnit::Rate, 2),
    spec(Country::Uk, Metric::Unemployment, "LRHUTTTTGBM156S", SeriesUnit::Rate, 5),
    spec(Country::Eu, Metric::Unemployment, "LRHUTTTTEZM156S", SeriesUnit::Rate, 5),
    spec(Country::Us, Metric::Gdp, "A191RL1Q225SBEA", SeriesUnit::Rate, 2),
    spec(Country::Uk, Metric::Gdp, "NAEXKP01GBQ189S", SeriesUnit::Rate, 2),
    spec(Country::Eu, Metric::Gdp, "NAEXKP01EZQ189S", SeriesUnit::Rate, 2),
    spec(Country::Us, Metric::PolicyRate, "FEDFUNDS", SeriesUnit::Rate, 2),
    spec(Country::Uk, Metric::PolicyRate, "IRSTCB01GBM156N", SeriesUnit::Rate, 2),
    spec(Country::Eu, Metric::PolicyRate, "ECBDFR", SeriesUnit::Rate, 2),
];

/// Static stand-in for one (country, metric) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub country: Country,
    pub metric: Metric,
    pub value: f64,
    #[serde(default)]
    pub change: Option<f64>,
    /// Overrides the trend implied by `change`.
    #[serde(default)]
    pub trend: Option<Trend>,
    pub date: String,
}

/// Estimate table plus the fixed policy commentary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateTable {
    pub policy_insight: String,
    pub estimates: Vec<Estimate>,
}

impl EstimateTable {
    pub fn bundled() -> Result<Self, CoreError> {
        Self::from_json(BUNDLED_ESTIMATES)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parses and checks that every configured pair has an estimate.
    pub fn from_json(raw: &str) -> Result<Self, CoreError> {
        let table: Self = serde_json::from_str(raw)?;
        for series in &MACRO_SERIES {
            if table.get(series.country, series.metric).is_none() {
                return Err(ValidationError::MissingEstimate {
                    country: series.country.as_str(),
                    metric: series.metric.as_str(),
                }
                .into());
            }
        }
        Ok(table)
    }

    pub fn get(&self, country: Country, metric: Metric) -> Option<&Estimate> {
        self.estimates
            .iter()
            .find(|estimate| estimate.country == country && estimate.metric == metric)
    }
}

/// Human-readable summaries served alongside the indicators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroInsights {
    pub inflation: String,
    pub employment: String,
    pub gdp: String,
    pub policy: String,
    pub data_source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroSnapshot {
    pub indicators: Vec<MacroIndicator>,
    pub insights: MacroInsights,
}

impl MacroSnapshot {
    pub fn indicator(&self, country: Country, metric: Metric) -> Option<&MacroIndicator> {
        self.indicators
            .iter()
            .find(|indicator| indicator.country == country && indicator.metric == metric)
    }
}

/// Live figure derived from a series before provenance tagging.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedFigure {
    pub value: f64,
    pub change: Option<f64>,
    pub date: String,
}

/// Fetches every configured series concurrently and reconciles it against the estimates.
pub struct MacroReconciler {
    source: Arc<dyn MacroDataSource>,
    estimates: EstimateTable,
    timeout: Duration,
}

impl MacroReconciler {
    pub fn new(source: Arc<dyn MacroDataSource>, estimates: EstimateTable) -> Self {
        Self {
            source,
            estimates,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Never fails: each pair independently degrades to its estimate.
    pub async fn reconcile(&self) -> MacroSnapshot {
        let indicators = join_all(MACRO_SERIES.iter().map(|spec| self.indicator_for(spec))).await;
        let insights = build_insights(&indicators, &self.estimates.policy_insight);
        MacroSnapshot {
            indicators,
            insights,
        }
    }

    async fn indicator_for(&self, spec: &MacroSeriesSpec) -> MacroIndicator {
        let live = match MacroSeriesRequest::new(spec.series_id, spec.limit) {
            Ok(request) => {
                match tokio::time::timeout(self.timeout, self.source.observations(request)).await {
                    Ok(Ok(observations)) => derive_figure(spec.metric, spec.unit, &observations),
                    Ok(Err(error)) => {
                        warn!(series_id = spec.series_id, %error, "macro series unavailable");
                        None
                    }
                    Err(_) => {
                        warn!(series_id = spec.series_id, timeout = ?self.timeout, "macro series timed out");
                        None
                    }
                }
            }
            Err(error) => {
                warn!(series_id = spec.series_id, %error, "invalid macro series request");
                None
            }
        };

        match live {
            Some(figure) => MacroIndicator {
                country: spec.country,
                metric: spec.metric,
                current_value: figure.value,
                change_vs_previous: figure.change,
                trend: Trend::from_change(figure.change),
                as_of_date: figure.date,
                provenance: Provenance::Live,
                series_id: spec.series_id.to_owned(),
            },
            None => {
                debug!(series_id = spec.series_id, "using estimate");
                self.estimate_indicator(spec)
            }
        }
    }

    fn estimate_indicator(&self, spec: &MacroSeriesSpec) -> MacroIndicator {
        // `EstimateTable::from_json` guarantees a row for every configured pair.
        let (value, change, trend, date) = self
            .estimates
            .get(spec.country, spec.metric)
            .map(|estimate| {
                let trend = estimate.trend.unwrap_or_else(|| Trend::from_change(estimate.change));
                (estimate.value, estimate.change, trend, estimate.date.clone())
            })
            .unwrap_or((0.0, None, Trend::Stable, String::from("n/a")));

        MacroIndicator {
            country: spec.country,
            metric: spec.metric,
            current_value: value,
            change_vs_previous: change,
            trend,
            as_of_date: date,
            provenance: Provenance::Estimate,
            series_id: spec.series_id.to_owned(),
        }
    }
}

fn next_present(observations: &[MacroObservation], from: usize) -> Option<(usize, f64)> {
    observations
        .iter()
        .enumerate()
        .skip(from)
        .find_map(|(index, obs)| obs.value.map(|value| (index, value)))
}

/// Year-over-year percent change at `index`. The year-ago value is the first
/// present observation twelve to fourteen periods older (newest first).
pub fn year_over_year(observations: &[MacroObservation], index: usize) -> Option<f64> {
    let current = observations.get(index)?.value?;
    let year_ago = observations
        .iter()
        .skip(index + YEAR_OVER_YEAR_LAG)
        .take(YEAR_AGO_WINDOW)
        .find_map(|obs| obs.value)?;
    if year_ago == 0.0 {
        return None;
    }
    round_to((current - year_ago) / year_ago * 100.0, 2)
}

/// Derives the live figure, or `None` when the series has no usable observation.
pub fn derive_figure(
    metric: Metric,
    unit: SeriesUnit,
    observations: &[MacroObservation],
) -> Option<DerivedFigure> {
    let (latest_index, latest) = next_present(observations, 0)?;
    let previous = next_present(observations, latest_index + 1);
    let date = observations[latest_index].date.clone();
    let change_precision = if metric == Metric::Unemployment { 1 } else { 2 };

    let (value, change) = match unit {
        // Less than a year of history: the raw index level passes through.
        SeriesUnit::PriceIndex if observations.len() <= latest_index + YEAR_OVER_YEAR_LAG => {
            (latest, None)
        }
        SeriesUnit::PriceIndex => {
            let yoy = year_over_year(observations, latest_index)?;
            let change = previous
                .and_then(|(index, _)| year_over_year(observations, index))
                .and_then(|prior| round_to(yoy - prior, 2));
            (yoy, change)
        }
        SeriesUnit::Rate => (
            latest,
            previous.and_then(|(_, prior)| round_to(latest - prior, change_precision)),
        ),
        SeriesUnit::Level => {
            let (_, prior) = previous?;
            if prior == 0.0 {
                return None;
            }
            (round_to((latest - prior) / prior * 100.0 * 4.0, 1)?, None)
        }
    };

    Some(DerivedFigure {
        value,
        change,
        date,
    })
}

fn build_insights(indicators: &[MacroIndicator], policy: &str) -> MacroInsights {
    let value = |country: Country, metric: Metric| {
        indicators
            .iter()
            .find(|i| i.country == country && i.metric == metric)
            .map(|i| i.current_value.to_string())
            .unwrap_or_else(|| String::from("n/a"))
    };
    let coverage = |country: Country| {
        let live = indicators
            .iter()
            .filter(|i| i.country == country && i.provenance == Provenance::Live)
            .count();
        let total = indicators.iter().filter(|i| i.country == country).count();
        match live {
            0 => "estimates",
            n if n == total => "live",
            _ => "partial",
        }
    };
    let unemployment_source = |country: Country| {
        let live = indicators.iter().any(|i| {
            i.country == country && i.metric == Metric::Unemployment && i.provenance == Provenance::Live
        });
        if live {
            "live"
        } else {
            "estimates"
        }
    };

    MacroInsights {
        inflation: format!(
            "Consumer price inflation (year over year): US {}%, UK {}%, EU {}%.",
            value(Country::Us, Metric::Inflation),
            value(Country::Uk, Metric::Inflation),
            value(Country::Eu, Metric::Inflation),
        ),
        employment: format!(
            "Unemployment: US ({}), UK ({}), EU ({}). Rates: US {}%, UK {}%, EU {}%.",
            unemployment_source(Country::Us),
            unemployment_source(Country::Uk),
            unemployment_source(Country::Eu),
            value(Country::Us, Metric::Unemployment),
            value(Country::Uk, Metric::Unemployment),
            value(Country::Eu, Metric::Unemployment),
        ),
        gdp: format!(
            "GDP growth: US {}%, UK {}%, EU {}%.",
            value(Country::Us, Metric::Gdp),
            value(Country::Uk, Metric::Gdp),
            value(Country::Eu, Metric::Gdp),
        ),
        policy: policy.to_owned(),
        data_source: format!(
            "Macro data: US ({}), UK ({}), EU ({}). Official international statistics are typically published with a 2-4 month lag.",
            coverage(Country::Us),
            coverage(Country::Uk),
            coverage(Country::Eu),
        ),
    }
}
