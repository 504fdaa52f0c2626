//! Treasury yield curve snapshots at fixed look-backs.

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::data_source::{MarketDataSource, SeriesRequest};
use crate::normalizer::round_to;
use crate::{Interval, Period, PriceSeries, Symbol};

/// Trading-day look-backs: three months, one year, three years.
pub const THREE_MONTHS_BARS: usize = 65;
pub const ONE_YEAR_BARS: usize = 252;
pub const THREE_YEARS_BARS: usize = 756;

/// Curve tenors, short end first.
pub const CURVE_TENORS: [(&str, &str); 4] = [
    ("^IRX", "3M"),
    ("^FVX", "5Y"),
    ("^TNX", "10Y"),
    ("^TYX", "30Y"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurvePoint {
    pub maturity: String,
    pub today: Option<f64>,
    pub three_months_ago: Option<f64>,
    pub one_year_ago: Option<f64>,
    pub three_years_ago: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldCurveComparison {
    pub comparison: Vec<CurvePoint>,
}

/// Close `offset` bars from the end when the series is longer than `offset`,
/// otherwise the current value.
fn lookback(series: &PriceSeries, offset: usize, current: f64) -> f64 {
    let len = series.points.len();
    if len > offset {
        series.points[len - offset].close
    } else {
        current
    }
}

pub fn curve_point(maturity: &str, series: &PriceSeries) -> Option<CurvePoint> {
    let current = series.last_close()?;
    Some(CurvePoint {
        maturity: maturity.to_owned(),
        today: round_to(current, 2),
        three_months_ago: round_to(lookback(series, THREE_MONTHS_BARS, current), 2),
        one_year_ago: round_to(lookback(series, ONE_YEAR_BARS, current), 2),
        three_years_ago: round_to(lookback(series, THREE_YEARS_BARS, current), 2),
    })
}

/// Fetches full daily history per tenor. Failed or empty tenors are skipped.
pub async fn yield_curves(source: &dyn MarketDataSource) -> YieldCurveComparison {
    let fetches = CURVE_TENORS.iter().map(|&(ticker, maturity)| async move {
        let symbol = match Symbol::parse(ticker) {
            Ok(symbol) => symbol,
            Err(error) => {
                warn!(ticker, %error, "invalid curve ticker");
                return None;
            }
        };
        match source
            .series(SeriesRequest::new(symbol, Period::Max, Interval::OneDay))
            .await
        {
            Ok(series) => curve_point(maturity, &series),
            Err(error) => {
                warn!(ticker, %error, "yield history unavailable");
                None
            }
        }
    });

    YieldCurveComparison {
        comparison: join_all(fetches).await.into_iter().flatten().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PricePoint, UtcDateTime};

    fn series(len: usize) -> PriceSeries {
        let start = UtcDateTime::from_unix_seconds(1_600_000_000).expect("valid ts");
        PriceSeries {
            symbol: Symbol::parse("^TNX").expect("valid symbol"),
            points: (0..len)
                .map(|i| PricePoint::close_only(start.plus_seconds(i as i64 * 86_400), i as f64))
                .collect(),
            previous_close: None,
        }
    }

    #[test]
    fn long_history_reads_each_lookback() {
        let point = curve_point("10Y", &series(1_000)).expect("point");

        assert_eq!(point.today, Some(999.0));
        assert_eq!(point.three_months_ago, Some(935.0));
        assert_eq!(point.one_year_ago, Some(748.0));
        assert_eq!(point.three_years_ago, Some(244.0));
    }

    #[test]
    fn short_history_falls_back_to_current() {
        let point = curve_point("30Y", &series(300)).expect("point");

        assert_eq!(point.one_year_ago, Some(48.0));
        assert_eq!(point.three_years_ago, Some(299.0));
    }

    #[test]
    fn offset_equal_to_length_uses_current() {
        let point = curve_point("3M", &series(65)).expect("point");
        assert_eq!(point.three_months_ago, Some(64.0));
    }

    #[test]
    fn empty_series_is_skipped() {
        assert!(curve_point("5Y", &series(0)).is_none());
    }
}
