//! Fixed market overview shown on the landing page.

use serde::{Deserialize, Serialize};

use crate::UtcDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketStatus {
    Up,
    Down,
    Mixed,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentSummary {
    pub status: MarketStatus,
    pub change: String,
}

impl SegmentSummary {
    fn new(status: MarketStatus, change: &str) -> Self {
        Self {
            status,
            change: change.to_owned(),
        }
    }
}

/// Static per-segment figures stamped with the generation time. Not derived
/// from live data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub equities: SegmentSummary,
    pub fx: SegmentSummary,
    pub rates: SegmentSummary,
    pub credit: SegmentSummary,
    pub securitized: SegmentSummary,
    pub structured: SegmentSummary,
    pub timestamp: UtcDateTime,
}

impl DashboardSummary {
    pub fn at(timestamp: UtcDateTime) -> Self {
        Self {
            equities: SegmentSummary::new(MarketStatus::Up, "+0.5%"),
            fx: SegmentSummary::new(MarketStatus::Mixed, "Mixed"),
            rates: SegmentSummary::new(MarketStatus::Down, "-2bps"),
            credit: SegmentSummary::new(MarketStatus::Up, "+0.3%"),
            securitized: SegmentSummary::new(MarketStatus::Stable, "+0.1%"),
            structured: SegmentSummary::new(MarketStatus::Up, "+1.2%"),
            timestamp,
        }
    }

    pub fn now() -> Self {
        Self::at(UtcDateTime::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_lowercase_status_and_timestamp() {
        let ts = UtcDateTime::from_unix_seconds(1_700_000_000).expect("valid ts");
        let json = serde_json::to_value(DashboardSummary::at(ts)).expect("serializes");

        assert_eq!(json["rates"]["status"], "down");
        assert_eq!(json["rates"]["change"], "-2bps");
        assert_eq!(json["fx"]["status"], "mixed");
        assert_eq!(json["timestamp"], "2023-11-14T22:13:20Z");
    }
}
