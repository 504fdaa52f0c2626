//! Static instrument catalogs, one per quote domain.
//!
//! | Domain | Period/interval | Reference | Precision |
//! |--------|-----------------|-----------|-----------|
//! | equities | 1d / 1m | previous close | 2 |
//! | fx | 1d / 1m | window open | 4 |
//! | rates | 1d / 1d | window open | 3 |
//! | credit, securitized, structured | 1d / 1m | window open | 2 |
//! | commodities | 5d / 1d | prior bar, two points minimum | 2 |

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Instrument, Interval, Period, Symbol, ValidationError};

/// Which close the change is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferencePolicy {
    /// Provider previous close when reported, else the window's first close.
    PreviousClose,
    /// First close in the window.
    WindowOpen,
    /// Close of the bar before the last one.
    PriorBar,
}

/// Per-domain normalization settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteProfile {
    pub precision: u32,
    pub reference: ReferencePolicy,
    pub min_points: usize,
    pub report_volume: bool,
}

impl QuoteProfile {
    pub const fn new(precision: u32, reference: ReferencePolicy) -> Self {
        Self {
            precision,
            reference,
            min_points: 1,
            report_volume: false,
        }
    }

    pub const fn with_min_points(mut self, min_points: usize) -> Self {
        self.min_points = min_points;
        self
    }

    pub const fn with_volume(mut self) -> Self {
        self.report_volume = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteDomain {
    Equities,
    Fx,
    Rates,
    Credit,
    Securitized,
    Structured,
    Commodities,
}

impl QuoteDomain {
    pub const ALL: [Self; 7] = [
        Self::Equities,
        Self::Fx,
        Self::Rates,
        Self::Credit,
        Self::Securitized,
        Self::Structured,
        Self::Commodities,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equities => "equities",
            Self::Fx => "fx",
            Self::Rates => "rates",
            Self::Credit => "credit",
            Self::Securitized => "securitized",
            Self::Structured => "structured",
            Self::Commodities => "commodities",
        }
    }
}

impl Display for QuoteDomain {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuoteDomain {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|domain| domain.as_str() == normalized)
            .ok_or(ValidationError::UnknownCategory { value: normalized })
    }
}

/// Compile-time catalog row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstrumentSpec {
    pub ticker: &'static str,
    pub name: &'static str,
    pub category: Option<&'static str>,
    pub unit: Option<&'static str>,
}

impl InstrumentSpec {
    const fn named(ticker: &'static str, name: &'static str) -> Self {
        Self {
            ticker,
            name,
            category: None,
            unit: None,
        }
    }

    const fn commodity(
        ticker: &'static str,
        name: &'static str,
        category: &'static str,
        unit: &'static str,
    ) -> Self {
        Self {
            ticker,
            name,
            category: Some(category),
            unit: Some(unit),
        }
    }

    pub fn instrument(&self) -> Result<Instrument, ValidationError> {
        let instrument = Instrument::new(Symbol::parse(self.ticker)?, self.name);
        Ok(match (self.category, self.unit) {
            (Some(category), Some(unit)) => instrument.with_category(category, unit),
            _ => instrument,
        })
    }
}

/// One quote domain: what to fetch and how to normalize it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Catalog {
    pub domain: QuoteDomain,
    pub period: Period,
    pub interval: Interval,
    pub profile: QuoteProfile,
    pub instruments: &'static [InstrumentSpec],
    /// Best-effort entries; failures and empty series are dropped silently.
    pub extension: &'static [InstrumentSpec],
}

impl Catalog {
    pub const fn for_domain(domain: QuoteDomain) -> Self {
        let window = QuoteProfile::new(2, ReferencePolicy::WindowOpen);
        match domain {
            QuoteDomain::Equities => Self::intraday(
                domain,
                QuoteProfile::new(2, ReferencePolicy::PreviousClose).with_volume(),
                EQUITIES,
            ),
            QuoteDomain::Fx => Self::intraday(
                domain,
                QuoteProfile::new(4, ReferencePolicy::WindowOpen),
                FX_PAIRS,
            ),
            QuoteDomain::Rates => Self {
                domain,
                period: Period::OneDay,
                interval: Interval::OneDay,
                profile: QuoteProfile::new(3, ReferencePolicy::WindowOpen),
                instruments: TREASURIES,
                extension: GILT_ETFS,
            },
            QuoteDomain::Credit => Self::intraday(domain, window, CREDIT),
            QuoteDomain::Securitized => Self::intraday(domain, window, SECURITIZED),
            QuoteDomain::Structured => Self::intraday(domain, window, STRUCTURED),
            QuoteDomain::Commodities => Self {
                domain,
                period: Period::FiveDays,
                interval: Interval::OneDay,
                profile: QuoteProfile::new(2, ReferencePolicy::PriorBar).with_min_points(2),
                instruments: COMMODITIES,
                extension: &[],
            },
        }
    }

    const fn intraday(
        domain: QuoteDomain,
        profile: QuoteProfile,
        instruments: &'static [InstrumentSpec],
    ) -> Self {
        Self {
            domain,
            period: Period::OneDay,
            interval: Interval::OneMinute,
            profile,
            instruments,
            extension: &[],
        }
    }

    pub fn len(&self) -> usize {
        self.instruments.len() + self.extension.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Core instruments first, then the extension, in declaration order.
    pub fn specs(&self) -> impl Iterator<Item = &'static InstrumentSpec> {
        self.instruments.iter().chain(self.extension.iter())
    }
}

const EQUITIES: &[InstrumentSpec] = &[
    InstrumentSpec::named("^GSPC", "S&P 500"),
    InstrumentSpec::named("^DJI", "Dow Jones Industrial Average"),
    InstrumentSpec::named("^IXIC", "NASDAQ Composite"),
    InstrumentSpec::named("^FTSE", "FTSE 100"),
    InstrumentSpec::named("^GDAXI", "DAX"),
    InstrumentSpec::named("^FCHI", "CAC 40"),
    InstrumentSpec::named("^IBEX", "IBEX 35"),
    InstrumentSpec::named("^FTMIB", "FTSE MIB"),
    InstrumentSpec::named("^AEX", "AEX"),
    InstrumentSpec::named("^SSMI", "SMI"),
    InstrumentSpec::named("^N225", "Nikkei 225"),
    InstrumentSpec::named("^HSI", "Hang Seng"),
];

const FX_PAIRS: &[InstrumentSpec] = &[
    InstrumentSpec::named("EURUSD=X", "EUR/USD"),
    InstrumentSpec::named("GBPUSD=X", "GBP/USD"),
    InstrumentSpec::named("USDJPY=X", "USD/JPY"),
    InstrumentSpec::named("EURGBP=X", "EUR/GBP"),
    InstrumentSpec::named("EURCHF=X", "EUR/CHF"),
    InstrumentSpec::named("GBPEUR=X", "GBP/EUR"),
    InstrumentSpec::named("USDCHF=X", "USD/CHF"),
    InstrumentSpec::named("AUDUSD=X", "AUD/USD"),
    InstrumentSpec::named("USDCAD=X", "USD/CAD"),
    InstrumentSpec::named("NZDUSD=X", "NZD/USD"),
    InstrumentSpec::named("EURJPY=X", "EUR/JPY"),
    InstrumentSpec::named("GBPJPY=X", "GBP/JPY"),
];

const TREASURIES: &[InstrumentSpec] = &[
    InstrumentSpec::named("^TNX", "US Treasury 10-Year"),
    InstrumentSpec::named("^TYX", "US Treasury 30-Year"),
    InstrumentSpec::named("^FVX", "US Treasury 5-Year"),
    InstrumentSpec::named("^IRX", "US Treasury 3-Month"),
];

const GILT_ETFS: &[InstrumentSpec] = &[
    InstrumentSpec::named("IGLT.L", "UK Gilt ETF"),
    InstrumentSpec::named("VGOV.L", "UK Govt Bond ETF"),
    InstrumentSpec::named("GILD.L", "UK Long Gilt ETF"),
];

const CREDIT: &[InstrumentSpec] = &[
    InstrumentSpec::named("LQD", "Investment Grade Corporate"),
    InstrumentSpec::named("HYG", "High Yield Corporate"),
    InstrumentSpec::named("EMB", "Emerging Market Bonds"),
    InstrumentSpec::named("AGG", "US Aggregate Bond"),
    InstrumentSpec::named("TLT", "Long-Term Treasury"),
    InstrumentSpec::named("JNK", "High Yield Junk Bonds"),
];

const SECURITIZED: &[InstrumentSpec] = &[
    InstrumentSpec::named("MBB", "US Mortgage-Backed Securities"),
    InstrumentSpec::named("VMBS", "Vanguard MBS (US)"),
    InstrumentSpec::named("CMBS", "Commercial MBS (US)"),
    InstrumentSpec::named("SCHO", "Short-Term Treasury"),
    InstrumentSpec::named("MINT", "Ultra Short Duration"),
    InstrumentSpec::named("SLXX.L", "iShares UK Gilts 0-5yr"),
    InstrumentSpec::named("GILS.L", "Lyxor Core UK Govt Bond"),
    InstrumentSpec::named("IGLH.L", "iShares UK Gilts All"),
    InstrumentSpec::named("VGOV.L", "Vanguard UK Govt Bond"),
    InstrumentSpec::named("IEAC.L", "iShares Euro Aggregate Bond"),
    InstrumentSpec::named("SEGA.L", "iShares Euro Govt Bond 3-5yr"),
];

const STRUCTURED: &[InstrumentSpec] = &[
    InstrumentSpec::named("^VIX", "CBOE Volatility Index"),
    InstrumentSpec::named("GLD", "Gold ETF"),
    InstrumentSpec::named("SLV", "Silver ETF"),
    InstrumentSpec::named("USO", "Oil ETF"),
    InstrumentSpec::named("UNG", "Natural Gas ETF"),
    InstrumentSpec::named("DBC", "Commodity Index"),
];

const PRECIOUS: &str = "Precious Metals";
const ENERGY: &str = "Energy";
const INDUSTRIAL: &str = "Industrial Metals";
const AGRICULTURAL: &str = "Agricultural";

const COMMODITIES: &[InstrumentSpec] = &[
    InstrumentSpec::commodity("GC=F", "Gold", PRECIOUS, "per troy oz"),
    InstrumentSpec::commodity("SI=F", "Silver", PRECIOUS, "per troy oz"),
    InstrumentSpec::commodity("PL=F", "Platinum", PRECIOUS, "per troy oz"),
    InstrumentSpec::commodity("PA=F", "Palladium", PRECIOUS, "per troy oz"),
    InstrumentSpec::commodity("CL=F", "Crude Oil WTI", ENERGY, "per barrel"),
    InstrumentSpec::commodity("BZ=F", "Brent Crude", ENERGY, "per barrel"),
    InstrumentSpec::commodity("NG=F", "Natural Gas", ENERGY, "per MMBtu"),
    InstrumentSpec::commodity("HO=F", "Heating Oil", ENERGY, "per gallon"),
    InstrumentSpec::commodity("RB=F", "Gasoline", ENERGY, "per gallon"),
    InstrumentSpec::commodity("HG=F", "Copper", INDUSTRIAL, "per pound"),
    InstrumentSpec::commodity("ALI=F", "Aluminum", INDUSTRIAL, "per MT"),
    InstrumentSpec::commodity("ZC=F", "Corn", AGRICULTURAL, "per bushel"),
    InstrumentSpec::commodity("ZW=F", "Wheat", AGRICULTURAL, "per bushel"),
    InstrumentSpec::commodity("ZS=F", "Soybeans", AGRICULTURAL, "per bushel"),
    InstrumentSpec::commodity("KC=F", "Coffee", AGRICULTURAL, "per pound"),
    InstrumentSpec::commodity("SB=F", "Sugar", AGRICULTURAL, "per pound"),
    InstrumentSpec::commodity("CC=F", "Cocoa", AGRICULTURAL, "per MT"),
    InstrumentSpec::commodity("CT=F", "Cotton", AGRICULTURAL, "per pound"),
];
