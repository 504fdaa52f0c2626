use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::extract::Selector;
use crate::ValidationError;

/// How headlines are picked from one page and which of them are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionRule {
    pub selector: Selector,
    /// Candidates considered per page, in document order.
    pub candidate_cap: usize,
    /// Titles must be strictly longer than this many characters.
    pub min_title_len: usize,
    pub href_contains: Option<&'static str>,
    /// Stop accepting once the merged feed holds this many items.
    pub max_accepted: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewsSource {
    pub name: &'static str,
    pub url: &'static str,
    pub base_url: &'static str,
    pub region: Option<&'static str>,
    pub rule: ExtractionRule,
}

impl NewsSource {
    /// Joins a relative href with the source origin.
    pub fn absolute_url(&self, href: &str) -> String {
        if href.starts_with("http") {
            href.to_owned()
        } else {
            format!("{}{}", self.base_url, href)
        }
    }
}

const REUTERS_HEADING: Selector = Selector::Attribute {
    name: "data-testid",
    value: "Heading",
};
const MARKETWATCH_LINK: Selector = Selector::Class("link");
const FT_TEASER: Selector = Selector::Class("js-teaser-heading-link");
const CNBC_CARD: Selector = Selector::Class("Card-title");
const WSJ_HEADLINE: Selector = Selector::NestedAnchor {
    tag: "h3",
    class: "WSJTheme--headline--7VCzo7Ay",
};

const fn rule(selector: Selector, candidate_cap: usize, min_title_len: usize) -> ExtractionRule {
    ExtractionRule {
        selector,
        candidate_cap,
        min_title_len,
        href_contains: None,
        max_accepted: None,
    }
}

/// General feed sources, in merge priority order.
pub const GENERAL_SOURCES: [NewsSource; 4] = [
    NewsSource {
        name: "Reuters",
        url: "https://www.reuters.com/business/finance/",
        base_url: "https://www.reuters.com",
        region: Some("Global"),
        rule: ExtractionRule {
            max_accepted: Some(10),
            ..rule(REUTERS_HEADING, 10, 15)
        },
    },
    NewsSource {
        name: "MarketWatch",
        url: "https://www.marketwatch.com/latest-news",
        base_url: "https://www.marketwatch.com",
        region: Some("Global"),
        rule: ExtractionRule {
            href_contains: Some("story"),
            ..rule(MARKETWATCH_LINK, 10, 20)
        },
    },
    NewsSource {
        name: "Financial Times",
        url: "https://www.ft.com/companies",
        base_url: "https://www.ft.com",
        region: Some("Europe"),
        rule: rule(FT_TEASER, 8, 0),
    },
    NewsSource {
        name: "CNBC",
        url: "https://www.cnbc.com/markets/",
        base_url: "https://www.cnbc.com",
        region: Some("Global"),
        rule: rule(CNBC_CARD, 8, 20),
    },
];

/// Category feed sources, in merge priority order.
pub const CATEGORY_SOURCES: [NewsSource; 5] = [
    NewsSource {
        name: "Reuters",
        url: "https://www.reuters.com/markets/",
        base_url: "https://www.reuters.com",
        region: None,
        rule: rule(REUTERS_HEADING, 20, 0),
    },
    NewsSource {
        name: "MarketWatch",
        url: "https://www.marketwatch.com/latest-news",
        base_url: "https://www.marketwatch.com",
        region: None,
        rule: rule(MARKETWATCH_LINK, 20, 20),
    },
    NewsSource {
        name: "CNBC",
        url: "https://www.cnbc.com/markets/",
        base_url: "https://www.cnbc.com",
        region: None,
        rule: rule(CNBC_CARD, 20, 20),
    },
    NewsSource {
        name: "Financial Times",
        url: "https://www.ft.com/markets",
        base_url: "https://www.ft.com",
        region: None,
        rule: rule(FT_TEASER, 20, 20),
    },
    NewsSource {
        name: "Wall Street Journal",
        url: "https://www.wsj.com/news/markets",
        base_url: "https://www.wsj.com",
        region: None,
        rule: rule(WSJ_HEADLINE, 20, 20),
    },
];

/// Market segment used to filter category feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsCategory {
    Equities,
    Rates,
    Fx,
    Commodities,
    Credit,
    Securitized,
    Structured,
}

impl NewsCategory {
    pub const ALL: [Self; 7] = [
        Self::Equities,
        Self::Rates,
        Self::Fx,
        Self::Commodities,
        Self::Credit,
        Self::Securitized,
        Self::Structured,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equities => "equities",
            Self::Rates => "rates",
            Self::Fx => "fx",
            Self::Commodities => "commodities",
            Self::Credit => "credit",
            Self::Securitized => "securitized",
            Self::Structured => "structured",
        }
    }

    /// Label written into each item: first letter upper, rest lower.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Equities => "Equities",
            Self::Rates => "Rates",
            Self::Fx => "Fx",
            Self::Commodities => "Commodities",
            Self::Credit => "Credit",
            Self::Securitized => "Securitized",
            Self::Structured => "Structured",
        }
    }

    /// Lowercase substrings; a title matches when it contains any of them.
    pub const fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Equities => &[
                "equities", "eurostoxx", "ftse 100", "vix", "vstoxx", "earnings", "buybacks",
                "volatility", "sector rotation", "valuation", "structured notes", "autocallables",
                "hedge funds", "stocks", "equity",
            ],
            Self::Rates => &[
                "yield curve", "ecb", "boe", "fed", "bund", "gilt", "treasury", "inflation swaps",
                "2s10s", "5s30s", "move index", "qt", "fiscal deficit", "sovereign issuance",
                "bonds", "yields",
            ],
            Self::Fx => &[
                "forex", "fx", "eur/usd", "gbp/usd", "dxy", "carry trade", "vol surface",
                "risk reversal", "em fx", "cross-currency basis", "intervention", "currency",
                "dollar",
            ],
            Self::Commodities => &[
                "oil", "brent", "wti", "natural gas", "opec", "metals", "copper", "gold", "lng",
                "energy volatility", "emissions", "carbon trading", "crude", "commodities",
            ],
            Self::Credit => &[
                "credit spreads", "cds", "itraxx", "default rates", "hy", "ig", "issuance",
                "leverage loans", "rating downgrade", "refinancing", "corporate bonds",
                "high yield",
            ],
            Self::Securitized => &[
                "rmbs", "cmbs", "abs", "clo", "securitization", "prepayment", "default",
                "consumer credit", "housing market", "structured credit", "tranche spreads",
                "mortgage",
            ],
            Self::Structured => &[
                "structured notes", "autocallables", "reverse convertibles", "hybrid structures",
                "correlation", "client demand", "product issuance", "esg",
                "retail structured products", "derivatives",
            ],
        }
    }

    pub fn matches(self, title: &str) -> bool {
        let lower = title.to_lowercase();
        self.keywords().iter().any(|keyword| lower.contains(keyword))
    }
}

impl Display for NewsCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NewsCategory {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or(ValidationError::UnknownCategory { value: normalized })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parsing_is_case_insensitive() {
        assert_eq!("FX".parse::<NewsCategory>().expect("parses"), NewsCategory::Fx);
        assert!(matches!(
            "crypto".parse::<NewsCategory>(),
            Err(ValidationError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn keyword_match_is_substring_on_lowercase_title() {
        assert!(NewsCategory::Fx.matches("Dollar slides as traders eye payrolls"));
        assert!(!NewsCategory::Fx.matches("Apple unveils new phone lineup"));
        assert!(NewsCategory::Rates.matches("Gilt sell-off deepens"));
    }

    #[test]
    fn relative_hrefs_are_joined_with_origin() {
        let reuters = GENERAL_SOURCES[0];
        assert_eq!(
            reuters.absolute_url("/markets/story-1"),
            "https://www.reuters.com/markets/story-1"
        );
        assert_eq!(reuters.absolute_url("https://x.test/a"), "https://x.test/a");
    }
}
