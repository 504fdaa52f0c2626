//! News aggregation: scrape, filter, merge and de-duplicate headlines.
//!
//! The general feed merges [`GENERAL_SOURCES`] in priority order and falls
//! back to curated samples when scraping yields almost nothing. Category feeds
//! merge [`CATEGORY_SOURCES`] and keep only keyword matches.

mod extract;
mod sources;

use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::http_client::{HttpClient, HttpRequest};
use crate::{CoreError, NewsItem, UtcDateTime};

pub use extract::{decode_entities, extract_anchors, text_content, Anchor, Selector};
pub use sources::{ExtractionRule, NewsCategory, NewsSource, CATEGORY_SOURCES, GENERAL_SOURCES};

const BUNDLED_SAMPLES: &str = include_str!("../../data/news_samples.json");

pub const GENERAL_FEED_CAP: usize = 15;
pub const CATEGORY_FEED_CAP: usize = 10;
/// Below this many live items the general feed is topped up with samples.
pub const SAMPLE_FALLBACK_THRESHOLD: usize = 3;
const SCRAPE_TIMEOUT: Duration = Duration::from_secs(8);
const GENERAL_CATEGORY: &str = "Markets";

/// Title comparison used for de-duplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupPolicy {
    /// Case-sensitive exact title.
    #[default]
    Exact,
    /// Trimmed, lowercased, whitespace collapsed.
    Normalized,
}

impl DedupPolicy {
    pub fn key(self, title: &str) -> String {
        match self {
            Self::Exact => title.to_owned(),
            Self::Normalized => title
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase(),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Normalized => "normalized",
        }
    }
}

impl Display for DedupPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DedupPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "normalized" => Ok(Self::Normalized),
            other => Err(format!("unknown dedup policy '{other}', expected exact or normalized")),
        }
    }
}

/// Curated headline used when live scraping comes back nearly empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleHeadline {
    pub title: String,
    pub source: String,
    pub url: String,
    pub category: String,
    pub region: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub days_ago: i64,
}

impl SampleHeadline {
    fn to_item(&self, now: UtcDateTime) -> NewsItem {
        NewsItem {
            title: self.title.clone(),
            source: self.source.clone(),
            url: self.url.clone(),
            category: self.category.clone(),
            region: self.region.clone(),
            description: self.description.clone(),
            published_at: now.minus_days(self.days_ago).format_rfc3339(),
        }
    }
}

pub fn bundled_samples() -> Result<Vec<SampleHeadline>, CoreError> {
    Ok(serde_json::from_str(BUNDLED_SAMPLES)?)
}

/// Ordered, capped accumulator that drops titles already seen.
struct Feed {
    policy: DedupPolicy,
    cap: usize,
    seen: HashSet<String>,
    items: Vec<NewsItem>,
}

impl Feed {
    fn new(policy: DedupPolicy, cap: usize) -> Self {
        Self {
            policy,
            cap,
            seen: HashSet::new(),
            items: Vec::new(),
        }
    }

    fn is_full(&self) -> bool {
        self.items.len() >= self.cap
    }

    fn push(&mut self, item: NewsItem) -> bool {
        if self.is_full() || !self.seen.insert(self.policy.key(&item.title)) {
            return false;
        }
        self.items.push(item);
        true
    }
}

pub struct NewsAggregator {
    http_client: Arc<dyn HttpClient>,
    dedup: DedupPolicy,
    samples: Vec<SampleHeadline>,
}

impl NewsAggregator {
    pub fn new(http_client: Arc<dyn HttpClient>, samples: Vec<SampleHeadline>) -> Self {
        Self {
            http_client,
            dedup: DedupPolicy::default(),
            samples,
        }
    }

    pub fn with_dedup(mut self, dedup: DedupPolicy) -> Self {
        self.dedup = dedup;
        self
    }

    pub fn dedup(&self) -> DedupPolicy {
        self.dedup
    }

    /// Up to [`GENERAL_FEED_CAP`] headlines, source priority order.
    pub async fn general_feed(&self) -> Vec<NewsItem> {
        let pages = self.fetch_pages(&GENERAL_SOURCES).await;
        let now = UtcDateTime::now();
        let mut feed = Feed::new(self.dedup, GENERAL_FEED_CAP);

        for (source, anchors) in GENERAL_SOURCES.iter().zip(pages) {
            for anchor in anchors {
                if feed.is_full() || source.rule.max_accepted.is_some_and(|max| feed.items.len() >= max) {
                    break;
                }
                if let Some(item) = accept(source, &anchor, GENERAL_CATEGORY, now) {
                    feed.push(item);
                }
            }
        }

        let live = feed.items.len();
        if live < SAMPLE_FALLBACK_THRESHOLD {
            debug!(live, "topping up general feed with curated samples");
            for sample in &self.samples {
                feed.push(sample.to_item(now));
            }
        }

        feed.items
    }

    /// Up to [`CATEGORY_FEED_CAP`] headlines whose title matches the category keywords.
    pub async fn category_feed(&self, category: NewsCategory) -> Vec<NewsItem> {
        let pages = self.fetch_pages(&CATEGORY_SOURCES).await;
        let now = UtcDateTime::now();
        let mut feed = Feed::new(self.dedup, CATEGORY_FEED_CAP);

        for (source, anchors) in CATEGORY_SOURCES.iter().zip(pages) {
            for anchor in anchors {
                if feed.is_full() {
                    break;
                }
                if !category.matches(&anchor.text) {
                    continue;
                }
                if let Some(item) = accept(source, &anchor, category.label(), now) {
                    feed.push(item);
                }
            }
        }

        debug!(%category, count = feed.items.len(), "category feed assembled");
        feed.items
    }

    async fn fetch_pages(&self, sources: &[NewsSource]) -> Vec<Vec<Anchor>> {
        join_all(sources.iter().map(|source| self.fetch_page(source))).await
    }

    async fn fetch_page(&self, source: &NewsSource) -> Vec<Anchor> {
        if self.http_client.is_mock() {
            return Vec::new();
        }

        let request = HttpRequest::get(source.url)
            .with_browser_user_agent()
            .with_timeout(SCRAPE_TIMEOUT);

        match self.http_client.execute(request).await {
            Ok(response) if response.is_success() => {
                let anchors =
                    extract_anchors(&response.body, source.rule.selector, source.rule.candidate_cap);
                debug!(source = source.name, candidates = anchors.len(), "scraped headlines");
                anchors
            }
            Ok(response) => {
                warn!(source = source.name, status = response.status, "news source returned non-success status");
                Vec::new()
            }
            Err(error) => {
                warn!(source = source.name, %error, "news source unavailable");
                Vec::new()
            }
        }
    }
}

fn accept(source: &NewsSource, anchor: &Anchor, category: &str, now: UtcDateTime) -> Option<NewsItem> {
    let rule = &source.rule;
    if anchor.text.is_empty() || anchor.text.chars().count() <= rule.min_title_len {
        return None;
    }
    let href = anchor.href.as_deref()?;
    if rule.href_contains.is_some_and(|fragment| !href.contains(fragment)) {
        return None;
    }

    Some(NewsItem {
        title: anchor.text.clone(),
        source: source.name.to_owned(),
        url: source.absolute_url(href),
        category: category.to_owned(),
        region: source.region.map(str::to_owned),
        description: None,
        published_at: now.format_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_policy_folds_case_and_whitespace() {
        assert_eq!(
            DedupPolicy::Normalized.key("  Stocks   Rally\tToday "),
            DedupPolicy::Normalized.key("stocks rally today")
        );
        assert_ne!(
            DedupPolicy::Exact.key("Stocks Rally"),
            DedupPolicy::Exact.key("stocks rally")
        );
    }

    #[test]
    fn bundled_samples_hold_today_and_earlier_batches() {
        let samples = bundled_samples().expect("samples parse");
        assert_eq!(samples.len(), 8);
        assert_eq!(samples.iter().filter(|s| s.days_ago == 0).count(), 3);
        assert_eq!(samples.iter().filter(|s| s.days_ago == 5).count(), 5);
    }

    #[test]
    fn feed_rejects_duplicates_and_respects_cap() {
        let mut feed = Feed::new(DedupPolicy::Exact, 2);
        let item = |title: &str| NewsItem {
            title: title.to_owned(),
            source: String::from("Reuters"),
            url: String::from("https://www.reuters.com/a"),
            category: String::from("Markets"),
            region: None,
            description: None,
            published_at: String::from("2024-01-01T00:00:00Z"),
        };

        assert!(feed.push(item("One")));
        assert!(!feed.push(item("One")));
        assert!(feed.push(item("Two")));
        assert!(!feed.push(item("Three")));
        assert_eq!(feed.items.len(), 2);
    }

    #[test]
    fn accept_applies_threshold_and_href_fragment() {
        let marketwatch = GENERAL_SOURCES[1];
        let now = UtcDateTime::now();
        let anchor = |text: &str, href: &str| Anchor {
            text: text.to_owned(),
            href: Some(href.to_owned()),
        };

        assert!(accept(&marketwatch, &anchor("Short title", "/story/a"), "Markets", now).is_none());
        assert!(accept(
            &marketwatch,
            &anchor("A sufficiently long market headline", "/video/a"),
            "Markets",
            now
        )
        .is_none());
        let item = accept(
            &marketwatch,
            &anchor("A sufficiently long market headline", "/story/a"),
            "Markets",
            now,
        )
        .expect("accepted");
        assert_eq!(item.url, "https://www.marketwatch.com/story/a");
    }
}
