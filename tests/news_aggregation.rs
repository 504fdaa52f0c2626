//! Behaviour tests for headline scraping, merging and de-duplication.

mod support;

use std::collections::HashSet;
use std::sync::Arc;

use marketdesk_core::news::{bundled_samples, CATEGORY_SOURCES, GENERAL_FEED_CAP, GENERAL_SOURCES};
use marketdesk_core::{DedupPolicy, NewsAggregator, NewsCategory, NoopHttpClient};
use support::{cnbc_page, marketwatch_page, reuters_page, wsj_page, ScriptedHttpClient};

const REUTERS: usize = 0;
const CNBC: usize = 3;

fn aggregator(client: ScriptedHttpClient) -> NewsAggregator {
    NewsAggregator::new(Arc::new(client), bundled_samples().expect("samples parse"))
}

fn live_headlines(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("Global markets headline number {i} moves stocks"))
        .collect()
}

// =============================================================================
// General feed
// =============================================================================

#[tokio::test]
async fn same_title_from_two_sources_appears_once() {
    // Given: Reuters and CNBC both carry the same story among others
    let shared = "Treasury yields jump after strong payrolls report";
    let client = ScriptedHttpClient::new()
        .with_page(
            GENERAL_SOURCES[REUTERS].url,
            reuters_page(&[shared, "Oil extends rally as supply concerns mount", "Banks lead European shares higher today"]),
        )
        .with_page(
            GENERAL_SOURCES[CNBC].url,
            cnbc_page(&[shared, "Tech giants pull Nasdaq to another record close"]),
        );

    // When: the general feed is assembled
    let feed = aggregator(client).general_feed().await;

    // Then: the shared title is kept once, attributed to the higher-priority source
    let matching = feed.iter().filter(|item| item.title == shared).collect::<Vec<_>>();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].source, "Reuters");
    assert_eq!(feed.len(), 4);
    assert!(feed.iter().all(|item| item.category == "Markets"));
}

#[tokio::test]
async fn sparse_live_results_are_topped_up_with_samples() {
    // Given: only two usable live headlines across all sources
    let client = ScriptedHttpClient::new().with_page(
        GENERAL_SOURCES[REUTERS].url,
        reuters_page(&["Stocks slip as investors weigh central bank path", "Short", "Yen weakens past key level against the dollar"]),
    );
    let samples = bundled_samples().expect("samples parse");

    // When: the general feed is assembled
    let feed = aggregator(client).general_feed().await;

    // Then: live items come first, then every sample, with no repeated title
    assert_eq!(feed.len(), GENERAL_FEED_CAP.min(2 + samples.len()));
    assert_eq!(feed[0].title, "Stocks slip as investors weigh central bank path");
    assert_eq!(feed[2].title, samples[0].title);
    let titles = feed.iter().map(|item| item.title.as_str()).collect::<HashSet<_>>();
    assert_eq!(titles.len(), feed.len());
}

#[tokio::test]
async fn enough_live_results_skip_the_samples() {
    // Given: three usable live headlines
    let titles = live_headlines(3);
    let refs = titles.iter().map(String::as_str).collect::<Vec<_>>();
    let client = ScriptedHttpClient::new().with_page(GENERAL_SOURCES[REUTERS].url, reuters_page(&refs));

    // When: the general feed is assembled
    let feed = aggregator(client).general_feed().await;

    // Then: no curated sample is mixed in
    assert_eq!(feed.len(), 3);
    assert!(feed.iter().all(|item| item.source == "Reuters"));
    assert!(feed[0].url.starts_with("https://www.reuters.com/markets/"));
}

#[tokio::test]
async fn general_feed_never_exceeds_its_cap() {
    // Given: Reuters and CNBC each offer more headlines than the feed holds
    let reuters = live_headlines(10);
    let cnbc = (0..8)
        .map(|i| format!("CNBC market wrap story number {i} for investors"))
        .collect::<Vec<_>>();
    let client = ScriptedHttpClient::new()
        .with_page(
            GENERAL_SOURCES[REUTERS].url,
            reuters_page(&reuters.iter().map(String::as_str).collect::<Vec<_>>()),
        )
        .with_page(
            GENERAL_SOURCES[CNBC].url,
            cnbc_page(&cnbc.iter().map(String::as_str).collect::<Vec<_>>()),
        );

    // When: the general feed is assembled
    let feed = aggregator(client).general_feed().await;

    // Then: the feed stops at the cap, in source priority order
    assert_eq!(feed.len(), GENERAL_FEED_CAP);
    assert_eq!(feed.iter().filter(|item| item.source == "Reuters").count(), 10);
}

#[tokio::test]
async fn failing_sources_contribute_nothing() {
    // Given: one source answers with an error status and the rest are unreachable
    let client = ScriptedHttpClient::new().with_status(GENERAL_SOURCES[REUTERS].url, 503);

    // When: the general feed is assembled
    let feed = aggregator(client).general_feed().await;

    // Then: the feed consists of the curated samples only
    let samples = bundled_samples().expect("samples parse");
    assert_eq!(feed.len(), samples.len());
}

#[tokio::test]
async fn offline_transport_serves_samples_without_requests() {
    // Given: the offline transport
    let aggregator = NewsAggregator::new(Arc::new(NoopHttpClient), bundled_samples().expect("samples"));

    // When: both feed kinds are requested
    let general = aggregator.general_feed().await;
    let category = aggregator.category_feed(NewsCategory::Rates).await;

    // Then: samples back the general feed and category feeds are empty
    assert_eq!(general.len(), 8);
    assert!(category.is_empty());
}

fn casing_variants_client() -> ScriptedHttpClient {
    ScriptedHttpClient::new()
        .with_page(
            GENERAL_SOURCES[REUTERS].url,
            reuters_page(&[
                "Gold hits record as dollar slides",
                "Copper demand outlook brightens in Asia",
                "Bond traders brace for inflation figures",
            ]),
        )
        .with_page(GENERAL_SOURCES[CNBC].url, cnbc_page(&["GOLD HITS RECORD AS DOLLAR SLIDES"]))
}

#[tokio::test]
async fn normalized_policy_folds_case_variants() {
    // Given: two sources carry the same story in different casing

    // When: the feed is assembled with each policy
    let exact = aggregator(casing_variants_client()).general_feed().await;
    let normalized = aggregator(casing_variants_client())
        .with_dedup(DedupPolicy::Normalized)
        .general_feed()
        .await;

    // Then: only the normalized policy treats them as duplicates
    assert_eq!(exact.len(), 4);
    assert_eq!(normalized.len(), 3);
}

// =============================================================================
// Category feeds
// =============================================================================

#[tokio::test]
async fn fx_feed_keeps_only_currency_headlines() {
    // Given: a Reuters markets page mixing FX and non-FX stories
    let client = ScriptedHttpClient::new().with_page(
        CATEGORY_SOURCES[0].url,
        reuters_page(&[
            "Dollar rallies as traders pare rate cut bets",
            "Apple shares fall after product event",
            "EUR/USD slips below 1.08 ahead of ECB",
            "Dollar rallies as traders pare rate cut bets",
        ]),
    );

    // When: the fx category feed is assembled
    let feed = aggregator(client).category_feed(NewsCategory::Fx).await;

    // Then: only keyword matches remain, once each, labelled with the category
    let titles = feed.iter().map(|item| item.title.as_str()).collect::<Vec<_>>();
    assert_eq!(
        titles,
        vec!["Dollar rallies as traders pare rate cut bets", "EUR/USD slips below 1.08 ahead of ECB"]
    );
    assert!(feed.iter().all(|item| item.category == "Fx"));
    assert!(feed.iter().all(|item| item.region.is_none()));
}

#[tokio::test]
async fn fx_feed_excludes_commodity_headlines() {
    // Given: a copper story next to a currency story
    let client = ScriptedHttpClient::new().with_page(
        CATEGORY_SOURCES[0].url,
        reuters_page(&["Copper prices surge", "Sterling climbs against the dollar"]),
    );

    // When: the fx category feed is assembled
    let feed = aggregator(client).category_feed(NewsCategory::Fx).await;

    // Then: the copper story is left out
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].title, "Sterling climbs against the dollar");
    assert!(feed.iter().all(|item| item.title != "Copper prices surge"));
}

#[tokio::test]
async fn secondary_sources_drop_titles_of_twenty_characters_or_fewer() {
    // Given: short commodity headlines on every source; "Copper rises in Asia"
    // is exactly twenty characters and "Copper rises in China" twenty-one
    let client = ScriptedHttpClient::new()
        .with_page(CATEGORY_SOURCES[0].url, reuters_page(&["Gold slips"]))
        .with_page(
            CATEGORY_SOURCES[1].url,
            marketwatch_page(&["Copper rises in Asia", "Copper rises in China"]),
        )
        .with_page(
            CATEGORY_SOURCES[2].url,
            cnbc_page(&["Oil dips on Monday", "Oil climbs as OPEC signals deeper cuts"]),
        )
        .with_page(
            CATEGORY_SOURCES[4].url,
            wsj_page(&["Brent edges up", "Brent crude tops ninety dollars a barrel"]),
        );

    // When: the commodities feed is assembled
    let feed = aggregator(client).category_feed(NewsCategory::Commodities).await;

    // Then: the primary source keeps its short title, the others need more than twenty characters
    let titles = feed.iter().map(|item| item.title.as_str()).collect::<Vec<_>>();
    assert_eq!(
        titles,
        vec![
            "Gold slips",
            "Copper rises in China",
            "Oil climbs as OPEC signals deeper cuts",
            "Brent crude tops ninety dollars a barrel",
        ]
    );
    let sources = feed.iter().map(|item| item.source.as_str()).collect::<Vec<_>>();
    assert_eq!(sources, vec!["Reuters", "MarketWatch", "CNBC", "Wall Street Journal"]);
}

#[tokio::test]
async fn category_feed_is_capped_at_ten() {
    // Given: more than ten matching commodity headlines
    let titles = (0..14)
        .map(|i| format!("Crude oil update {i}"))
        .collect::<Vec<_>>();
    let client = ScriptedHttpClient::new().with_page(
        CATEGORY_SOURCES[0].url,
        reuters_page(&titles.iter().map(String::as_str).collect::<Vec<_>>()),
    );

    // When: the commodities feed is assembled
    let feed = aggregator(client).category_feed(NewsCategory::Commodities).await;

    // Then: it stops at ten
    assert_eq!(feed.len(), 10);
}

#[test]
fn unknown_category_is_a_validation_error() {
    let error = "crypto".parse::<NewsCategory>().expect_err("unknown category");
    assert_eq!(error.to_string(), "Invalid category");
}
