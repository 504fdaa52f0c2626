//! Router-level tests: status codes and envelopes for every `/api` route.

mod support;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use marketdesk_core::news::bundled_samples;
use marketdesk_core::{EstimateTable, MacroReconciler, NewsAggregator, NoopHttpClient};
use marketdesk_server::{build_router, AppState};
use serde_json::Value;
use support::{FixtureMacro, FixtureMarket};
use tower::ServiceExt;

fn router(market: FixtureMarket) -> Router {
    let macro_data = MacroReconciler::new(
        Arc::new(FixtureMacro::new()),
        EstimateTable::bundled().expect("bundled estimates"),
    );
    let news = NewsAggregator::new(Arc::new(NoopHttpClient), bundled_samples().expect("samples"));
    build_router(AppState::new(Arc::new(market), macro_data, news))
}

async fn get(router: Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
        .await
        .expect("router responds");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let body = serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}

// =============================================================================
// Quotes
// =============================================================================

#[tokio::test]
async fn equities_route_wraps_quotes_in_envelope() {
    // Given: one index with data
    let market = FixtureMarket::new().with_closes("^IXIC", &[16_000.0, 16_160.0], Some(16_000.0));

    // When: the equities route is called
    let (status, body) = get(router(market), "/api/equities").await;

    // Then: the quote is returned with camelCase fields
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"][0]["symbol"], "^IXIC");
    assert_eq!(body["data"][0]["percentChange"], 1.0);
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn empty_catalog_result_is_still_a_success() {
    // Given: a provider with no data
    // When: each quote route is called
    for uri in [
        "/api/fx",
        "/api/rates",
        "/api/credit",
        "/api/securitized",
        "/api/structured",
        "/api/commodities",
    ] {
        let (status, body) = get(router(FixtureMarket::new()), uri).await;

        // Then: the envelope reports success with an empty list
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body["success"], true, "{uri}");
        assert_eq!(body["data"], serde_json::json!([]), "{uri}");
    }
}

#[tokio::test]
async fn chart_route_defaults_and_validates_query() {
    // Given: a series for the S&P 500
    let market = FixtureMarket::new().with_closes("^GSPC", &[5_000.123, 5_010.456], None);
    let app = router(market);

    // When: the chart is requested with defaults and with a bad period
    let (ok_status, ok_body) = get(app.clone(), "/api/equities/chart/%5EGSPC").await;
    let (bad_status, bad_body) = get(app, "/api/equities/chart/%5EGSPC?period=7w").await;

    // Then: bars are rounded, and the bad period is a client error
    assert_eq!(ok_status, StatusCode::OK);
    assert_eq!(ok_body["data"].as_array().map(Vec::len), Some(2));
    assert_eq!(ok_body["data"][1]["close"], 5_010.46);
    assert_eq!(ok_body["data"][1]["volume"], 0);
    assert_eq!(bad_status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_body["success"], false);
}

#[tokio::test]
async fn chart_provider_failure_is_an_internal_error() {
    // Given: the provider fails for the requested symbol
    let market = FixtureMarket::new().failing("^DJI");

    // When: its chart is requested
    let (status, body) = get(router(market), "/api/equities/chart/%5EDJI?period=5d&interval=1h").await;

    // Then: the failure is reported as a 500 envelope
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "^DJI unavailable");
}

#[tokio::test]
async fn yield_curve_route_returns_comparison() {
    // Given: ten-year history shorter than three months
    let market = FixtureMarket::new().with_closes("^TNX", &[4.1, 4.2, 4.3], None);

    // When: the curve route is called
    let (status, body) = get(router(market), "/api/rates/yield-curves").await;

    // Then: the single tenor falls back to today's value at every look-back
    assert_eq!(status, StatusCode::OK);
    let point = &body["data"]["comparison"][0];
    assert_eq!(point["maturity"], "10Y");
    assert_eq!(point["today"], 4.3);
    assert_eq!(point["threeYearsAgo"], 4.3);
}

// =============================================================================
// News, macro, dashboard
// =============================================================================

#[tokio::test]
async fn unknown_news_category_is_a_bad_request() {
    let (status, body) = get(router(FixtureMarket::new()), "/api/news/crypto").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, serde_json::json!({"success": false, "error": "Invalid category"}));
}

#[tokio::test]
async fn general_news_falls_back_to_samples_offline() {
    let (status, body) = get(router(FixtureMarket::new()), "/api/news").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(8));
    assert!(body["data"][0]["publishedAt"].is_string());
}

#[tokio::test]
async fn category_news_is_empty_offline() {
    let (status, body) = get(router(FixtureMarket::new()), "/api/news/FX").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], serde_json::json!([]));
}

#[tokio::test]
async fn macro_route_serves_estimates_with_insights() {
    let (status, body) = get(router(FixtureMarket::new()), "/api/macro").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["indicators"].as_array().map(Vec::len), Some(12));
    assert_eq!(body["data"]["indicators"][0]["provenance"], "estimate");
    assert!(body["data"]["insights"]["dataSource"].is_string());
}

#[tokio::test]
async fn dashboard_route_returns_static_summary() {
    let (status, body) = get(router(FixtureMarket::new()), "/api/dashboard").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["equities"]["change"], "+0.5%");
    assert_eq!(body["data"]["securitized"]["status"], "stable");
    assert!(body["data"]["timestamp"].is_string());
}

#[tokio::test]
async fn health_route_answers_ok() {
    let (status, body) = get(router(FixtureMarket::new()), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String(String::from("OK")));
}
