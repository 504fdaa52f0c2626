//! `/api` handlers. Every payload is wrapped in [`ApiEnvelope`].

use axum::extract::{Path, Query, State};
use axum::routing::{get, MethodRouter};
use axum::Json;
use marketdesk_core::{
    chart_bars, collect_quotes, yield_curves, ApiEnvelope, Catalog, ChartBar, DashboardSummary,
    Interval, MacroSnapshot, NewsCategory, NewsItem, Period, QuoteDomain, Symbol,
    YieldCurveComparison,
};
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

type ApiResult<T> = Result<Json<ApiEnvelope<T>>, ApiError>;

fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiEnvelope::success(data)))
}

/// `GET` route returning the normalized quotes of one catalog.
pub fn quotes(domain: QuoteDomain) -> MethodRouter<AppState> {
    get(move |State(state): State<AppState>| async move {
        let catalog = Catalog::for_domain(domain);
        let records = collect_quotes(state.market.as_ref(), &catalog).await;
        Json(ApiEnvelope::success(records))
    })
}

#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    period: Option<String>,
    interval: Option<String>,
}

pub async fn equity_chart(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<ChartQuery>,
) -> ApiResult<Vec<ChartBar>> {
    let symbol = Symbol::parse(&symbol)?;
    let period = query.period.as_deref().unwrap_or("1d").parse::<Period>()?;
    let interval = query.interval.as_deref().unwrap_or("5m").parse::<Interval>()?;

    ok(chart_bars(state.market.as_ref(), symbol, period, interval).await?)
}

pub async fn general_news(State(state): State<AppState>) -> ApiResult<Vec<NewsItem>> {
    ok(state.news.general_feed().await)
}

pub async fn category_news(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> ApiResult<Vec<NewsItem>> {
    let category = category.parse::<NewsCategory>()?;
    ok(state.news.category_feed(category).await)
}

pub async fn dashboard() -> ApiResult<DashboardSummary> {
    ok(DashboardSummary::now())
}

pub async fn macro_indicators(State(state): State<AppState>) -> ApiResult<MacroSnapshot> {
    ok(state.macro_data.reconcile().await)
}

pub async fn rate_curves(State(state): State<AppState>) -> ApiResult<YieldCurveComparison> {
    ok(yield_curves(state.market.as_ref()).await)
}

pub async fn health() -> &'static str {
    "OK"
}
