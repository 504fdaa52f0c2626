//! In-memory doubles shared by the behaviour tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use marketdesk_core::{
    HttpClient, HttpError, HttpFuture, HttpRequest, HttpResponse, MacroDataSource, MacroObservation,
    MacroSeriesRequest, MarketDataSource, PricePoint, PriceSeries, ProviderError, ProviderFuture,
    ProviderId, SeriesRequest, Symbol, UtcDateTime,
};

pub fn symbol(ticker: &str) -> Symbol {
    Symbol::parse(ticker).expect("valid symbol")
}

/// Daily bars starting at a fixed instant, one per close.
pub fn series(ticker: &str, closes: &[f64], previous_close: Option<f64>) -> PriceSeries {
    let start = UtcDateTime::from_unix_seconds(1_700_000_000).expect("valid ts");
    PriceSeries {
        symbol: symbol(ticker),
        points: closes
            .iter()
            .enumerate()
            .map(|(i, close)| PricePoint::close_only(start.plus_seconds(i as i64 * 86_400), *close))
            .collect(),
        previous_close,
    }
}

/// Market source answering from a fixed table. Unknown tickers get an empty series.
#[derive(Default)]
pub struct FixtureMarket {
    series: HashMap<String, PriceSeries>,
    failing: HashSet<String>,
    calls: AtomicUsize,
}

impl FixtureMarket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_closes(mut self, ticker: &str, closes: &[f64], previous_close: Option<f64>) -> Self {
        self.series
            .insert(ticker.to_owned(), series(ticker, closes, previous_close));
        self
    }

    pub fn failing(mut self, ticker: &str) -> Self {
        self.failing.insert(ticker.to_owned());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MarketDataSource for FixtureMarket {
    fn id(&self) -> ProviderId {
        ProviderId::Fixture
    }

    fn series<'a>(&'a self, req: SeriesRequest) -> ProviderFuture<'a, PriceSeries> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let ticker = req.symbol.as_str();
            if self.failing.contains(ticker) {
                return Err(ProviderError::unavailable(format!("{ticker} unavailable")));
            }
            Ok(self
                .series
                .get(ticker)
                .cloned()
                .unwrap_or_else(|| PriceSeries::empty(req.symbol)))
        })
    }
}

/// Macro source keyed by series id; unknown ids fail.
#[derive(Default)]
pub struct FixtureMacro {
    series: HashMap<String, Vec<MacroObservation>>,
}

impl FixtureMacro {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values newest first; `None` marks a missing observation.
    pub fn with_values(mut self, series_id: &str, values: &[Option<f64>]) -> Self {
        let observations = values
            .iter()
            .enumerate()
            .map(|(i, value)| MacroObservation::new(format!("2025-{:02}-01", 12 - (i % 12)), *value))
            .collect();
        self.series.insert(series_id.to_owned(), observations);
        self
    }
}

impl MacroDataSource for FixtureMacro {
    fn id(&self) -> ProviderId {
        ProviderId::Fixture
    }

    fn observations<'a>(&'a self, req: MacroSeriesRequest) -> ProviderFuture<'a, Vec<MacroObservation>> {
        Box::pin(async move {
            self.series
                .get(req.series_id.as_str())
                .cloned()
                .ok_or_else(|| ProviderError::unavailable(format!("{} not scripted", req.series_id)))
        })
    }
}

/// Transport answering by exact URL; anything unscripted is unreachable.
#[derive(Default)]
pub struct ScriptedHttpClient {
    pages: HashMap<String, HttpResponse>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, body: impl Into<String>) -> Self {
        self.pages.insert(url.to_owned(), HttpResponse::ok(body));
        self
    }

    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.pages
            .insert(url.to_owned(), HttpResponse::with_status(status, ""));
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
        Box::pin(async move {
            self.requests
                .lock()
                .expect("requests lock")
                .push(request.url.clone());
            self.pages
                .get(&request.url)
                .cloned()
                .ok_or_else(|| HttpError::Unreachable(request.url.clone()))
        })
    }
}

/// Anchors in the Reuters heading markup.
pub fn reuters_page(titles: &[&str]) -> String {
    titles
        .iter()
        .enumerate()
        .map(|(i, title)| format!(r#"<a data-testid="Heading" href="/markets/story-{i}">{title}</a>"#))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Anchors in the CNBC card markup.
pub fn cnbc_page(titles: &[&str]) -> String {
    titles
        .iter()
        .enumerate()
        .map(|(i, title)| format!(r#"<a class="Card-title" href="https://www.cnbc.com/2025/{i}.html">{title}</a>"#))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Anchors in the MarketWatch link markup.
pub fn marketwatch_page(titles: &[&str]) -> String {
    titles
        .iter()
        .enumerate()
        .map(|(i, title)| format!(r#"<a class="link" href="https://www.marketwatch.com/story/{i}">{title}</a>"#))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Headline containers wrapping an anchor, as in the WSJ markup.
pub fn wsj_page(titles: &[&str]) -> String {
    titles
        .iter()
        .enumerate()
        .map(|(i, title)| {
            format!(
                r#"<h3 class="WSJTheme--headline--7VCzo7Ay "><a href="https://www.wsj.com/articles/{i}"><span>{title}</span></a></h3>"#
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
