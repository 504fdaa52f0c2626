//! Outbound HTTP seam. Every upstream call is a GET with its own deadline.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::header::{REFERER, USER_AGENT};
use thiserror::Error;

/// Browser-like user agent sent to news sites and the chart endpoint.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub type HttpFuture<'a> = Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub referer: Option<&'static str>,
    /// Send [`BROWSER_USER_AGENT`] instead of the crate's own agent.
    pub browser_agent: bool,
    pub timeout: Duration,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            referer: None,
            browser_agent: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_referer(mut self, referer: &'static str) -> Self {
        self.referer = Some(referer);
        self
    }

    pub fn with_browser_user_agent(mut self) -> Self {
        self.browser_agent = true;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self::with_status(200, body)
    }

    pub fn with_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        matches!(self.status, 200..=299)
    }
}

/// Failure before any status line was read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    #[error("request to {0} timed out")]
    Timeout(String),

    #[error("could not reach {0}")]
    Unreachable(String),

    #[error("{0}")]
    Transport(String),

    #[error("offline transport refused request to {0}")]
    Offline(String),
}

impl HttpError {
    /// Only the offline refusal is final.
    pub const fn retryable(&self) -> bool {
        !matches!(self, Self::Offline(_))
    }
}

/// Transport shared by the chart adapter, the macro adapter and the news scraper.
pub trait HttpClient: Send + Sync {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a>;

    /// Offline transports make adapters serve deterministic synthetic data.
    fn is_mock(&self) -> bool {
        false
    }
}

/// Offline transport. Every call fails and adapters switch to synthetic data.
#[derive(Debug, Default)]
pub struct NoopHttpClient;

impl HttpClient for NoopHttpClient {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
        Box::pin(async move { Err(HttpError::Offline(request.url)) })
    }

    fn is_mock(&self) -> bool {
        true
    }
}

/// reqwest transport with a shared cookie jar; the chart endpoint sets
/// consent cookies on first contact.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("marketdesk/", env!("CARGO_PKG_VERSION")))
            .cookie_store(true)
            .build()
            .unwrap_or_default();
        Self { client }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

fn classify(url: &str, error: &reqwest::Error) -> HttpError {
    if error.is_timeout() {
        HttpError::Timeout(url.to_owned())
    } else if error.is_connect() {
        HttpError::Unreachable(url.to_owned())
    } else {
        HttpError::Transport(format!("{url}: {error}"))
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
        Box::pin(async move {
            let mut builder = self.client.get(&request.url).timeout(request.timeout);
            if request.browser_agent {
                builder = builder.header(USER_AGENT, BROWSER_USER_AGENT);
            }
            if let Some(referer) = request.referer {
                builder = builder.header(REFERER, referer);
            }

            let response = builder
                .send()
                .await
                .map_err(|error| classify(&request.url, &error))?;
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|error| classify(&request.url, &error))?;

            Ok(HttpResponse { status, body })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_get_uses_default_deadline_and_own_agent() {
        let request = HttpRequest::get("https://example.test/news");

        assert_eq!(request.timeout, Duration::from_secs(10));
        assert!(!request.browser_agent);
        assert_eq!(request.referer, None);
    }

    #[test]
    fn only_offline_refusal_is_final() {
        assert!(HttpError::Timeout(String::from("https://a.test")).retryable());
        assert!(HttpError::Unreachable(String::from("https://a.test")).retryable());
        assert!(!HttpError::Offline(String::from("https://a.test")).retryable());
    }

    #[tokio::test]
    async fn noop_transport_is_mock_and_refuses_requests() {
        let client = NoopHttpClient;
        assert!(client.is_mock());

        let err = client
            .execute(HttpRequest::get("https://example.test"))
            .await
            .expect_err("offline transport must fail");
        assert_eq!(err, HttpError::Offline(String::from("https://example.test")));
    }
}
