use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::circuit_breaker::CircuitBreaker;
use crate::data_source::{MacroDataSource, MacroSeriesRequest, ProviderError, ProviderFuture};
use crate::http_client::{HttpClient, HttpRequest, NoopHttpClient};
use crate::retry::RetryConfig;
use crate::{MacroObservation, ProviderId, UtcDateTime};

const DEFAULT_BASE_URL: &str = "https://api.stlouisfed.org/fred";
const OBSERVATIONS_TIMEOUT: Duration = Duration::from_secs(5);

/// Environment variable holding the macro provider API key.
pub const FRED_API_KEY_ENV: &str = "MARKETDESK_FRED_API_KEY";

/// `series/observations` adapter. Observations are requested newest first.
#[derive(Clone)]
pub struct FredAdapter {
    http_client: Arc<dyn HttpClient>,
    circuit_breaker: Arc<CircuitBreaker>,
    retry: RetryConfig,
    api_key: Option<String>,
    base_url: String,
    use_real_api: bool,
}

impl Default for FredAdapter {
    fn default() -> Self {
        Self::with_http_client(Arc::new(NoopHttpClient), None)
    }
}

impl FredAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>, api_key: Option<String>) -> Self {
        let use_real_api = !http_client.is_mock();
        Self {
            http_client,
            circuit_breaker: Arc::new(CircuitBreaker::for_provider(ProviderId::Fred)),
            retry: RetryConfig::default(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url: String::from(DEFAULT_BASE_URL),
            use_real_api,
        }
    }

    /// Reads the API key from [`FRED_API_KEY_ENV`].
    pub fn from_env(http_client: Arc<dyn HttpClient>) -> Self {
        Self::with_http_client(http_client, std::env::var(FRED_API_KEY_ENV).ok())
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    async fn fetch_real_observations(
        &self,
        req: &MacroSeriesRequest,
    ) -> Result<Vec<MacroObservation>, ProviderError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(ProviderError::invalid_request(format!(
                "{FRED_API_KEY_ENV} is not set"
            )));
        };

        if !self.circuit_breaker.allow_request() {
            return Err(ProviderError::circuit_open(ProviderId::Fred));
        }

        let url = format!(
            "{}/series/observations?series_id={}&api_key={}&file_type=json&sort_order=desc&limit={}",
            self.base_url,
            urlencoding::encode(&req.series_id),
            urlencoding::encode(api_key),
            req.limit
        );
        let request = HttpRequest::get(url).with_timeout(OBSERVATIONS_TIMEOUT);

        debug!(series_id = %req.series_id, limit = req.limit, "fetching observations");
        let response = self
            .retry
            .execute(self.http_client.as_ref(), request)
            .await
            .map_err(|error| {
                self.circuit_breaker.record_failure();
                ProviderError::from_http(ProviderId::Fred, &error)
            })?;

        self.circuit_breaker.record_status(response.status);
        if !response.is_success() {
            return Err(ProviderError::from_status(ProviderId::Fred, response.status));
        }
        parse_observations(&response.body)
    }

    fn synthetic_observations(&self, req: &MacroSeriesRequest) -> Vec<MacroObservation> {
        let seed = req
            .series_id
            .bytes()
            .fold(0_u64, |acc, byte| acc.wrapping_mul(31).wrapping_add(u64::from(byte)));
        let base = 1.0 + (seed % 50) as f64 / 10.0;
        let now = UtcDateTime::now().into_inner();
        let (year, month) = (now.year(), i32::from(u8::from(now.month())));

        (0..req.limit)
            .map(|offset| {
                let months_back = month - 1 - offset as i32;
                let obs_year = year + months_back.div_euclid(12);
                let obs_month = months_back.rem_euclid(12) + 1;
                let value = base + ((seed as usize + offset) % 5) as f64 / 10.0;
                MacroObservation::new(format!("{obs_year:04}-{obs_month:02}-01"), Some(value))
            })
            .collect()
    }
}

impl MacroDataSource for FredAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Fred
    }

    fn observations<'a>(
        &'a self,
        req: MacroSeriesRequest,
    ) -> ProviderFuture<'a, Vec<MacroObservation>> {
        Box::pin(async move {
            if self.use_real_api {
                self.fetch_real_observations(&req).await
            } else {
                Ok(self.synthetic_observations(&req))
            }
        })
    }
}

/// Parses an observations body. `"."` and empty values become `None`.
pub(crate) fn parse_observations(body: &str) -> Result<Vec<MacroObservation>, ProviderError> {
    let payload: FredObservationsResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::malformed(format!("failed to parse observations: {e}")))?;

    Ok(payload
        .observations
        .into_iter()
        .map(|raw| {
            let value = raw
                .value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite());
            MacroObservation::new(raw.date, value)
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct FredObservationsResponse {
    #[serde(default)]
    observations: Vec<FredObservation>,
}

#[derive(Debug, Deserialize)]
struct FredObservation {
    date: String,
    value: String,
}
