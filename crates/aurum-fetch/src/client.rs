//! HTTP client for the upstream quote provider.

use async_trait::async_trait;
use aurum_types::{AurumError, DEFAULT_SYMBOL};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

use crate::{ParseError, Quote, parse_latest, provider_error};

/// Default `time_series` endpoint.
pub const DEFAULT_API_URL: &str = "https://api.twelvedata.com/time_series";

/// Configuration for the quote client.
#[derive(Clone)]
pub struct ClientConfig {
    /// Endpoint returning `time_series` responses.
    pub api_url: String,
    /// Provider API key.
    pub api_key: String,
    /// Instrument symbol requested upstream.
    pub symbol: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum retry attempts for failed requests.
    pub max_retries: u32,
    /// Base delay for exponential backoff (in milliseconds).
    pub base_delay_ms: u64,
    /// Maximum delay between retries (in milliseconds).
    pub max_delay_ms: u64,
    /// User agent string.
    pub user_agent: String,
}

impl ClientConfig {
    /// Creates a configuration for `api_key` with default settings.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Sets the endpoint URL.
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Sets the requested symbol.
    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = symbol.into();
        self
    }

    /// Sets the maximum number of retries.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            symbol: DEFAULT_SYMBOL.to_string(),
            timeout: Duration::from_secs(15),
            max_retries: 3,
            base_delay_ms: 500,
            max_delay_ms: 10_000,
            user_agent: format!("aurum/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"<redacted>")
            .field("symbol", &self.symbol)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("base_delay_ms", &self.base_delay_ms)
            .field("max_delay_ms", &self.max_delay_ms)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Errors that can occur while fetching a quote.
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned an error status.
    #[error("Server error: {status}")]
    ServerError {
        /// HTTP status code.
        status: u16,
    },

    /// The response could not be turned into a quote.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl From<FetchError> for AurumError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::Http(_) | FetchError::ServerError { .. } => {
                Self::UpstreamUnavailable(e.to_string())
            }
            FetchError::Parse(_) => Self::UpstreamData(e.to_string()),
        }
    }
}

/// A source of the latest 1-minute quote.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetches the most recent 1-minute OHLCV point.
    async fn latest_minute(&self) -> Result<Quote, FetchError>;
}

/// HTTP client with connection pooling and retry logic.
///
/// Build one client per process and reuse it for every cycle.
#[derive(Debug, Clone)]
pub struct QuoteClient {
    client: Client,
    config: ClientConfig,
}

impl QuoteClient {
    /// Creates a new quote client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .tcp_keepalive(Duration::from_secs(60))
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&config.user_agent)
            .gzip(true)
            .build()?;
        Ok(Self { client, config })
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Requests the latest point once, retrying transient failures.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after all retries or the
    /// response is not a usable data point.
    pub async fn fetch_latest(&self) -> Result<Quote, FetchError> {
        let mut attempts = 0;

        loop {
            let request = self.client.get(&self.config.api_url).query(&[
                ("symbol", self.config.symbol.as_str()),
                ("interval", "1min"),
                ("apikey", self.config.api_key.as_str()),
                ("outputsize", "1"),
            ]);

            match request.send().await {
                Ok(response) => {
                    let status = response.status();

                    // Retry on server errors (5xx) and rate limiting (429)
                    if (status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS)
                        && attempts < self.config.max_retries
                    {
                        attempts += 1;
                        let delay = self.calculate_backoff_delay(attempts);
                        tracing::debug!(status = status.as_u16(), attempts, ?delay, "retrying quote request");
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    let body = response.text().await?;
                    if !status.is_success() {
                        return Err(provider_error(&body).map_or(
                            FetchError::ServerError {
                                status: status.as_u16(),
                            },
                            FetchError::Parse,
                        ));
                    }

                    return Ok(parse_latest(&body)?);
                }
                Err(e) if Self::is_retryable_error(&e) && attempts < self.config.max_retries => {
                    attempts += 1;
                    let delay = self.calculate_backoff_delay(attempts);
                    tracing::debug!(error = %e, attempts, ?delay, "retrying quote request");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Calculates the backoff delay with exponential backoff and jitter.
    fn calculate_backoff_delay(&self, attempt: u32) -> Duration {
        let exp_delay = self
            .config
            .base_delay_ms
            .saturating_mul(1u64 << attempt.min(10));

        let capped_delay = exp_delay.min(self.config.max_delay_ms);

        // Deterministic jitter of up to ±25%
        let jitter_range = capped_delay / 4;
        let jitter = if jitter_range > 0 {
            let jitter_offset = (u64::from(attempt) * 17) % (jitter_range * 2);
            jitter_offset as i64 - jitter_range as i64
        } else {
            0
        };

        let final_delay = (capped_delay as i64 + jitter).max(100) as u64;
        Duration::from_millis(final_delay)
    }

    /// Determines if a transport error is retryable.
    fn is_retryable_error(error: &reqwest::Error) -> bool {
        if error.is_builder() {
            return false;
        }
        error.is_timeout() || error.is_connect() || error.is_request()
    }
}

#[async_trait]
impl QuoteSource for QuoteClient {
    async fn latest_minute(&self) -> Result<Quote, FetchError> {
        self.fetch_latest().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.symbol, "XAU/USD");
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = ClientConfig::new("super-secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[tokio::test]
    async fn test_client_creation() {
        let client = QuoteClient::new(ClientConfig::new("key").with_symbol("XAG/USD"));
        assert!(client.is_ok());
        assert_eq!(client.unwrap().config().symbol, "XAG/USD");
    }

    #[test]
    fn test_backoff_delay_calculation() {
        let client = QuoteClient::new(ClientConfig::default()).unwrap();

        // First attempt: base_delay * 2 = 1000ms (plus jitter)
        let delay1 = client.calculate_backoff_delay(1);
        assert!(delay1.as_millis() >= 750 && delay1.as_millis() <= 1250);

        // Second attempt: base_delay * 4 = 2000ms (plus jitter)
        let delay2 = client.calculate_backoff_delay(2);
        assert!(delay2.as_millis() >= 1500 && delay2.as_millis() <= 2500);

        // High attempt is capped at max_delay
        let delay_high = client.calculate_backoff_delay(20);
        assert!(delay_high.as_millis() <= 12_500);
    }

    #[test]
    fn test_error_mapping() {
        let unavailable: AurumError = FetchError::ServerError { status: 503 }.into();
        assert_eq!(unavailable.kind(), aurum_types::ErrorKind::UpstreamUnavailable);

        let provider: AurumError = FetchError::Parse(ParseError::Provider {
            code: 429,
            message: "limit".into(),
        })
        .into();
        assert_eq!(provider.kind(), aurum_types::ErrorKind::UpstreamDataError);
    }
}
