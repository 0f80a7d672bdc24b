//! Service configuration derived from environment variables.

use aurum_fetch::{ClientConfig, DEFAULT_API_URL};
use aurum_types::{AurumError, DEFAULT_RETENTION, DEFAULT_SYMBOL};
use chrono::TimeDelta;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Default address the query endpoint binds to.
pub const DEFAULT_BIND: &str = "127.0.0.1";

/// Default port of the query endpoint.
pub const DEFAULT_PORT: u16 = 8080;

/// Default ingestion schedule.
pub const DEFAULT_INGEST_INTERVAL: Duration = Duration::from_secs(60);

/// Runtime configuration of the service.
///
/// Blank variables are treated as unset. Values that fail to parse fall
/// back to their defaults.
#[derive(Clone)]
pub struct ServiceConfig {
    /// Root of the file store; `None` selects the platform default.
    pub data_dir: Option<PathBuf>,
    /// Provider API key. Only ingestion needs it.
    pub api_key: Option<String>,
    /// Provider `time_series` endpoint.
    pub api_url: String,
    /// Instrument symbol.
    pub symbol: String,
    /// Bind address of the query endpoint.
    pub bind: String,
    /// Port of the query endpoint.
    pub port: u16,
    /// How long stored candles are kept.
    pub retention: TimeDelta,
    /// Time between ingestion cycles.
    pub ingest_interval: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            symbol: DEFAULT_SYMBOL.to_string(),
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
            retention: DEFAULT_RETENTION,
            ingest_interval: DEFAULT_INGEST_INTERVAL,
        }
    }
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("data_dir", &self.data_dir)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .field("symbol", &self.symbol)
            .field("bind", &self.bind)
            .field("port", &self.port)
            .field("retention", &self.retention)
            .field("ingest_interval", &self.ingest_interval)
            .finish()
    }
}

impl ServiceConfig {
    /// Reads the configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name to its value.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| {
            lookup(name)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        let defaults = Self::default();

        let retention = var("AURUM_RETENTION_DAYS")
            .and_then(|s| s.parse::<i64>().ok())
            .filter(|days| *days > 0)
            .and_then(TimeDelta::try_days)
            .unwrap_or(defaults.retention);

        let ingest_interval = var("AURUM_INGEST_INTERVAL_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map_or(defaults.ingest_interval, Duration::from_secs);

        Self {
            data_dir: var("AURUM_DATA_DIR").map(PathBuf::from),
            api_key: var("AURUM_API_KEY"),
            api_url: var("AURUM_API_URL").unwrap_or(defaults.api_url),
            symbol: var("AURUM_SYMBOL").unwrap_or(defaults.symbol),
            bind: var("AURUM_BIND").unwrap_or(defaults.bind),
            port: var("AURUM_PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            retention,
            ingest_interval,
        }
    }

    /// Builds the quote client configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AurumError::InvalidArgument`] if no API key is configured.
    pub fn client_config(&self) -> Result<ClientConfig, AurumError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            AurumError::InvalidArgument("AURUM_API_KEY is not set".to_string())
        })?;
        Ok(ClientConfig::new(api_key)
            .with_api_url(self.api_url.clone())
            .with_symbol(self.symbol.clone()))
    }

    /// Returns the socket address of the query endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`AurumError::InvalidArgument`] if bind and port do not form an address.
    pub fn socket_addr(&self) -> Result<SocketAddr, AurumError> {
        format!("{}:{}", self.bind, self.port)
            .parse()
            .map_err(|e| AurumError::InvalidArgument(format!("invalid bind address: {e}")))
    }
}
