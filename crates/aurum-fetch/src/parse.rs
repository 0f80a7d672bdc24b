//! Parsing of `time_series` quote responses.

use aurum_types::{Candle, Resolution};
use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Timestamp format used by the provider for intraday points.
pub const PROVIDER_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors that can occur while parsing a quote response.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The provider answered with an error code instead of data.
    #[error("API error {code}: {message}")]
    Provider {
        /// Provider error code.
        code: i64,
        /// Provider error message.
        message: String,
    },

    /// The response carried neither data points nor an error code.
    #[error("No data points in response")]
    MissingValues,

    /// The response body is not valid JSON of the expected shape.
    #[error("Malformed response: {0}")]
    Json(#[from] serde_json::Error),

    /// A data point's timestamp could not be parsed.
    #[error("Invalid datetime '{0}'")]
    InvalidDatetime(String),

    /// A price or volume field is missing or not a number.
    #[error("Invalid {field} value '{value}'")]
    InvalidNumber {
        /// Name of the offending field.
        field: &'static str,
        /// Raw value as received.
        value: String,
    },
}

/// The latest 1-minute OHLCV point reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    /// Timestamp of the point (UTC).
    pub timestamp: DateTime<Utc>,
    /// Opening price.
    pub open: f64,
    /// Highest price.
    pub high: f64,
    /// Lowest price.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Volume, zero if the provider omitted it.
    pub volume: f64,
}

impl Quote {
    /// Converts the quote into a 1-minute candle for `symbol`.
    #[must_use]
    pub fn into_candle(self, symbol: &str, retention: TimeDelta) -> Candle {
        Candle::new(
            self.timestamp,
            Resolution::Minute1,
            symbol,
            self.open,
            self.high,
            self.low,
            self.close,
            self.volume,
            retention,
        )
    }
}

#[derive(Debug, Deserialize)]
struct TimeSeriesResponse {
    #[serde(default)]
    values: Option<Vec<RawPoint>>,
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPoint {
    datetime: String,
    open: Value,
    high: Value,
    low: Value,
    close: Value,
    #[serde(default)]
    volume: Value,
}

/// Parses the most recent point out of a `time_series` response body.
///
/// The provider lists points newest first, so the first entry of `values`
/// is taken. Prices may arrive as JSON strings or numbers; a missing,
/// null or empty volume counts as zero.
///
/// # Errors
///
/// Returns [`ParseError::Provider`] if the body carries an error code, and
/// another [`ParseError`] variant if the body is not a usable data point.
pub fn parse_latest(body: &str) -> Result<Quote, ParseError> {
    let response: TimeSeriesResponse = serde_json::from_str(body)?;

    let point = match response.values {
        Some(values) => values.into_iter().next().ok_or(ParseError::MissingValues)?,
        None => {
            return Err(match response.code {
                Some(code) => ParseError::Provider {
                    code,
                    message: response
                        .message
                        .unwrap_or_else(|| "No message".to_string()),
                },
                None => ParseError::MissingValues,
            });
        }
    };

    let timestamp = NaiveDateTime::parse_from_str(&point.datetime, PROVIDER_DATETIME_FORMAT)
        .map_err(|_| ParseError::InvalidDatetime(point.datetime.clone()))?
        .and_utc();

    Ok(Quote {
        timestamp,
        open: parse_price("open", &point.open)?,
        high: parse_price("high", &point.high)?,
        low: parse_price("low", &point.low)?,
        close: parse_price("close", &point.close)?,
        volume: parse_volume(&point.volume)?,
    })
}

/// Extracts a provider error from a body, if it carries one.
#[must_use]
pub fn provider_error(body: &str) -> Option<ParseError> {
    let response: TimeSeriesResponse = serde_json::from_str(body).ok()?;
    response.code.map(|code| ParseError::Provider {
        code,
        message: response.message.unwrap_or_else(|| "No message".to_string()),
    })
}

fn parse_price(field: &'static str, value: &Value) -> Result<f64, ParseError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParseError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

fn parse_volume(value: &Value) -> Result<f64, ParseError> {
    match value {
        Value::Null => Ok(0.0),
        Value::String(s) if s.trim().is_empty() => Ok(0.0),
        other => parse_price("volume", other),
    }
}
