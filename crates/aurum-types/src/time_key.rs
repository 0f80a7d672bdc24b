//! Sortable timestamp encoding used as the series sort key.

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Fixed-width `strftime` pattern of every stored timestamp.
pub const TIME_KEY_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Byte length of an encoded key.
pub const TIME_KEY_LEN: usize = 20;

/// A timestamp encoded as `YYYY-MM-DDTHH:MM:SSZ`.
///
/// Every key has the same width and zero padding, so comparing keys
/// byte-wise gives the same answer as comparing the instants. Sub-second
/// precision is truncated. The decoded instant is kept next to the text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeKey {
    encoded: String,
    instant: DateTime<Utc>,
}

impl TimeKey {
    /// Encodes an instant, truncating to whole seconds.
    #[must_use]
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        let instant = dt.trunc_subsecs(0);
        Self {
            encoded: instant.format(TIME_KEY_FORMAT).to_string(),
            instant,
        }
    }

    /// Parses an encoded key, rejecting anything not in canonical form.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not exactly `YYYY-MM-DDTHH:MM:SSZ`.
    pub fn parse(s: &str) -> Result<Self, TimeKeyError> {
        if s.len() != TIME_KEY_LEN {
            return Err(TimeKeyError(s.to_string()));
        }
        NaiveDateTime::parse_from_str(s, TIME_KEY_FORMAT)
            .ok()
            .map(|naive| Self::from_datetime(naive.and_utc()))
            .filter(|key| key.encoded == s)
            .ok_or_else(|| TimeKeyError(s.to_string()))
    }

    /// Returns the encoded string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    /// Returns the instant the key encodes.
    #[must_use]
    pub const fn to_datetime(&self) -> DateTime<Utc> {
        self.instant
    }
}

impl From<DateTime<Utc>> for TimeKey {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_datetime(dt)
    }
}

impl std::fmt::Display for TimeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.encoded)
    }
}

/// Error for strings that are not canonical time keys.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid timestamp key '{0}', expected YYYY-MM-DDTHH:MM:SSZ")]
pub struct TimeKeyError(String);

/// Serde adapter writing a `DateTime<Utc>` in [`TimeKey`] form.
pub mod serde_time_key {
    use super::*;

    /// Serializes an instant as its time key.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        TimeKey::from_datetime(*dt).as_str().serialize(serializer)
    }

    /// Deserializes an instant from its time key.
    ///
    /// # Errors
    ///
    /// Fails if the string is not a canonical key.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        TimeKey::parse(&raw)
            .map(|key| key.to_datetime())
            .map_err(serde::de::Error::custom)
    }
}
