//! Exchange-rate observation types.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{AudWatchError, Result};

/// Format used for the fetch timestamp, in messages and in the history file.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format used for the local fallback date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Maximum number of records kept in the rate history.
pub const HISTORY_CAP: usize = 30;

/// One fetched observation of the exchange rate.
///
/// `rate` is always finite and strictly positive; construct through
/// [`RateRecord::new`] to keep it that way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateRecord {
    pub rate: f64,
    pub base: String,
    pub target: String,
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    /// Calendar date reported by the provider (local date when absent).
    pub date: String,
}

impl RateRecord {
    pub fn new(
        rate: f64,
        base: impl Into<String>,
        target: impl Into<String>,
        timestamp: NaiveDateTime,
        date: impl Into<String>,
    ) -> Result<Self> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(AudWatchError::InvalidRate(format!("{rate} is not a positive number")));
        }
        Ok(Self {
            rate,
            base: base.into(),
            target: target.into(),
            timestamp,
            date: date.into(),
        })
    }

    /// Price of one unit of the target currency in the base currency.
    pub fn inverse(&self) -> f64 {
        1.0 / self.rate
    }
}

/// Most recent rate observations, oldest first, capped at [`HISTORY_CAP`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateHistory {
    records: Vec<RateRecord>,
}

impl RateHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, evicting the oldest ones beyond the cap.
    pub fn push(&mut self, record: RateRecord) {
        self.records.push(record);
        self.trim_if_needed();
    }

    fn trim_if_needed(&mut self) {
        if self.records.len() > HISTORY_CAP {
            let excess = self.records.len() - HISTORY_CAP;
            self.records.drain(..excess);
        }
    }

    pub fn records(&self) -> &[RateRecord] {
        &self.records
    }

    pub fn latest(&self) -> Option<&RateRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<RateRecord>> for RateHistory {
    fn from(records: Vec<RateRecord>) -> Self {
        let mut history = Self { records };
        history.trim_if_needed();
        history
    }
}

mod timestamp_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::TIMESTAMP_FORMAT;

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}
