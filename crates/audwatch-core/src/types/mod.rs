//! Shared data types.

pub mod rate;

pub use rate::{DATE_FORMAT, HISTORY_CAP, RateHistory, RateRecord, TIMESTAMP_FORMAT};
