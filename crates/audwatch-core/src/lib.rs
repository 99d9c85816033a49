//! # AudWatch Core
//! Configuration, error types, rate records, report formatting, and the
//! file-backed store shared by every AudWatch crate.

pub mod config;
pub mod error;
pub mod format;
pub mod store;
pub mod traits;
pub mod types;

pub use config::Config;
pub use error::{AudWatchError, Result};
pub use format::{FETCH_FAILED_MESSAGE, format_message};
pub use store::RateStore;
pub use traits::{Notifier, RateSource};
pub use types::{RateHistory, RateRecord};
