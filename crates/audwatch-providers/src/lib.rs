//! # AudWatch Providers
//! Exchange-rate sources.

pub mod exchangerate;

use audwatch_core::config::Config;
use audwatch_core::error::{AudWatchError, Result};
use audwatch_core::traits::RateSource;
use audwatch_core::types::RateRecord;

pub use exchangerate::ExchangeRateProvider;

/// Create the rate source for this configuration.
pub fn create_provider(config: &Config) -> Result<Box<dyn RateSource>> {
    Ok(Box::new(ExchangeRateProvider::new(config)?))
}

/// Fetch once, normalizing every failure to `None`.
///
/// Each failure class is logged with its own message; the caller only
/// sees whether a record was produced.
pub async fn fetch_rate(source: &dyn RateSource) -> Option<RateRecord> {
    match source.fetch().await {
        Ok(record) => {
            tracing::info!(
                "Fetched rate from {}: 1 {} = {:.4} {}",
                source.name(),
                record.base,
                record.rate,
                record.target
            );
            Some(record)
        }
        Err(e) => {
            match &e {
                e if e.is_network() => tracing::error!("Failed to fetch rate - network error: {e}"),
                AudWatchError::Parse(_) => tracing::error!("Failed to fetch rate - JSON parse error: {e}"),
                AudWatchError::RateMissing(_) | AudWatchError::InvalidRate(_) => {
                    tracing::error!("Failed to fetch rate - bad data: {e}")
                }
                _ => tracing::error!("Failed to fetch rate - unexpected error: {e}"),
            }
            None
        }
    }
}
