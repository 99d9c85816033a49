//! Seams between the pipeline and its collaborators.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::RateRecord;

/// A source of exchange-rate observations.
#[async_trait]
pub trait RateSource: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch the current rate. Every failure class surfaces as an error.
    async fn fetch(&self) -> Result<RateRecord>;
}

/// A delivery target for the formatted report.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    /// Deliver `message`. `record` is the observation behind it, absent
    /// when the fetch failed.
    async fn notify(&self, message: &str, record: Option<&RateRecord>) -> Result<()>;
}
