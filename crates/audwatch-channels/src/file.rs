//! File channel — appends the report to the text log and records the
//! observation in the capped JSON history.

use async_trait::async_trait;
use audwatch_core::error::Result;
use audwatch_core::store::RateStore;
use audwatch_core::traits::Notifier;
use audwatch_core::types::RateRecord;

pub struct FileNotifier {
    store: RateStore,
}

impl FileNotifier {
    pub fn new(store: RateStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &RateStore {
        &self.store
    }
}

#[async_trait]
impl Notifier for FileNotifier {
    fn name(&self) -> &str { "file" }

    async fn notify(&self, message: &str, record: Option<&RateRecord>) -> Result<()> {
        self.store.append_report(message)?;

        // Failed fetches still reach the text log but never the history.
        if let Some(record) = record {
            let kept = self.store.push_history(record.clone())?;
            tracing::debug!("History now holds {kept} records");
        }

        tracing::info!("Rate report saved to {}", self.store.dir().display());
        Ok(())
    }
}
