//! # AudWatch Agent
//! The rate monitor — fetches the rate, formats the report, and hands it to
//! every notification channel.

pub mod context;

use async_trait::async_trait;
use audwatch_core::error::{AudWatchError, Result};
use audwatch_core::format::format_message;
use audwatch_core::traits::{Notifier, RateSource};
use audwatch_core::types::RateRecord;
use audwatch_scheduler::Job;

pub use context::AppContext;

/// Outcome of one fetch→format→notify run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub record: Option<RateRecord>,
    pub message: String,
    pub delivered: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl RunReport {
    pub fn fetched(&self) -> bool {
        self.record.is_some()
    }

    pub fn delivered_to(&self, channel: &str) -> bool {
        self.delivered.iter().any(|c| c == channel)
    }
}

/// The AUD rate monitor.
pub struct Monitor {
    context: AppContext,
    source: Box<dyn RateSource>,
    notifiers: Vec<Box<dyn Notifier>>,
}

impl Monitor {
    /// Create a monitor with the standard provider and channels.
    pub fn new(context: AppContext) -> Result<Self> {
        let source = audwatch_providers::create_provider(context.config())?;
        let notifiers = audwatch_channels::create_notifiers(context.config(), context.store().clone());
        Ok(Self::from_parts(context, source, notifiers))
    }

    pub fn from_parts(
        context: AppContext,
        source: Box<dyn RateSource>,
        notifiers: Vec<Box<dyn Notifier>>,
    ) -> Self {
        Self { context, source, notifiers }
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    /// Run the pipeline once. Never fails: a missing rate still produces
    /// the failure message, and channel errors are logged and recorded.
    pub async fn run_daily_task(&self) -> RunReport {
        tracing::info!("Starting AUD rate task");

        let record = audwatch_providers::fetch_rate(self.source.as_ref()).await;
        let message = format_message(record.as_ref());

        let mut report = RunReport {
            record,
            message,
            delivered: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
        };

        for notifier in &self.notifiers {
            let name = notifier.name().to_string();
            match notifier.notify(&report.message, report.record.as_ref()).await {
                Ok(()) => report.delivered.push(name),
                Err(AudWatchError::EmailDisabled) => report.skipped.push(name),
                Err(e) => {
                    tracing::warn!("⚠️ {name} notification failed: {e}");
                    report.failed.push((name, e.to_string()));
                }
            }
        }

        if report.failed.is_empty() {
            tracing::info!("AUD rate task complete");
        } else {
            tracing::error!(
                "AUD rate task finished with {} failed channel(s)",
                report.failed.len()
            );
        }
        report
    }
}

#[async_trait]
impl Job for Monitor {
    fn name(&self) -> &str { "aud-rate-report" }

    async fn run(&self) -> Result<()> {
        self.run_daily_task().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use audwatch_core::config::Config;
    use audwatch_core::format::FETCH_FAILED_MESSAGE;
    use audwatch_core::store::RateStore;
    use audwatch_providers::ExchangeRateProvider;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn monitor(server: &MockServer, dir: &std::path::Path, config: Config) -> Monitor {
        let context = AppContext::new(config.clone(), RateStore::new(dir));
        let source = ExchangeRateProvider::new(&config).unwrap().with_endpoint(server.uri());
        let notifiers = audwatch_channels::create_notifiers(&config, context.store().clone());
        Monitor::from_parts(context, Box::new(source), notifiers)
    }

    #[tokio::test]
    async fn test_successful_run_persists_and_skips_email() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/latest/CNY"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "date": "2024-01-01",
                "rates": { "AUD": 0.21 }
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let monitor = monitor(&server, dir.path(), Config::default());
        let report = monitor.run_daily_task().await;

        assert!(report.fetched());
        assert!(report.message.contains("Rate: 1 CNY = 0.2100 AUD"));
        assert!(report.message.contains("Inverse: 1 AUD = 4.7619 CNY"));
        assert!(report.delivered_to("console"));
        assert!(report.delivered_to("file"));
        assert_eq!(report.skipped, ["email"]);
        assert!(report.failed.is_empty());

        let store = monitor.context().store();
        assert_eq!(store.load_history().len(), 1);
        let log = std::fs::read_to_string(store.report_log_path()).unwrap();
        assert!(log.contains("Date: 2024-01-01"));
    }

    #[tokio::test]
    async fn test_failed_fetch_still_notifies() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let monitor = monitor(&server, dir.path(), Config::default());
        let report = monitor.run_daily_task().await;

        assert!(!report.fetched());
        assert_eq!(report.message, FETCH_FAILED_MESSAGE);
        assert!(report.delivered_to("file"));

        let store = monitor.context().store();
        let log = std::fs::read_to_string(store.report_log_path()).unwrap();
        assert!(log.contains(FETCH_FAILED_MESSAGE));
        assert!(store.load_history().is_empty());
    }

    #[tokio::test]
    async fn test_incomplete_email_is_reported_not_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "rates": { "AUD": 0.21 }
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config = Config { email_enabled: true, ..Config::default() };
        let monitor = monitor(&server, dir.path(), config);

        let report = monitor.run_daily_task().await;
        assert!(report.fetched());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "email");
        assert!(monitor.run().await.is_ok());
    }
}
