//! exchangerate-api.com provider — free v4 endpoint, or keyed v6 endpoint
//! when an API key is configured.

use async_trait::async_trait;
use audwatch_core::config::Config;
use audwatch_core::error::{AudWatchError, Result};
use audwatch_core::traits::RateSource;
use audwatch_core::types::{DATE_FORMAT, RateRecord};
use std::time::Duration;

pub const FREE_API_ROOT: &str = "https://api.exchangerate-api.com";
pub const KEYED_API_ROOT: &str = "https://v6.exchangerate-api.com";

/// Request timeout for a single fetch.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct ExchangeRateProvider {
    base: String,
    target: String,
    api_key: Option<String>,
    free_root: String,
    keyed_root: String,
    client: reqwest::Client,
}

impl ExchangeRateProvider {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config.has_api_key().then(|| config.api_key.trim().to_string());

        Ok(Self {
            base: config.base_currency.trim().to_uppercase(),
            target: config.target_currency.trim().to_uppercase(),
            api_key,
            free_root: FREE_API_ROOT.into(),
            keyed_root: KEYED_API_ROOT.into(),
            client: build_client(DEFAULT_TIMEOUT)?,
        })
    }

    /// Point both endpoints at another server root (used against mock servers).
    pub fn with_endpoint(mut self, root: impl Into<String>) -> Self {
        let root = root.into().trim_end_matches('/').to_string();
        self.free_root = root.clone();
        self.keyed_root = root;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = build_client(timeout)?;
        Ok(self)
    }

    /// Request URL for the configured base currency.
    pub fn request_url(&self) -> String {
        match &self.api_key {
            Some(key) => format!("{}/v6/{key}/latest/{}", self.keyed_root, self.base),
            None => format!("{}/v4/latest/{}", self.free_root, self.base),
        }
    }

    fn extract_rate(&self, json: &serde_json::Value) -> Result<f64> {
        // v4 names the mapping `rates`, v6 names it `conversion_rates`.
        let rates = json.get("rates").or_else(|| json.get("conversion_rates"));
        rates
            .and_then(|r| r.get(&self.target))
            .and_then(serde_json::Value::as_f64)
            .ok_or_else(|| AudWatchError::RateMissing(self.target.clone()))
    }
}

fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        // One connection per fetch, closed afterwards.
        .pool_max_idle_per_host(0)
        .user_agent(concat!("audwatch/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| AudWatchError::Http(format!("HTTP client init failed: {e}")))
}

fn classify(e: reqwest::Error) -> AudWatchError {
    if e.is_timeout() {
        AudWatchError::Timeout(e.to_string())
    } else {
        AudWatchError::Http(e.to_string())
    }
}

#[async_trait]
impl RateSource for ExchangeRateProvider {
    fn name(&self) -> &str { "exchangerate-api" }

    async fn fetch(&self) -> Result<RateRecord> {
        tracing::debug!(
            "Fetching {}/{} from {} endpoint",
            self.base,
            self.target,
            if self.api_key.is_some() { "keyed" } else { "free" }
        );

        let resp = self.client
            .get(self.request_url())
            .send()
            .await
            .map_err(classify)?;

        if !resp.status().is_success() {
            let status = resp.status();
            return Err(AudWatchError::provider(format!("exchangerate-api returned {status}")));
        }

        let body = resp.text().await.map_err(classify)?;
        let json: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| AudWatchError::Parse(e.to_string()))?;

        let rate = self.extract_rate(&json)?;
        let now = chrono::Local::now().naive_local();
        let date = json["date"]
            .as_str()
            .map(String::from)
            .unwrap_or_else(|| now.format(DATE_FORMAT).to_string());

        RateRecord::new(rate, &self.base, &self.target, now, date)
    }
}
