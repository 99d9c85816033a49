//! Configuration loading for AudWatch.
//!
//! Settings live in a flat JSON file. Missing keys fall back to their
//! defaults individually, a missing file is created with the defaults, and
//! a corrupt file never stops the process: it is logged and ignored.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AudWatchError, Result};

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

const DEFAULT_SEND_TIME: &str = "09:00";

/// Runtime configuration, loaded once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Key for the v6 endpoint. Empty means the free endpoint is used.
    pub api_key: String,
    pub base_currency: String,
    pub target_currency: String,
    /// Daily send time, "HH:MM" local time.
    pub send_time: String,
    pub email_enabled: bool,
    pub smtp_server: String,
    pub smtp_port: u16,
    pub sender_email: String,
    pub sender_password: String,
    pub receiver_email: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_currency: "CNY".into(),
            target_currency: "AUD".into(),
            send_time: DEFAULT_SEND_TIME.into(),
            email_enabled: false,
            smtp_server: "smtp.qq.com".into(),
            smtp_port: 587,
            sender_email: String::new(),
            sender_password: String::new(),
            receiver_email: String::new(),
        }
    }
}

impl Config {
    /// Default config path.
    pub fn default_path() -> PathBuf {
        PathBuf::from(DEFAULT_CONFIG_FILE)
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AudWatchError::config(format!("read {}: {e}", path.display())))?;
        serde_json::from_str(&content)
            .map_err(|e| AudWatchError::config(format!("parse {}: {e}", path.display())))
    }

    /// Save config to a specific path as pretty-printed JSON.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load config, writing the defaults first if the file does not exist.
    ///
    /// Never fails: any read, parse, or write error is logged and the
    /// defaults are returned instead.
    pub fn load_or_init(path: &Path) -> Self {
        if path.exists() {
            return match Self::load_from(path) {
                Ok(config) => config,
                Err(e) => {
                    tracing::error!("Failed to load config file: {e}");
                    Self::default()
                }
            };
        }

        let config = Self::default();
        match config.save_to(path) {
            Ok(()) => tracing::info!(
                "Created default config file {}, please fill in your settings",
                path.display()
            ),
            Err(e) => tracing::error!("Failed to write default config {}: {e}", path.display()),
        }
        config
    }

    /// Parsed daily send time. An unparseable value falls back to 09:00.
    pub fn send_time(&self) -> NaiveTime {
        parse_send_time(&self.send_time).unwrap_or_else(|| {
            tracing::warn!(
                "Invalid send_time '{}', falling back to {DEFAULT_SEND_TIME}",
                self.send_time
            );
            NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default()
        })
    }

    /// Whether an API key is configured (selects the keyed endpoint).
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Copy with secrets masked, safe for logging.
    pub fn redacted(&self) -> Self {
        let mask = |s: &str| if s.is_empty() { String::new() } else { "••••••••".to_string() };
        Self {
            api_key: mask(&self.api_key),
            sender_password: mask(&self.sender_password),
            ..self.clone()
        }
    }
}

fn parse_send_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M").ok()
}
