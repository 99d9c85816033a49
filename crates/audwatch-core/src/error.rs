//! Unified error types for AudWatch.

use thiserror::Error;

/// Result type alias using AudWatchError.
pub type Result<T> = std::result::Result<T, AudWatchError>;

#[derive(Error, Debug)]
pub enum AudWatchError {
    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Fetch errors
    #[error("Network error: {0}")]
    Http(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("JSON parse error: {0}")]
    Parse(String),

    #[error("Rate for {0} not found in API response")]
    RateMissing(String),

    #[error("Invalid rate: {0}")]
    InvalidRate(String),

    // Persistence errors
    #[error("Storage error: {0}")]
    Storage(String),

    // Delivery errors
    #[error("Email error: {0}")]
    Email(String),

    #[error("Email notifications are disabled")]
    EmailDisabled,

    #[error("Email configuration incomplete: {0}")]
    EmailIncomplete(String),

    // Scheduler errors
    #[error("Schedule error: {0}")]
    Schedule(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AudWatchError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn email(msg: impl Into<String>) -> Self {
        Self::Email(msg.into())
    }

    /// Network-level failures (connection, timeout, bad status).
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Timeout(_) | Self::Provider(_))
    }
}
