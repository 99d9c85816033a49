//! File-backed repository for everything AudWatch persists.
//!
//! ```text
//! <data dir>/
//!   ├── daily_rates.txt     append-only human log of reports
//!   ├── rates_history.json  JSON array, 30 most recent records
//!   └── aud_rate.log        operational log (written by the tracing layer)
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{AudWatchError, Result};
use crate::types::{RateHistory, RateRecord};

pub const REPORT_LOG_FILE: &str = "daily_rates.txt";
pub const HISTORY_FILE: &str = "rates_history.json";
pub const OPERATIONS_LOG_FILE: &str = "aud_rate.log";

const SEPARATOR_WIDTH: usize = 50;

/// Persisted files under a single data directory.
#[derive(Debug, Clone)]
pub struct RateStore {
    dir: PathBuf,
}

impl RateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn report_log_path(&self) -> PathBuf {
        self.dir.join(REPORT_LOG_FILE)
    }

    pub fn history_path(&self) -> PathBuf {
        self.dir.join(HISTORY_FILE)
    }

    pub fn operations_log_path(&self) -> PathBuf {
        self.dir.join(OPERATIONS_LOG_FILE)
    }

    /// Append a report to the human log, framed by separator lines.
    pub fn append_report(&self, message: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let separator = "-".repeat(SEPARATOR_WIDTH);
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.report_log_path())
            .map_err(|e| AudWatchError::storage(format!("open {REPORT_LOG_FILE}: {e}")))?;
        write!(file, "\n{separator}\n{message}\n{separator}\n")
            .map_err(|e| AudWatchError::storage(format!("write {REPORT_LOG_FILE}: {e}")))?;
        Ok(())
    }

    /// Read the rate history. A missing or corrupt file is an empty history.
    pub fn load_history(&self) -> RateHistory {
        let path = self.history_path();
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return RateHistory::new(),
            Err(e) => {
                tracing::warn!("⚠️ Cannot read {}: {e}, starting empty history", path.display());
                return RateHistory::new();
            }
        };

        match serde_json::from_str::<Vec<RateRecord>>(&content) {
            Ok(records) => RateHistory::from(records),
            Err(e) => {
                tracing::warn!("⚠️ Corrupt {}: {e}, starting empty history", path.display());
                RateHistory::new()
            }
        }
    }

    /// Rewrite the whole history file.
    pub fn save_history(&self, history: &RateHistory) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let content = serde_json::to_string_pretty(history)?;
        std::fs::write(self.history_path(), content)
            .map_err(|e| AudWatchError::storage(format!("write {HISTORY_FILE}: {e}")))?;
        Ok(())
    }

    /// Read-modify-write: append `record` and persist the capped history.
    /// Returns the number of records now stored.
    pub fn push_history(&self, record: RateRecord) -> Result<usize> {
        let mut history = self.load_history();
        history.push(record);
        self.save_history(&history)?;
        Ok(history.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HISTORY_CAP;

    fn record(day: u32) -> RateRecord {
        let ts = chrono::NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        RateRecord::new(0.21, "CNY", "AUD", ts, format!("2024-01-{day:02}")).unwrap()
    }

    #[test]
    fn test_append_report_framing() {
        let dir = tempfile::tempdir().unwrap();
        let store = RateStore::new(dir.path());

        store.append_report("first").unwrap();
        store.append_report("second").unwrap();

        let dashes = "-".repeat(50);
        let content = std::fs::read_to_string(store.report_log_path()).unwrap();
        assert_eq!(
            content,
            format!("\n{dashes}\nfirst\n{dashes}\n\n{dashes}\nsecond\n{dashes}\n")
        );
    }

    #[test]
    fn test_missing_history_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = RateStore::new(dir.path());
        assert!(store.load_history().is_empty());
    }

    #[test]
    fn test_corrupt_history_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let store = RateStore::new(dir.path());
        std::fs::write(store.history_path(), "[{ broken").unwrap();

        assert!(store.load_history().is_empty());
        assert_eq!(store.push_history(record(1)).unwrap(), 1);
        assert_eq!(store.load_history().records()[0].date, "2024-01-01");
    }

    #[test]
    fn test_push_31st_record_evicts_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = RateStore::new(dir.path());

        let full: Vec<_> = (1..=30).map(record).collect();
        store.save_history(&RateHistory::from(full)).unwrap();
        assert_eq!(store.load_history().len(), 30);

        assert_eq!(store.push_history(record(31)).unwrap(), HISTORY_CAP);

        let history = store.load_history();
        assert_eq!(history.len(), 30);
        assert_eq!(history.records()[0].date, "2024-01-02");
        assert_eq!(history.latest().unwrap().date, "2024-01-31");
    }

    #[test]
    fn test_history_file_is_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let store = RateStore::new(dir.path());
        store.push_history(record(1)).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.history_path()).unwrap()).unwrap();
        let arr = raw.as_array().unwrap();
        assert_eq!(arr.len(), 1);
        assert_eq!(arr[0]["timestamp"], "2024-01-01 09:00:00");
    }
}
