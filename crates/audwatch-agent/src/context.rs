//! Application context — everything loaded once at startup and shared by
//! every run until the process exits.

use audwatch_core::config::Config;
use audwatch_core::store::RateStore;
use std::path::Path;

/// Immutable process-wide state: configuration plus the persisted-file store.
#[derive(Debug, Clone)]
pub struct AppContext {
    config: Config,
    store: RateStore,
}

impl AppContext {
    /// Load (or initialize) the config at `config_path` and open the store
    /// in `data_dir`. Never fails: bad config falls back to defaults.
    pub fn load(config_path: &Path, data_dir: &Path) -> Self {
        let config = Config::load_or_init(config_path);
        tracing::debug!("Loaded config: {:?}", config.redacted());
        Self::new(config, RateStore::new(data_dir))
    }

    pub fn new(config: Config, store: RateStore) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &RateStore {
        &self.store
    }
}
