//! # AudWatch Channels
//! Delivery targets for the daily rate report.
//!
//! | Channel | Target |
//! |---------|--------|
//! | console | standard output |
//! | file | `daily_rates.txt` + `rates_history.json` |
//! | email | SMTP with STARTTLS |

pub mod console;
pub mod email;
pub mod file;

use audwatch_core::config::Config;
use audwatch_core::store::RateStore;
use audwatch_core::traits::Notifier;

pub use console::ConsoleNotifier;
pub use email::{EmailConfig, EmailNotifier};
pub use file::FileNotifier;

/// Create every notifier, in delivery order: console, file, email.
pub fn create_notifiers(config: &Config, store: RateStore) -> Vec<Box<dyn Notifier>> {
    vec![
        Box::new(ConsoleNotifier::new()),
        Box::new(FileNotifier::new(store)),
        Box::new(EmailNotifier::new(EmailConfig::from(config))),
    ]
}
