//! Console channel — prints the report to standard output.

use async_trait::async_trait;
use audwatch_core::error::Result;
use audwatch_core::traits::Notifier;
use audwatch_core::types::RateRecord;
use std::io::Write;

pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn new() -> Self { Self }
}

impl Default for ConsoleNotifier {
    fn default() -> Self { Self::new() }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    fn name(&self) -> &str { "console" }

    async fn notify(&self, message: &str, _record: Option<&RateRecord>) -> Result<()> {
        // A closed stdout is not worth failing the run over.
        {
            let mut out = std::io::stdout().lock();
            writeln!(out, "\n{message}\n").ok();
            out.flush().ok();
        }
        Ok(())
    }
}
