//! Human-readable rate report.

use crate::types::{RateRecord, TIMESTAMP_FORMAT};

/// Message produced when no rate could be fetched.
pub const FETCH_FAILED_MESSAGE: &str =
    "Failed to fetch the AUD exchange rate, please check your network connection or API configuration";

/// Render a rate record into the daily report. `None` yields
/// [`FETCH_FAILED_MESSAGE`] so the user always receives something.
pub fn format_message(record: Option<&RateRecord>) -> String {
    let Some(r) = record else {
        return FETCH_FAILED_MESSAGE.to_string();
    };

    format!(
        "{target} Rate Report\n\
         \n\
         Date: {date}\n\
         Time: {time}\n\
         Rate: 1 {base} = {rate:.4} {target}\n\
         Inverse: 1 {target} = {inverse:.4} {base}\n\
         \n\
         Happy investing!",
        target = r.target,
        base = r.base,
        date = r.date,
        time = r.timestamp.format(TIMESTAMP_FORMAT),
        rate = r.rate,
        inverse = r.inverse(),
    )
}
