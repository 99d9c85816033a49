//! Daily fire-time computation.

use chrono::{Days, NaiveDateTime, NaiveTime};

/// Next instant at `send_time`, strictly after `now`: today if still
/// ahead, otherwise tomorrow.
pub fn next_fire_after(now: NaiveDateTime, send_time: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(send_time);
    if today > now {
        today
    } else {
        now.date()
            .checked_add_days(Days::new(1))
            .map(|d| d.and_time(send_time))
            .unwrap_or(NaiveDateTime::MAX)
    }
}
