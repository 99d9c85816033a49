//! # AudWatch Scheduler
//!
//! Daily job scheduler with a fixed polling loop.
//!
//! ## Design
//! - Single task, sequential: a run finishes before the next poll
//! - Tokio timers only, zero work while idle
//! - Interrupt ends the loop; a failed run backs off and retries
//!
//! ## State machine
//! ```text
//!   start ──► Running (immediate run) ──► Idle
//!                                          │ poll every 60s
//!                    ┌─────────────────────┘
//!                    ▼
//!             now >= next fire? ── no ──► Idle
//!                    │ yes
//!                    ▼
//!                 Running ── ok ──► Idle (next fire = tomorrow)
//!                    │ err
//!                    └──► Idle after 5 min backoff (same fire time)
//! ```

pub mod engine;
pub mod schedule;

pub use engine::{Job, SchedulerEngine, SchedulerState};
pub use schedule::next_fire_after;
