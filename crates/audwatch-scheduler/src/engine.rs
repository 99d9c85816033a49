//! Scheduler engine — run once now, then once a day at the send time.

use async_trait::async_trait;
use audwatch_core::error::Result;
use chrono::{NaiveDateTime, NaiveTime};
use std::future::Future;
use std::time::Duration;

use crate::schedule::next_fire_after;

/// How often the idle loop checks whether the fire time has been reached.
pub const POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Pause after a failed iteration before polling resumes.
pub const ERROR_BACKOFF: Duration = Duration::from_secs(300);

/// Work the scheduler runs.
#[async_trait]
pub trait Job: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
}

pub struct SchedulerEngine<J: Job> {
    job: J,
    send_time: NaiveTime,
    next_fire: Option<NaiveDateTime>,
    state: SchedulerState,
    poll_interval: Duration,
    error_backoff: Duration,
    runs: u64,
}

impl<J: Job> SchedulerEngine<J> {
    pub fn new(job: J, send_time: NaiveTime) -> Self {
        Self {
            job,
            send_time,
            next_fire: None,
            state: SchedulerState::Idle,
            poll_interval: POLL_INTERVAL,
            error_backoff: ERROR_BACKOFF,
            runs: 0,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_error_backoff(mut self, backoff: Duration) -> Self {
        self.error_backoff = backoff;
        self
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn next_fire(&self) -> Option<NaiveDateTime> {
        self.next_fire
    }

    /// Completed job runs, successful or not.
    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// Set the next fire time relative to `now`.
    pub fn schedule_from(&mut self, now: NaiveDateTime) -> NaiveDateTime {
        let next = next_fire_after(now, self.send_time);
        self.next_fire = Some(next);
        next
    }

    async fn run_job(&mut self) -> Result<()> {
        self.state = SchedulerState::Running;
        let result = self.job.run().await;
        self.state = SchedulerState::Idle;
        self.runs += 1;
        result
    }

    /// One poll. Runs the job if the fire time has been reached and
    /// returns whether it ran.
    ///
    /// On failure the fire time is left as is, so the next poll retries.
    pub async fn tick(&mut self, now: NaiveDateTime) -> Result<bool> {
        let next = match self.next_fire {
            Some(next) => next,
            None => self.schedule_from(now),
        };
        if now < next {
            return Ok(false);
        }

        tracing::info!("⏰ Fire time {next} reached, running {}", self.job.name());
        self.run_job().await?;
        let upcoming = self.schedule_from(now);
        tracing::info!("Next run of {} at {upcoming}", self.job.name());
        Ok(true)
    }

    /// Run the job immediately, then poll until `shutdown` resolves.
    ///
    /// `shutdown` is polled alongside every run as well as every sleep, so
    /// an interrupt during a slow run stops the loop right away.
    pub async fn run_until<F>(mut self, shutdown: F) -> Self
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let first = self.schedule_from(local_now());
        tracing::info!(
            "Scheduled {} daily at {} (first run {first})",
            self.job.name(),
            self.send_time.format("%H:%M")
        );

        tracing::info!("Running {} once at startup", self.job.name());
        let startup = tokio::select! {
            _ = &mut shutdown => None,
            result = self.run_job() => Some(result),
        };
        match startup {
            None => return self.interrupted(),
            Some(Err(e)) => tracing::error!("Startup run of {} failed: {e}", self.job.name()),
            Some(Ok(())) => {}
        }

        loop {
            let polled = tokio::select! {
                _ = &mut shutdown => None,
                result = self.tick(local_now()) => Some(result),
            };
            let delay = match polled {
                None => return self.interrupted(),
                Some(Ok(_)) => self.poll_interval,
                Some(Err(e)) => {
                    tracing::error!(
                        "Scheduled run of {} failed: {e}, retrying in {}s",
                        self.job.name(),
                        self.error_backoff.as_secs()
                    );
                    self.error_backoff
                }
            };

            let stop = tokio::select! {
                _ = &mut shutdown => true,
                _ = tokio::time::sleep(delay) => false,
            };
            if stop {
                return self.interrupted();
            }
        }
    }

    fn interrupted(mut self) -> Self {
        // A cancelled run never reached its own reset.
        self.state = SchedulerState::Idle;
        tracing::info!("Interrupted, scheduler stopped after {} runs", self.runs);
        self
    }
}

fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

#[cfg(test)]
mod tests {
    use super::*;
    use audwatch_core::error::AudWatchError;
    use chrono::NaiveDate;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingJob {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl CountingJob {
        fn new(fail: bool) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (Self { calls: calls.clone(), fail }, calls)
        }
    }

    #[async_trait]
    impl Job for CountingJob {
        fn name(&self) -> &str { "counting" }

        async fn run(&self) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(AudWatchError::Schedule("boom".into()))
            } else {
                Ok(())
            }
        }
    }

    struct SlowJob;

    #[async_trait]
    impl Job for SlowJob {
        fn name(&self) -> &str { "slow" }

        async fn run(&self) -> Result<()> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(())
        }
    }

    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap().and_hms_opt(h, m, 0).unwrap()
    }

    fn nine() -> NaiveTime {
        NaiveTime::from_hms_opt(9, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_idle_before_fire_time() {
        let (job, calls) = CountingJob::new(false);
        let mut engine = SchedulerEngine::new(job, nine());
        engine.schedule_from(at(1, 8, 0));

        assert!(!engine.tick(at(1, 8, 59)).await.unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(engine.state(), SchedulerState::Idle);
    }

    #[tokio::test]
    async fn test_runs_at_fire_time_then_waits_a_day() {
        let (job, calls) = CountingJob::new(false);
        let mut engine = SchedulerEngine::new(job, nine());
        engine.schedule_from(at(1, 8, 0));

        assert!(engine.tick(at(1, 9, 0)).await.unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(engine.next_fire(), Some(at(2, 9, 0)));
        assert_eq!(engine.state(), SchedulerState::Idle);

        // Later polls the same day do nothing.
        assert!(!engine.tick(at(1, 9, 1)).await.unwrap());
        assert!(!engine.tick(at(1, 23, 59)).await.unwrap());
        assert_eq!(engine.runs(), 1);
    }

    #[tokio::test]
    async fn test_late_poll_still_fires() {
        let (job, calls) = CountingJob::new(false);
        let mut engine = SchedulerEngine::new(job, nine());
        engine.schedule_from(at(1, 8, 0));

        assert!(engine.tick(at(1, 9, 4)).await.unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(engine.next_fire(), Some(at(2, 9, 0)));
    }

    #[tokio::test]
    async fn test_failed_run_keeps_fire_time() {
        let (job, calls) = CountingJob::new(true);
        let mut engine = SchedulerEngine::new(job, nine());
        engine.schedule_from(at(1, 8, 0));

        assert!(engine.tick(at(1, 9, 0)).await.is_err());
        assert_eq!(engine.next_fire(), Some(at(1, 9, 0)));
        assert_eq!(engine.state(), SchedulerState::Idle);

        // The retry after backoff runs again.
        assert!(engine.tick(at(1, 9, 5)).await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_run_until_runs_immediately_and_stops() {
        let (job, calls) = CountingJob::new(false);
        let send_time = (chrono::Local::now() + chrono::Duration::hours(12)).time();
        let engine = SchedulerEngine::new(job, send_time)
            .with_poll_interval(Duration::from_millis(10));

        let engine = engine
            .run_until(tokio::time::sleep(Duration::from_millis(60)))
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(engine.runs(), 1);
        assert!(engine.next_fire().is_some());
    }

    #[tokio::test]
    async fn test_run_until_survives_failing_job() {
        let (job, calls) = CountingJob::new(true);
        let send_time = (chrono::Local::now() + chrono::Duration::hours(12)).time();
        let engine = SchedulerEngine::new(job, send_time)
            .with_poll_interval(Duration::from_millis(10))
            .with_error_backoff(Duration::from_millis(10));

        let engine = engine
            .run_until(tokio::time::sleep(Duration::from_millis(60)))
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(engine.state(), SchedulerState::Idle);
    }

    #[tokio::test]
    async fn test_interrupt_during_startup_run() {
        let send_time = (chrono::Local::now() + chrono::Duration::hours(12)).time();
        let engine = SchedulerEngine::new(SlowJob, send_time);

        let engine = tokio::time::timeout(
            Duration::from_secs(5),
            engine.run_until(tokio::time::sleep(Duration::from_millis(50))),
        )
        .await
        .expect("shutdown should cancel the startup run");

        assert_eq!(engine.runs(), 0);
        assert_eq!(engine.state(), SchedulerState::Idle);
    }
}
