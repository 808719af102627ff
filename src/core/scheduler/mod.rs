//! Periodic task driver
//!
//! [`TaskTimer`] measures period and execution time for one task and feeds
//! [`TaskStats`]; [`run_periodic`] wraps it in an Embassy `Ticker` loop. The
//! timer is clock-generic so the bookkeeping is tested on host with
//! `MockTime`.

use crate::core::traits::{SharedState, TimeSource};
use jtracker_core::scheduler::{TaskMetadata, TaskStats};

pub use jtracker_core::scheduler::{
    CALIBRATION_POLL_MS, FUSION_TASK, PRESENTATION_TASK, RELAY_TASK, STATUS_TASK,
};

/// One iteration of a periodic task
#[allow(async_fn_in_trait)]
pub trait PeriodicStep {
    /// Run one iteration. Must not block beyond a bounded bus timeout.
    async fn step(&mut self);
}

/// Period and execution time bookkeeping for one task
#[derive(Debug, Clone)]
pub struct TaskTimer<T: TimeSource> {
    time: T,
    task: TaskMetadata,
    last_start_us: Option<u64>,
}

impl<T: TimeSource> TaskTimer<T> {
    /// Timer for `task`
    pub fn new(task: TaskMetadata, time: T) -> Self {
        Self {
            time,
            task,
            last_start_us: None,
        }
    }

    /// Task being timed
    pub fn task(&self) -> &TaskMetadata {
        &self.task
    }

    /// Mark the start of an iteration, returning its timestamp
    pub fn begin(&mut self) -> u64 {
        self.time.now_us()
    }

    /// Close the iteration started at `start_us` and record it.
    ///
    /// Returns the execution time. The first iteration reports the nominal
    /// period since there is nothing to measure against.
    pub fn finish<S: SharedState<TaskStats>>(&mut self, start_us: u64, stats: &S) -> u32 {
        let execution_us = clamp_u32(self.time.elapsed_since(start_us));
        let period_us = match self.last_start_us {
            Some(last) => clamp_u32(start_us.saturating_sub(last)),
            None => self.task.period_us(),
        };
        self.last_start_us = Some(start_us);

        stats.with_mut(|s| s.update(&self.task, execution_us, period_us));
        execution_us
    }
}

fn clamp_u32(v: u64) -> u32 {
    u32::try_from(v).unwrap_or(u32::MAX)
}

/// Run `step` forever at the task's rate, recording timing into `stats`
#[cfg(feature = "embassy")]
pub async fn run_periodic<P, S>(task: TaskMetadata, stats: &S, step: &mut P) -> !
where
    P: PeriodicStep,
    S: SharedState<TaskStats>,
{
    use crate::core::traits::EmbassyTime;
    use embassy_time::{Duration, Ticker};

    let mut ticker = Ticker::every(Duration::from_micros(u64::from(task.period_us())));
    let mut timer = TaskTimer::new(task, EmbassyTime);

    crate::log_info!("{} task started at {} Hz", task.name, task.rate_hz);

    loop {
        let start = timer.begin();
        step.step().await;
        let execution_us = timer.finish(start, stats);
        if !task.is_within_budget(execution_us) {
            crate::log_debug!(
                "{} overran: {}us > {}us",
                task.name,
                execution_us,
                task.budget_us
            );
        }
        ticker.next().await;
    }
}
