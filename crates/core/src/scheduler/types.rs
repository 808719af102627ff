//! Periodic task description and timing statistics

/// Static description of a periodic task
#[derive(Debug, Clone, Copy)]
pub struct TaskMetadata {
    /// Task name for logs
    pub name: &'static str,

    /// Target rate in Hz (must be non-zero)
    pub rate_hz: u32,

    /// Priority hint, higher is more important. The cooperative executor
    /// does not enforce it; it only orders the status report.
    pub priority: u8,

    /// Execution time budget in microseconds; exceeding it counts as a
    /// deadline miss
    pub budget_us: u32,
}

impl TaskMetadata {
    /// Period in microseconds derived from the rate
    #[inline]
    pub const fn period_us(&self) -> u32 {
        if self.rate_hz == 0 {
            return u32::MAX;
        }
        1_000_000 / self.rate_hz
    }

    /// True if `execution_us` fits the budget
    #[inline]
    pub const fn is_within_budget(&self, execution_us: u32) -> bool {
        execution_us <= self.budget_us
    }

    /// True if a measured period is within 5% of the target
    #[inline]
    pub fn is_period_acceptable(&self, actual_period_us: u32) -> bool {
        let target = self.period_us();
        let tolerance = target / 20;
        let lower = target.saturating_sub(tolerance);
        let upper = target.saturating_add(tolerance);
        actual_period_us >= lower && actual_period_us <= upper
    }
}

/// Runtime timing statistics for one task
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskStats {
    /// Last execution time in microseconds
    pub last_execution_us: u32,

    /// Execution time EMA (alpha = 0.1)
    pub avg_execution_us: u32,

    /// Maximum execution time observed in microseconds
    pub max_execution_us: u32,

    /// Number of deadline misses (execution time > budget)
    pub deadline_misses: u32,

    /// Last measured period in microseconds (time between executions)
    pub last_period_us: u32,

    /// EMA of the absolute deviation from the target period
    pub avg_jitter_us: u32,

    /// Total number of executions
    pub execution_count: u64,
}

impl TaskStats {
    /// Record one execution of `task` that took `execution_us` and started
    /// `period_us` after the previous one
    pub fn update(&mut self, task: &TaskMetadata, execution_us: u32, period_us: u32) {
        self.last_execution_us = execution_us;
        self.last_period_us = period_us;
        self.execution_count = self.execution_count.saturating_add(1);

        // avg = (value + 9 * avg) / 10
        if self.avg_execution_us == 0 {
            self.avg_execution_us = execution_us;
        } else {
            self.avg_execution_us = (execution_us + 9 * self.avg_execution_us) / 10;
        }

        self.max_execution_us = self.max_execution_us.max(execution_us);

        if !task.is_within_budget(execution_us) {
            self.deadline_misses = self.deadline_misses.saturating_add(1);
        }

        let jitter = period_us.abs_diff(task.period_us());

        if self.avg_jitter_us == 0 {
            self.avg_jitter_us = jitter;
        } else {
            self.avg_jitter_us = (jitter + 9 * self.avg_jitter_us) / 10;
        }
    }

    /// Forget all measurements
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FUSION: TaskMetadata = TaskMetadata {
        name: "fusion",
        rate_hz: 200,
        priority: 30,
        budget_us: 1_500,
    };

    #[test]
    fn test_period_from_rate() {
        assert_eq!(FUSION.period_us(), 5_000);
        let idle = TaskMetadata {
            rate_hz: 0,
            ..FUSION
        };
        assert_eq!(idle.period_us(), u32::MAX);
    }

    #[test]
    fn test_budget_and_period_tolerance() {
        assert!(FUSION.is_within_budget(1_500));
        assert!(!FUSION.is_within_budget(1_501));

        // 5% of 5000us = 250us
        assert!(FUSION.is_period_acceptable(4_750));
        assert!(FUSION.is_period_acceptable(5_250));
        assert!(!FUSION.is_period_acceptable(5_400));
    }

    #[test]
    fn test_stats_ema_and_misses() {
        let mut stats = TaskStats::default();
        stats.update(&FUSION, 1_000, 5_000);
        assert_eq!(stats.avg_execution_us, 1_000);
        assert_eq!(stats.avg_jitter_us, 0);

        stats.update(&FUSION, 2_000, 5_300);
        assert_eq!(stats.avg_execution_us, (2_000 + 9 * 1_000) / 10);
        assert_eq!(stats.max_execution_us, 2_000);
        assert_eq!(stats.deadline_misses, 1);
        assert_eq!(stats.avg_jitter_us, 300);

        stats.update(&FUSION, 1_000, 4_900);
        assert_eq!(stats.avg_jitter_us, (100 + 9 * 300) / 10);
        assert_eq!(stats.execution_count, 3);

        stats.reset();
        assert_eq!(stats.execution_count, 0);
    }
}
