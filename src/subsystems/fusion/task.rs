//! Fusion task
//!
//! One step reads a sample, applies pending actions, runs the pipeline and
//! publishes. IMU errors skip the sample; the previous pose stays published.
//!
//! ```ignore
//! #[embassy_executor::task]
//! async fn fusion(imu: Imu, state: &'static EmbassyState<PoseState>,
//!                 stats: &'static EmbassyState<TaskStats>) {
//!     let mut task = FusionTask::new(imu, pipeline, state, EmbassyTime);
//!     run_periodic(FUSION_TASK, stats, &mut task).await
//! }
//! ```

use super::pipeline::{FusionPipeline, FusionStep};
use super::state::PoseState;
use crate::core::scheduler::PeriodicStep;
use crate::core::traits::{SharedState, TimeSource};
use crate::devices::traits::RawImu;
use crate::log_debug;
use jtracker_core::ahrs::Ahrs;

/// Fusion loop body
pub struct FusionTask<'a, I, A, S, T, const N: usize>
where
    I: RawImu,
    A: Ahrs,
    S: SharedState<PoseState>,
    T: TimeSource,
{
    imu: I,
    pipeline: FusionPipeline<A, N>,
    state: &'a S,
    time: T,
    imu_errors: u32,
}

impl<'a, I, A, S, T, const N: usize> FusionTask<'a, I, A, S, T, N>
where
    I: RawImu,
    A: Ahrs,
    S: SharedState<PoseState>,
    T: TimeSource,
{
    /// Bind a sensor and pipeline to the shared state
    pub fn new(imu: I, pipeline: FusionPipeline<A, N>, state: &'a S, time: T) -> Self {
        Self {
            imu,
            pipeline,
            state,
            time,
            imu_errors: 0,
        }
    }

    /// Pipeline, for inspection
    pub fn pipeline(&self) -> &FusionPipeline<A, N> {
        &self.pipeline
    }

    /// Samples skipped because the sensor read failed
    pub fn imu_errors(&self) -> u32 {
        self.imu_errors
    }

    /// Run one iteration, returning what the pipeline produced
    pub async fn run_once(&mut self) -> Option<FusionStep> {
        let pending = self.state.with_mut(|s| s.take_pending());
        if !pending.is_empty() {
            self.pipeline.apply(pending);
        }

        let sample = match self.imu.read_sample().await {
            Ok(sample) => sample,
            Err(e) => {
                self.imu_errors = self.imu_errors.wrapping_add(1);
                log_debug!("IMU read failed: {}", e.as_str());
                return None;
            }
        };

        let step = self.pipeline.step(&sample);
        let now = self.time.now_us();
        self.state
            .with_mut(|s| self.pipeline.publish(&step, s, now));
        Some(step)
    }
}

impl<'a, I, A, S, T, const N: usize> PeriodicStep for FusionTask<'a, I, A, S, T, N>
where
    I: RawImu,
    A: Ahrs,
    S: SharedState<PoseState>,
    T: TimeSource,
{
    async fn step(&mut self) {
        self.run_once().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::{MockState, MockTime};
    use crate::devices::imu::MockRawImu;
    use crate::subsystems::fusion::{FusionConfig, PendingActions};
    use jtracker_core::ahrs::{MadgwickAhrs, MadgwickConfig};
    use jtracker_core::calibration::{Calibration, CalibrationConfig, CalibrationStatus};
    use jtracker_core::imu::SensorScale;

    const WINDOW: usize = 4;

    fn pipeline(time: &MockTime) -> FusionPipeline<MadgwickAhrs<&MockTime>, WINDOW> {
        // No calibration mode registered: fuse from the first sample
        FusionPipeline::new(
            FusionConfig::default(),
            Calibration::new(CalibrationConfig::default()),
            MadgwickAhrs::new(MadgwickConfig::default(), time),
            SensorScale::DEFAULT,
        )
    }

    #[tokio::test]
    async fn test_publishes_each_sample() {
        let time = MockTime::new();
        let state = MockState::new(PoseState::new());
        let mut task = FusionTask::new(MockRawImu::resting(), pipeline(&time), &state, &time);

        for _ in 0..3 {
            time.advance(2_000);
            task.step().await;
        }
        state.with(|s| {
            assert_eq!(s.sequence, 3);
            assert_eq!(s.updated_us, 6_000);
            assert_eq!(s.calibration, CalibrationStatus::Done);
        });
    }

    #[tokio::test]
    async fn test_imu_error_keeps_last_pose() {
        let time = MockTime::new();
        let state = MockState::new(PoseState::new());
        let mut imu = MockRawImu::resting();
        imu.set_healthy(false);
        let mut task = FusionTask::new(imu, pipeline(&time), &state, &time);

        assert!(task.run_once().await.is_none());
        assert_eq!(task.imu_errors(), 1);
        assert!(state.with(|s| s.frame().is_none()));
    }

    #[tokio::test]
    async fn test_pending_actions_reach_pipeline() {
        let time = MockTime::new();
        let state = MockState::new(PoseState::new());
        let mut task = FusionTask::new(MockRawImu::resting(), pipeline(&time), &state, &time);
        task.run_once().await;

        state.with_mut(|s| s.request(PendingActions::GYRO_CALIBRATION));
        let step = task.run_once().await;
        assert!(matches!(
            step,
            Some(FusionStep::Calibrating(CalibrationStatus::GyroProcessing))
        ));
        assert!(state.with(|s| s.pending.is_empty()));
    }
}
