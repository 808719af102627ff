//! Status subsystem
//!
//! Once a second, logs calibration progress, peak sensor ticks and the
//! publish rate. Also provides the startup wait for calibration.

use crate::core::scheduler::{PeriodicStep, CALIBRATION_POLL_MS};
use crate::core::traits::{SharedState, TimeSource};
use crate::{log_info, log_warn};
use crate::subsystems::fusion::{Peaks, PoseState};
use embedded_hal_async::delay::DelayNs;
use jtracker_core::calibration::CalibrationStatus;

/// One status line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusReport {
    /// Calibration progress
    pub calibration: CalibrationStatus,
    /// Peak corrected ticks
    pub peaks: Peaks,
    /// Frames published per second since the previous report
    pub publish_rate_hz: f32,
}

/// Status loop body
pub struct StatusTask<'a, S, T>
where
    S: SharedState<PoseState>,
    T: TimeSource,
{
    state: &'a S,
    time: T,
    last: Option<(u64, u32)>,
}

impl<'a, S, T> StatusTask<'a, S, T>
where
    S: SharedState<PoseState>,
    T: TimeSource,
{
    /// Report on `state`
    pub fn new(state: &'a S, time: T) -> Self {
        Self {
            state,
            time,
            last: None,
        }
    }

    /// Build and log one report
    pub fn run_once(&mut self) -> StatusReport {
        let (calibration, peaks, sequence) =
            self.state.with(|s| (s.calibration, s.peaks, s.sequence));
        let now = self.time.now_us();

        let publish_rate_hz = match self.last {
            Some((then, seq)) if now > then => {
                sequence.wrapping_sub(seq) as f32 * 1.0e6 / (now - then) as f32
            }
            _ => 0.0,
        };
        self.last = Some((now, sequence));

        log_info!(
            "{} | peak gyro {} accel {} | {} Hz",
            calibration.as_str(),
            peaks.gyro,
            peaks.accel,
            publish_rate_hz
        );

        StatusReport {
            calibration,
            peaks,
            publish_rate_hz,
        }
    }
}

impl<'a, S, T> PeriodicStep for StatusTask<'a, S, T>
where
    S: SharedState<PoseState>,
    T: TimeSource,
{
    async fn step(&mut self) {
        self.run_once();
    }
}

/// Wait until calibration has finished, polling every
/// [`CALIBRATION_POLL_MS`]. Returns the number of polls that found it still
/// running.
pub async fn wait_for_calibration<S, D>(state: &S, delay: &mut D) -> u32
where
    S: SharedState<PoseState>,
    D: DelayNs,
{
    let mut polls = 0u32;
    while state.with(|s| s.calibration) != CalibrationStatus::Done {
        polls = polls.wrapping_add(1);
        delay.delay_ms(CALIBRATION_POLL_MS as u32).await;
    }
    log_info!("calibration done after {} polls", polls);
    polls
}

/// [`wait_for_calibration`] bounded by `timeout_ms`.
///
/// Returns `false` on timeout. Calibration keeps running in the fusion task;
/// only the caller stops waiting.
#[cfg(feature = "embassy")]
pub async fn wait_for_calibration_within<S>(state: &S, timeout_ms: u64) -> bool
where
    S: SharedState<PoseState>,
{
    use embassy_futures::select::{select, Either};
    use embassy_time::{Delay, Timer};

    let mut delay = Delay;
    match select(
        wait_for_calibration(state, &mut delay),
        Timer::after_millis(timeout_ms),
    )
    .await
    {
        Either::First(_) => true,
        Either::Second(()) => {
            log_warn!("calibration still running after {} ms", timeout_ms);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::{MockState, MockTime};
    use jtracker_core::relay::RelayFrame;
    use nalgebra::Quaternion;

    fn publish_n(state: &MockState<PoseState>, n: u32) {
        for _ in 0..n {
            state.with_mut(|s| s.publish(&RelayFrame::single(Quaternion::identity()), 0));
        }
    }

    #[test]
    fn test_report_rate_and_peaks() {
        let time = MockTime::new();
        let state = MockState::new(PoseState::new());
        let mut status = StatusTask::new(&state, &time);

        let first = status.run_once();
        assert_eq!(first.publish_rate_hz, 0.0);
        assert_eq!(first.calibration, CalibrationStatus::GyroProcessing);

        publish_n(&state, 500);
        state.with_mut(|s| {
            s.calibration = CalibrationStatus::Done;
            s.peaks = Peaks {
                gyro: 12,
                accel: 4_100,
            };
        });
        time.advance(1_000_000);

        let report = status.run_once();
        assert!((report.publish_rate_hz - 500.0).abs() < 1e-3);
        assert_eq!(report.calibration, CalibrationStatus::Done);
        assert_eq!(report.peaks.accel, 4_100);
    }

    struct PollDelay<'a> {
        state: &'a MockState<PoseState>,
        remaining: u32,
        waited_ms: u32,
    }

    impl DelayNs for PollDelay<'_> {
        async fn delay_ns(&mut self, ns: u32) {
            self.waited_ms += ns / 1_000_000;
            self.remaining -= 1;
            if self.remaining == 0 {
                self.state
                    .with_mut(|s| s.calibration = CalibrationStatus::Done);
            }
        }
    }

    #[tokio::test]
    async fn test_wait_polls_until_done() {
        let state = MockState::new(PoseState::new());
        let mut delay = PollDelay {
            state: &state,
            remaining: 3,
            waited_ms: 0,
        };
        assert_eq!(wait_for_calibration(&state, &mut delay).await, 3);
        assert_eq!(delay.waited_ms, 3 * CALIBRATION_POLL_MS as u32);
    }

    #[tokio::test]
    async fn test_wait_returns_at_once_when_calibrated() {
        let state = MockState::new(PoseState::new());
        state.with_mut(|s| s.calibration = CalibrationStatus::Done);
        let mut delay = PollDelay {
            state: &state,
            remaining: 1,
            waited_ms: 0,
        };
        assert_eq!(wait_for_calibration(&state, &mut delay).await, 0);
    }
}
