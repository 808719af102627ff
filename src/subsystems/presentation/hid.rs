//! Gamepad presentation
//!
//! Standalone nodes without a relay coordinator present their own orientation
//! as gamepad axes.

use crate::communication::hid::{HidReporter, ReportSink};
use crate::core::scheduler::PeriodicStep;
use crate::core::traits::SharedState;
use crate::log_debug;
use crate::subsystems::fusion::PoseState;
use jtracker_core::calibration::CalibrationStatus;

/// Presentation loop body for the gamepad report
pub struct HidPresenter<'a, R, S>
where
    R: ReportSink,
    S: SharedState<PoseState>,
{
    reporter: HidReporter<R>,
    state: &'a S,
    last_sequence: u32,
}

impl<'a, R, S> HidPresenter<'a, R, S>
where
    R: ReportSink,
    S: SharedState<PoseState>,
{
    /// Report the orientation held in `state`
    pub fn new(reporter: HidReporter<R>, state: &'a S) -> Self {
        Self {
            reporter,
            state,
            last_sequence: 0,
        }
    }

    /// Underlying reporter
    pub fn reporter(&self) -> &HidReporter<R> {
        &self.reporter
    }

    /// Report a new orientation if fusion published one since the last call.
    /// Nothing is reported while calibration is still running.
    pub async fn run_once(&mut self) -> bool {
        let (sequence, calibration, orientation) = self
            .state
            .with(|s| (s.sequence, s.calibration, s.orientation));
        if sequence == self.last_sequence || calibration != CalibrationStatus::Done {
            return false;
        }

        match self.reporter.report(&orientation).await {
            Ok(sent) => {
                self.last_sequence = sequence;
                sent
            }
            Err(e) => {
                log_debug!("gamepad report failed: {}", e);
                false
            }
        }
    }
}

impl<'a, R, S> PeriodicStep for HidPresenter<'a, R, S>
where
    R: ReportSink,
    S: SharedState<PoseState>,
{
    async fn step(&mut self) {
        self.run_once().await;
    }
}
