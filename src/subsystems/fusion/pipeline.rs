//! Per-sample fusion pipeline
//!
//! ```text
//! RawSample -> Calibration -> SensorScale -> Ahrs -> [half turn] -> RelayFrame
//!                                                        |
//!                                      local JointDescriptor (dual frames)
//! ```
//!
//! The filter is not fed while calibration is pending. When calibration
//! completes the filter restarts from identity, so the first measured `dt`
//! does not span the calibration wait.

use super::state::{Peaks, PendingActions, PoseState};
use jtracker_core::ahrs::Ahrs;
use jtracker_core::calibration::{
    Calibration, CalibrationMode, CalibrationStatus, DEFAULT_WINDOW,
};
use jtracker_core::imu::{RawSample, SensorScale};
use jtracker_core::math::half_turn_z;
use jtracker_core::pose::{JointConfig, JointDescriptor};
use jtracker_core::relay::{FrameLayout, RelayFrame};
use nalgebra::{Quaternion, Vector3};

/// Pipeline options
#[derive(Debug, Clone)]
pub struct FusionConfig {
    /// Frame layout published to the coordinator
    pub layout: FrameLayout,
    /// Rotate the output half a turn about Z, `(x, y, z, w) -> (-x, -y, z, w)`
    pub half_turn: bool,
    /// Geometry used for locally applied neutral/forward calibration
    pub joint: JointConfig,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            layout: FrameLayout::Single,
            half_turn: false,
            joint: JointConfig::new(0, 0, Vector3::new(0.0, 0.0, -1.0)),
        }
    }
}

/// Result of one pipeline step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FusionStep {
    /// Calibration still pending; nothing new to publish
    Calibrating(CalibrationStatus),
    /// New orientation and the frame to publish
    Fused {
        /// Orientation after the optional remap
        orientation: Quaternion<f32>,
        /// Frame for the relay buffer
        frame: RelayFrame,
    },
}

/// Calibration, filtering and frame building for one sensor
pub struct FusionPipeline<A: Ahrs, const N: usize = DEFAULT_WINDOW> {
    calibration: Calibration<N>,
    ahrs: A,
    scale: SensorScale,
    config: FusionConfig,
    local: JointDescriptor,
    peaks: Peaks,
    calibrated: bool,
    neutral_on_calibrated: bool,
}

impl<A: Ahrs, const N: usize> FusionPipeline<A, N> {
    /// Assemble a pipeline. Register calibration modes on `calibration`
    /// before the first step.
    pub fn new(
        config: FusionConfig,
        calibration: Calibration<N>,
        ahrs: A,
        scale: SensorScale,
    ) -> Self {
        let local = JointDescriptor::new(config.joint.clone());
        Self {
            calibration,
            ahrs,
            scale,
            config,
            local,
            peaks: Peaks::default(),
            calibrated: false,
            neutral_on_calibrated: false,
        }
    }

    /// Calibration engine
    pub fn calibration(&self) -> &Calibration<N> {
        &self.calibration
    }

    /// Orientation filter
    pub fn ahrs(&self) -> &A {
        &self.ahrs
    }

    /// Locally applied neutral and forward calibration
    pub fn local_joint(&self) -> &JointDescriptor {
        &self.local
    }

    /// Peak corrected ticks since start
    pub fn peaks(&self) -> Peaks {
        self.peaks
    }

    /// Apply actions requested since the last step.
    ///
    /// Neutral and forward capture use the current filter orientation. A gyro
    /// calibration restart stops filtering until it converges and then
    /// captures neutral.
    pub fn apply(&mut self, actions: PendingActions) {
        let live = self.live_orientation();
        if actions.contains(PendingActions::GYRO_CALIBRATION) {
            self.calibration.start(CalibrationMode::GYRO);
            self.calibrated = false;
            self.neutral_on_calibrated = true;
        }
        if actions.contains(PendingActions::SET_NEUTRAL) {
            self.local.set_neutral(live);
        }
        if actions.contains(PendingActions::SET_FORWARD) {
            // Horizontal bone projection too short: keep the old yaw
            let _ = self.local.set_forward_direction(live);
        }
    }

    /// Consume one sample in acquisition order
    pub fn step(&mut self, sample: &RawSample) -> FusionStep {
        if !self.calibration.process(sample) {
            return FusionStep::Calibrating(self.calibration.status());
        }
        if !self.calibrated {
            // Heading survives a restart; only dt must not span the wait
            self.calibrated = true;
            self.ahrs.restart_clock();
        }

        let corrected = self.calibration.correct(sample);
        self.track_peaks(&corrected);

        let gyro = self.scale.gyro_rad_s(&corrected.gyro);
        let accel = self.scale.accel_g(&corrected.accel);
        match corrected.mag {
            Some(mag) => self.ahrs.update(gyro, accel, self.scale.mag(&mag)),
            None => self.ahrs.update_imu(gyro, accel),
        };

        let orientation = self.live_orientation();
        if self.neutral_on_calibrated {
            self.neutral_on_calibrated = false;
            self.local.set_neutral(orientation);
        }

        FusionStep::Fused {
            orientation,
            frame: self.frame(orientation),
        }
    }

    /// Copy a step's result into the shared state
    pub fn publish(&self, step: &FusionStep, state: &mut PoseState, now_us: u64) {
        state.peaks = self.peaks;
        state.calibration = self.calibration.status();
        if let FusionStep::Fused { orientation, frame } = step {
            state.orientation = *orientation;
            state.publish(frame, now_us);
        }
    }

    fn live_orientation(&self) -> Quaternion<f32> {
        let q = self.ahrs.orientation();
        if self.config.half_turn {
            half_turn_z(q)
        } else {
            q
        }
    }

    fn frame(&self, orientation: Quaternion<f32>) -> RelayFrame {
        match self.config.layout {
            FrameLayout::Single => RelayFrame::single(orientation),
            FrameLayout::Dual => RelayFrame::dual(
                self.local.effective_rotation(orientation),
                self.local.yaw_correction(),
            ),
        }
    }

    fn track_peaks(&mut self, sample: &RawSample) {
        let peak = |v: &Vector3<i16>| v.iter().map(|c| c.unsigned_abs()).max().unwrap_or(0);
        self.peaks.gyro = self.peaks.gyro.max(peak(&sample.gyro));
        self.peaks.accel = self.peaks.accel.max(peak(&sample.accel));
    }
}
