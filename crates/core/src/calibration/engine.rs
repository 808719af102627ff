//! Zero-bias calibration state machine
//!
//! # Algorithm
//!
//! Raw samples are fed one at a time through [`Calibration::process`]. For the
//! axis group being calibrated (gyro first, then accelerometer) samples fill a
//! window of `N`. On fill, the squared magnitude of the per-axis peak-to-peak
//! range is compared against the squared threshold:
//!
//! - below: the window is static, the negated mean becomes the bias and the
//!   mode bit clears
//! - otherwise: the window is discarded and refilled, indefinitely
//!
//! In continuous gyro mode the gyro window rolls instead of being cleared and
//! the bias is refreshed on every static window, so the `GYRO` bit stays set.
//!
//! # Example
//!
//! ```
//! use jtracker_core::calibration::{Calibration, CalibrationConfig, CalibrationMode};
//! use jtracker_core::imu::RawSample;
//!
//! let mut cal = Calibration::<128>::new(CalibrationConfig::default());
//! cal.start(CalibrationMode::GYRO);
//!
//! let sample = RawSample::default();
//! let mut done = false;
//! while !done {
//!     done = cal.process(&sample);
//! }
//! let corrected = cal.correct(&sample);
//! # assert_eq!(corrected.gyro, sample.gyro);
//! ```

use super::bias::TemperatureCharacteristic;
use super::window::SampleWindow;
use crate::imu::{RawSample, ACCEL_8G_ONE_G_TICKS};
use crate::math::saturate_i16;
use bitflags::bitflags;
use nalgebra::Vector3;

/// Default gyro static threshold (peak-to-peak ticks)
pub const DEFAULT_GYRO_THRESHOLD: i32 = 100;

/// Default accelerometer static threshold (peak-to-peak ticks)
pub const DEFAULT_ACCEL_THRESHOLD: i32 = 360;

/// Default window length in samples
pub const DEFAULT_WINDOW: usize = 128;

bitflags! {
    /// Axis groups still waiting for a bias estimate
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CalibrationMode: u8 {
        /// Gyroscope zero-rate offset
        const GYRO = 0b0000_0001;
        /// Accelerometer zero-g offset
        const ACCELEROMETER = 0b0000_0010;
    }
}

/// Calibration progress, for status reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationStatus {
    /// No mode registered
    Done,
    /// Waiting for a static gyro window
    GyroProcessing,
    /// Waiting for a static accelerometer window
    AccelerometerProcessing,
}

impl CalibrationStatus {
    /// Human-readable status line
    pub fn as_str(&self) -> &'static str {
        match self {
            CalibrationStatus::Done => "Done",
            CalibrationStatus::GyroProcessing => "Gyro processing",
            CalibrationStatus::AccelerometerProcessing => "Accelerometer processing",
        }
    }
}

/// Thresholds and options, usually built by `TrackerParams::calibration_config`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationConfig {
    /// Gyro peak-to-peak threshold (ticks, compared squared)
    pub gyro_threshold: i32,
    /// Accelerometer peak-to-peak threshold (ticks, compared squared)
    pub accel_threshold: i32,
    /// Accelerometer ticks for 1 g; the Z axis is expected to read +1 g at rest
    pub one_g_ticks: i16,
    /// Keep refining the gyro bias on a rolling window
    pub continuous_gyro: bool,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            gyro_threshold: DEFAULT_GYRO_THRESHOLD,
            accel_threshold: DEFAULT_ACCEL_THRESHOLD,
            one_g_ticks: ACCEL_8G_ONE_G_TICKS,
            continuous_gyro: false,
        }
    }
}

/// Bias state and convergence test over windows of `N` samples
#[derive(Debug, Clone)]
pub struct Calibration<const N: usize> {
    config: CalibrationConfig,
    mode: CalibrationMode,
    gyro_bias: TemperatureCharacteristic,
    accel_bias: Vector3<i32>,
    gyro_window: SampleWindow<N>,
    accel_window: SampleWindow<N>,
    gyro_estimated: bool,
}

impl<const N: usize> Calibration<N> {
    /// Create with zero bias and no mode registered
    pub fn new(config: CalibrationConfig) -> Self {
        Self {
            config,
            mode: CalibrationMode::empty(),
            gyro_bias: TemperatureCharacteristic::ZERO,
            accel_bias: Vector3::zeros(),
            gyro_window: SampleWindow::new(),
            accel_window: SampleWindow::new(),
            gyro_estimated: false,
        }
    }

    /// Register axis groups for (re)calibration and restart their windows
    pub fn start(&mut self, mode: CalibrationMode) {
        if mode.contains(CalibrationMode::GYRO) {
            self.gyro_window.clear();
            self.gyro_estimated = false;
        }
        if mode.contains(CalibrationMode::ACCELEROMETER) {
            self.accel_window.clear();
        }
        self.mode |= mode;
    }

    /// Drop registered modes without touching the current bias
    pub fn cancel(&mut self) {
        self.mode = CalibrationMode::empty();
        self.gyro_window.clear();
        self.accel_window.clear();
    }

    /// Replace the gyro bias with a precomputed temperature model
    pub fn set_temperature_characteristic(&mut self, model: TemperatureCharacteristic) {
        self.gyro_bias = model;
    }

    /// Feed one raw sample.
    ///
    /// Returns `true` once no one-shot mode remains registered. With no mode
    /// registered this is a no-op that returns `true` immediately.
    pub fn process(&mut self, sample: &RawSample) -> bool {
        if self.mode.is_empty() {
            return true;
        }

        if self.mode.contains(CalibrationMode::GYRO) {
            let had_estimate = self.gyro_estimated;
            self.process_gyro(sample.gyro);
            if !had_estimate {
                return self.is_complete();
            }
        }

        if self.mode.contains(CalibrationMode::ACCELEROMETER) {
            self.process_accel(sample.accel);
        }

        self.is_complete()
    }

    fn process_gyro(&mut self, gyro: Vector3<i16>) {
        self.gyro_window.push(gyro);
        if !self.gyro_window.is_full() {
            return;
        }

        let threshold = i64::from(self.config.gyro_threshold);
        let is_static = self.gyro_window.extent().spread_squared() < threshold * threshold;
        if is_static {
            self.gyro_bias = TemperatureCharacteristic::constant(-self.gyro_window.mean());
            self.gyro_estimated = true;
        }

        if !self.config.continuous_gyro {
            if is_static {
                self.mode.remove(CalibrationMode::GYRO);
            }
            self.gyro_window.clear();
        }
    }

    fn process_accel(&mut self, accel: Vector3<i16>) {
        self.accel_window.push(accel);
        if !self.accel_window.is_full() {
            return;
        }

        let threshold = i64::from(self.config.accel_threshold);
        if self.accel_window.extent().spread_squared() < threshold * threshold {
            let mut mean = self.accel_window.mean();
            mean.z -= i32::from(self.config.one_g_ticks);
            self.accel_bias = -mean;
            self.mode.remove(CalibrationMode::ACCELEROMETER);
        }
        self.accel_window.clear();
    }

    /// True when every one-shot mode has resolved.
    ///
    /// A continuous gyro mode counts as resolved after its first estimate.
    pub fn is_complete(&self) -> bool {
        let mut pending = self.mode;
        if self.config.continuous_gyro && self.gyro_estimated {
            pending.remove(CalibrationMode::GYRO);
        }
        pending.is_empty()
    }

    /// Currently registered mode bits
    pub fn mode(&self) -> CalibrationMode {
        self.mode
    }

    /// Progress summary (gyro has priority)
    pub fn status(&self) -> CalibrationStatus {
        if self.is_complete() {
            CalibrationStatus::Done
        } else if self.mode.contains(CalibrationMode::GYRO) && !self.gyro_estimated {
            CalibrationStatus::GyroProcessing
        } else {
            CalibrationStatus::AccelerometerProcessing
        }
    }

    /// Gyro offset (ticks) at `temperature`
    pub fn gyro_bias(&self, temperature: i16) -> Vector3<i32> {
        self.gyro_bias.offset_at(temperature)
    }

    /// Accelerometer offset (ticks)
    pub fn accel_bias(&self) -> Vector3<i32> {
        self.accel_bias
    }

    /// Active configuration
    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Apply the current bias to a raw sample
    pub fn correct(&self, sample: &RawSample) -> RawSample {
        RawSample {
            accel: saturate_i16(&sample.accel, &self.accel_bias),
            gyro: saturate_i16(&sample.gyro, &self.gyro_bias(sample.temperature)),
            mag: sample.mag,
            temperature: sample.temperature,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: usize = 16;

    fn sample(gyro: (i16, i16, i16), accel: (i16, i16, i16)) -> RawSample {
        RawSample {
            accel: Vector3::new(accel.0, accel.1, accel.2),
            gyro: Vector3::new(gyro.0, gyro.1, gyro.2),
            mag: None,
            temperature: 250,
        }
    }

    fn resting() -> RawSample {
        sample((12, -7, 3), (40, -25, 4096 + 30))
    }

    #[test]
    fn test_no_mode_returns_true_immediately() {
        let mut cal = Calibration::<WINDOW>::new(CalibrationConfig::default());
        assert!(cal.process(&resting()));
        assert_eq!(cal.status(), CalibrationStatus::Done);
        assert_eq!(cal.gyro_bias(250), Vector3::zeros());
    }

    #[test]
    fn test_false_below_window_then_converges_in_one_window() {
        let mut cal = Calibration::<WINDOW>::new(CalibrationConfig::default());
        cal.start(CalibrationMode::GYRO);

        for i in 0..WINDOW - 1 {
            assert!(!cal.process(&resting()), "converged early at sample {}", i);
        }
        assert!(cal.process(&resting()));
        assert_eq!(cal.gyro_bias(250), Vector3::new(-12, 7, -3));
        assert!(cal.mode().is_empty());
    }

    #[test]
    fn test_gyro_resolves_before_accelerometer() {
        let mut cal = Calibration::<WINDOW>::new(CalibrationConfig::default());
        cal.start(CalibrationMode::GYRO | CalibrationMode::ACCELEROMETER);
        assert_eq!(cal.status(), CalibrationStatus::GyroProcessing);

        for _ in 0..WINDOW {
            assert!(!cal.process(&resting()));
        }
        assert_eq!(cal.status(), CalibrationStatus::AccelerometerProcessing);
        assert_eq!(cal.accel_bias(), Vector3::zeros());

        for _ in 0..WINDOW - 1 {
            assert!(!cal.process(&resting()));
        }
        assert!(cal.process(&resting()));
        assert_eq!(cal.accel_bias(), Vector3::new(-40, 25, -30));
        assert_eq!(cal.status(), CalibrationStatus::Done);
    }

    #[test]
    fn test_noisy_samples_never_converge() {
        let mut cal = Calibration::<WINDOW>::new(CalibrationConfig::default());
        cal.start(CalibrationMode::GYRO);

        for i in 0..1000 {
            let swing = if i % 2 == 0 { 400 } else { -400 };
            assert!(!cal.process(&sample((swing, 0, 0), (0, 0, 4096))));
        }
        assert_eq!(cal.status(), CalibrationStatus::GyroProcessing);
        // Bias is untouched while no window is static
        assert_eq!(cal.gyro_bias(0), Vector3::zeros());
    }

    #[test]
    fn test_threshold_is_compared_on_squared_spread() {
        let mut cal = Calibration::<WINDOW>::new(CalibrationConfig::default());
        cal.start(CalibrationMode::GYRO);

        // Spread (60, 60, 60): 3 * 3600 = 10800 >= 100² -> not static
        for i in 0..WINDOW {
            let v = if i % 2 == 0 { 30 } else { -30 };
            assert!(!cal.process(&sample((v, v, v), (0, 0, 0))));
        }

        // Spread (57, 57, 57): 3 * 3249 = 9747 < 100² -> static
        let mut cal = Calibration::<WINDOW>::new(CalibrationConfig::default());
        cal.start(CalibrationMode::GYRO);
        let mut done = false;
        for i in 0..WINDOW {
            let v = if i % 2 == 0 { 28 } else { -29 };
            done = cal.process(&sample((v, v, v), (0, 0, 0)));
        }
        assert!(done);
    }

    #[test]
    fn test_recovers_after_noisy_window() {
        let mut cal = Calibration::<WINDOW>::new(CalibrationConfig::default());
        cal.start(CalibrationMode::GYRO);

        for i in 0..WINDOW {
            let swing = if i % 2 == 0 { 500 } else { -500 };
            cal.process(&sample((swing, 0, 0), (0, 0, 0)));
        }
        assert_eq!(cal.status(), CalibrationStatus::GyroProcessing);

        let mut done = false;
        for _ in 0..WINDOW {
            done = cal.process(&resting());
        }
        assert!(done);
    }

    #[test]
    fn test_correct_applies_bias() {
        let mut cal = Calibration::<WINDOW>::new(CalibrationConfig::default());
        cal.start(CalibrationMode::GYRO | CalibrationMode::ACCELEROMETER);
        while !cal.process(&resting()) {}

        let corrected = cal.correct(&resting());
        assert_eq!(corrected.gyro, Vector3::zeros());
        assert_eq!(corrected.accel, Vector3::new(0, 0, 4096));
        assert_eq!(corrected.temperature, 250);
    }

    #[test]
    fn test_temperature_characteristic_recomputed_on_read() {
        let mut cal = Calibration::<WINDOW>::new(CalibrationConfig::default());
        cal.set_temperature_characteristic(TemperatureCharacteristic::from_coefficients(
            Vector3::new(0.25, 0.0, 0.0),
            Vector3::new(-5.0, 0.0, 0.0),
        ));

        let mut s = resting();
        s.temperature = 100;
        assert_eq!(cal.correct(&s).gyro.x, 12 + 25 - 5);
        s.temperature = 300;
        assert_eq!(cal.correct(&s).gyro.x, 12 + 75 - 5);
    }

    #[test]
    fn test_continuous_gyro_keeps_refining() {
        let config = CalibrationConfig {
            continuous_gyro: true,
            ..Default::default()
        };
        let mut cal = Calibration::<WINDOW>::new(config);
        cal.start(CalibrationMode::GYRO);

        for _ in 0..WINDOW - 1 {
            assert!(!cal.process(&resting()));
        }
        assert!(cal.process(&resting()));
        assert!(cal.mode().contains(CalibrationMode::GYRO));
        assert_eq!(cal.gyro_bias(0), Vector3::new(-12, 7, -3));

        // Drift: the rolling window picks up the new offset once it fills
        let drifted = sample((20, -7, 3), (40, -25, 4126));
        for _ in 0..WINDOW {
            assert!(cal.process(&drifted));
        }
        assert_eq!(cal.gyro_bias(0), Vector3::new(-20, 7, -3));
        assert_eq!(cal.status(), CalibrationStatus::Done);
    }

    #[test]
    fn test_restart_gyro_calibration() {
        let mut cal = Calibration::<WINDOW>::new(CalibrationConfig::default());
        cal.start(CalibrationMode::GYRO);
        while !cal.process(&resting()) {}

        cal.start(CalibrationMode::GYRO);
        assert_eq!(cal.status(), CalibrationStatus::GyroProcessing);
        // Previous estimate stays in effect until the new one lands
        assert_eq!(cal.gyro_bias(0), Vector3::new(-12, 7, -3));
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(CalibrationStatus::Done.as_str(), "Done");
        assert_eq!(CalibrationStatus::GyroProcessing.as_str(), "Gyro processing");
        assert_eq!(
            CalibrationStatus::AccelerometerProcessing.as_str(),
            "Accelerometer processing"
        );
    }
}
