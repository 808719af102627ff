//! Madgwick gradient-descent orientation filter
//!
//! # Update
//!
//! ```text
//! q̇ = 0.5 · q ⊗ (0, ω) − β · ∇f / ‖∇f‖
//! q ← normalize(q + q̇ · dt)
//! ```
//!
//! `∇f` is the closed-form gradient of the orientation error against gravity
//! (and the Earth field, when a magnetometer sample is supplied). `dt` is the
//! wall-clock time since the previous update, taken from the injected
//! [`TimeSource`], so the filter adapts to jitter in the call rate.
//!
//! The correction is skipped (pure gyro integration) when the accelerometer
//! norm falls outside `[accel_norm_min, accel_norm_max]` g or the magnetometer
//! sample is degenerate. With `β = 0` the filter reduces to gyro integration.

use super::traits::{Ahrs, Correction};
use crate::math::{normalize, rotate_vector, NORM_EPSILON};
use crate::traits::TimeSource;
use libm::sqrtf;
use nalgebra::{Quaternion, Vector3};

/// Default filter gain
pub const DEFAULT_BETA: f32 = 0.15;

/// Filter configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MadgwickConfig {
    /// Gradient step gain β
    pub beta: f32,
    /// Keep `w >= 0` after each update
    pub positive_w: bool,
    /// Lowest accepted accelerometer norm (g)
    pub accel_norm_min: f32,
    /// Highest accepted accelerometer norm (g)
    pub accel_norm_max: f32,
}

impl Default for MadgwickConfig {
    fn default() -> Self {
        Self {
            beta: DEFAULT_BETA,
            positive_w: true,
            accel_norm_min: 0.9,
            accel_norm_max: 1.1,
        }
    }
}

/// Madgwick AHRS with measured time step
#[derive(Debug, Clone)]
pub struct MadgwickAhrs<T: TimeSource> {
    config: MadgwickConfig,
    time: T,
    q: Quaternion<f32>,
    last_update_us: u64,
    last_correction: Correction,
}

impl<T: TimeSource> MadgwickAhrs<T> {
    /// Create at identity orientation, with the time base starting now
    pub fn new(config: MadgwickConfig, time: T) -> Self {
        let last_update_us = time.now_us();
        Self {
            config,
            time,
            q: Quaternion::identity(),
            last_update_us,
            last_correction: Correction::None,
        }
    }

    /// Start from a known orientation instead of identity
    pub fn with_orientation(mut self, q: Quaternion<f32>) -> Self {
        self.q = normalize(q, self.config.positive_w);
        self
    }

    /// Active configuration
    pub fn config(&self) -> &MadgwickConfig {
        &self.config
    }

    /// Change the gain at runtime
    pub fn set_beta(&mut self, beta: f32) {
        self.config.beta = beta;
    }

    /// Timestamp (µs) of the last update or reset
    pub fn last_update_us(&self) -> u64 {
        self.last_update_us
    }

    /// Correction term applied by the last update
    pub fn last_correction(&self) -> Correction {
        self.last_correction
    }

    fn accel_direction(&self, accel: &Vector3<f32>) -> Option<Vector3<f32>> {
        let norm = accel.norm();
        if !norm.is_finite() || norm < self.config.accel_norm_min || norm > self.config.accel_norm_max
        {
            return None;
        }
        Some(accel / norm)
    }

    fn integrate(&mut self, gyro: Vector3<f32>, gradient: Option<Quaternion<f32>>) -> Quaternion<f32> {
        let now = self.time.now_us();
        let dt = now.saturating_sub(self.last_update_us) as f32 * 1.0e-6;
        self.last_update_us = now;

        let mut q_dot = self.q * Quaternion::from_imag(gyro) * 0.5;
        if let Some(step) = gradient.and_then(unit_step) {
            q_dot -= step * self.config.beta;
        }

        self.q = normalize(self.q + q_dot * dt, self.config.positive_w);
        self.q
    }
}

impl<T: TimeSource> Ahrs for MadgwickAhrs<T> {
    fn orientation(&self) -> Quaternion<f32> {
        self.q
    }

    fn update_imu(&mut self, gyro: Vector3<f32>, accel: Vector3<f32>) -> Quaternion<f32> {
        match self.accel_direction(&accel) {
            Some(a) => {
                self.last_correction = Correction::Gravity;
                let gradient = gravity_gradient(&self.q, &a);
                self.integrate(gyro, Some(gradient))
            }
            None => self.update_gyro(gyro),
        }
    }

    fn update(
        &mut self,
        gyro: Vector3<f32>,
        accel: Vector3<f32>,
        mag: Vector3<f32>,
    ) -> Quaternion<f32> {
        let a = match self.accel_direction(&accel) {
            Some(a) => a,
            None => return self.update_gyro(gyro),
        };

        let mag_norm = mag.norm();
        if !mag_norm.is_finite() || mag_norm <= NORM_EPSILON {
            return self.update_gyro(gyro);
        }
        let m = mag / mag_norm;

        self.last_correction = Correction::GravityMagnetic;
        let gradient = gravity_gradient(&self.q, &a) + magnetic_gradient(&self.q, &m);
        self.integrate(gyro, Some(gradient))
    }

    fn update_gyro(&mut self, gyro: Vector3<f32>) -> Quaternion<f32> {
        self.last_correction = Correction::None;
        self.integrate(gyro, None)
    }

    fn reset(&mut self) {
        self.q = Quaternion::identity();
        self.restart_clock();
        self.last_correction = Correction::None;
    }

    fn restart_clock(&mut self) {
        self.last_update_us = self.time.now_us();
    }
}

/// Normalized gradient step, `None` at an exact minimum
fn unit_step(gradient: Quaternion<f32>) -> Option<Quaternion<f32>> {
    let norm = gradient.norm();
    if !norm.is_finite() || norm <= NORM_EPSILON {
        return None;
    }
    Some(gradient / norm)
}

/// Jᵀf for the gravity reference; `a` is the unit accelerometer vector
fn gravity_gradient(q: &Quaternion<f32>, a: &Vector3<f32>) -> Quaternion<f32> {
    let (q0, q1, q2, q3) = (q.w, q.i, q.j, q.k);

    let f1 = 2.0 * (q1 * q3 - q0 * q2) - a.x;
    let f2 = 2.0 * (q0 * q1 + q2 * q3) - a.y;
    let f3 = 2.0 * (0.5 - q1 * q1 - q2 * q2) - a.z;

    Quaternion::new(
        -2.0 * q2 * f1 + 2.0 * q1 * f2,
        2.0 * q3 * f1 + 2.0 * q0 * f2 - 4.0 * q1 * f3,
        -2.0 * q0 * f1 + 2.0 * q3 * f2 - 4.0 * q2 * f3,
        2.0 * q1 * f1 + 2.0 * q2 * f2,
    )
}

/// Jᵀf for the magnetic reference; `m` is the unit magnetometer vector
fn magnetic_gradient(q: &Quaternion<f32>, m: &Vector3<f32>) -> Quaternion<f32> {
    let (q0, q1, q2, q3) = (q.w, q.i, q.j, q.k);

    // Earth field in the world frame, rotated onto the XZ plane
    let h = rotate_vector(*q, *m);
    let bx = sqrtf(h.x * h.x + h.y * h.y);
    let bz = h.z;

    let f4 = 2.0 * bx * (0.5 - q2 * q2 - q3 * q3) + 2.0 * bz * (q1 * q3 - q0 * q2) - m.x;
    let f5 = 2.0 * bx * (q1 * q2 - q0 * q3) + 2.0 * bz * (q0 * q1 + q2 * q3) - m.y;
    let f6 = 2.0 * bx * (q0 * q2 + q1 * q3) + 2.0 * bz * (0.5 - q1 * q1 - q2 * q2) - m.z;

    Quaternion::new(
        -2.0 * bz * q2 * f4 + (-2.0 * bx * q3 + 2.0 * bz * q1) * f5 + 2.0 * bx * q2 * f6,
        2.0 * bz * q3 * f4
            + (2.0 * bx * q2 + 2.0 * bz * q0) * f5
            + (2.0 * bx * q3 - 4.0 * bz * q1) * f6,
        (-4.0 * bx * q2 - 2.0 * bz * q0) * f4
            + (2.0 * bx * q1 + 2.0 * bz * q3) * f5
            + (2.0 * bx * q0 - 4.0 * bz * q2) * f6,
        (-4.0 * bx * q3 + 2.0 * bz * q1) * f4
            + (-2.0 * bx * q0 + 2.0 * bz * q2) * f5
            + 2.0 * bx * q1 * f6,
    )
}
