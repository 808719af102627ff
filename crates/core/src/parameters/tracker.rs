//! Tracker parameter definitions
//!
//! # Parameters
//!
//! - `AHRS_BETA` - Madgwick gain β
//! - `AHRS_POS_W` - Keep the orientation in the `w >= 0` hemisphere
//! - `CAL_GYR_THR` - Gyro static threshold (peak-to-peak ticks)
//! - `CAL_ACC_THR` - Accelerometer static threshold (peak-to-peak ticks)
//! - `CAL_ONE_G` - Accelerometer ticks per g
//! - `CAL_CONT` - Continuous gyro bias refinement
//! - `OUT_HOST_IP` - Tracking host address
//! - `OUT_HOST_PORT` - Tracking host UDP port
//! - `OUT_ENABLE` - Stream poses at startup
//! - `RELAY_ADDR` - This node's bus address when acting as a subordinate
//! - `RELAY_SETTLE_US` - Delay between relay command and frame read
//!
//! Noise thresholds and β are device dependent, so they live here rather
//! than as filter constants.

use super::error::ParameterError;
use super::storage::{ParamFlags, ParamValue, ParameterStore};
use crate::ahrs::{MadgwickConfig, DEFAULT_BETA};
use crate::calibration::{CalibrationConfig, DEFAULT_ACCEL_THRESHOLD, DEFAULT_GYRO_THRESHOLD};
use crate::imu::ACCEL_8G_ONE_G_TICKS;

/// Default host port of the tracking driver
pub const DEFAULT_HOST_PORT: u16 = 39570;

/// Default host address
const DEFAULT_HOST_IP: [u8; 4] = [192, 168, 1, 2];

/// Default subordinate bus address
pub const DEFAULT_RELAY_ADDR: u8 = 0x10;

/// Default settle delay between command write and frame read
pub const DEFAULT_RELAY_SETTLE_US: u32 = 15;

const MIN_BETA: f32 = 0.0;
const MAX_BETA: f32 = 2.0;

/// Tracker parameters loaded from the parameter store
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerParams {
    /// Madgwick gain β
    pub ahrs_beta: f32,
    /// Force `w >= 0` after each filter update
    pub ahrs_positive_w: bool,
    /// Gyro static threshold in ticks
    pub cal_gyro_threshold: i32,
    /// Accelerometer static threshold in ticks
    pub cal_accel_threshold: i32,
    /// Accelerometer ticks per g
    pub cal_one_g: i16,
    /// Keep refining the gyro bias after the first estimate
    pub cal_continuous: bool,
    /// Tracking host address
    pub out_host_ip: [u8; 4],
    /// Tracking host port
    pub out_host_port: u16,
    /// Stream poses at startup
    pub out_enable: bool,
    /// Own bus address (subordinate role)
    pub relay_addr: u8,
    /// Settle delay in microseconds
    pub relay_settle_us: u32,
}

impl Default for TrackerParams {
    fn default() -> Self {
        Self {
            ahrs_beta: DEFAULT_BETA,
            ahrs_positive_w: true,
            cal_gyro_threshold: DEFAULT_GYRO_THRESHOLD,
            cal_accel_threshold: DEFAULT_ACCEL_THRESHOLD,
            cal_one_g: ACCEL_8G_ONE_G_TICKS,
            cal_continuous: false,
            out_host_ip: DEFAULT_HOST_IP,
            out_host_port: DEFAULT_HOST_PORT,
            out_enable: true,
            relay_addr: DEFAULT_RELAY_ADDR,
            relay_settle_us: DEFAULT_RELAY_SETTLE_US,
        }
    }
}

impl TrackerParams {
    /// Register tracker parameters with default values
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        let d = Self::default();
        store.register("AHRS_BETA", ParamValue::Float(d.ahrs_beta), ParamFlags::empty())?;
        store.register(
            "AHRS_POS_W",
            ParamValue::Bool(d.ahrs_positive_w),
            ParamFlags::empty(),
        )?;
        store.register(
            "CAL_GYR_THR",
            ParamValue::Int(d.cal_gyro_threshold),
            ParamFlags::empty(),
        )?;
        store.register(
            "CAL_ACC_THR",
            ParamValue::Int(d.cal_accel_threshold),
            ParamFlags::empty(),
        )?;
        store.register(
            "CAL_ONE_G",
            ParamValue::Int(i32::from(d.cal_one_g)),
            ParamFlags::empty(),
        )?;
        store.register("CAL_CONT", ParamValue::Bool(d.cal_continuous), ParamFlags::empty())?;
        store.register("OUT_HOST_IP", ParamValue::Ipv4(d.out_host_ip), ParamFlags::empty())?;
        store.register(
            "OUT_HOST_PORT",
            ParamValue::Int(i32::from(d.out_host_port)),
            ParamFlags::empty(),
        )?;
        store.register("OUT_ENABLE", ParamValue::Bool(d.out_enable), ParamFlags::empty())?;
        // Bus address is fixed per board build
        store.register(
            "RELAY_ADDR",
            ParamValue::Int(i32::from(d.relay_addr)),
            ParamFlags::READ_ONLY,
        )?;
        store.register(
            "RELAY_SETTLE_US",
            ParamValue::Int(d.relay_settle_us as i32),
            ParamFlags::empty(),
        )?;
        Ok(())
    }

    /// Load tracker parameters, falling back to defaults for missing or
    /// out-of-range values
    pub fn from_store(store: &ParameterStore) -> Self {
        let d = Self::default();

        let ahrs_beta = store
            .get("AHRS_BETA")
            .and_then(ParamValue::as_f32)
            .filter(|v| v.is_finite())
            .map(|v| v.clamp(MIN_BETA, MAX_BETA))
            .unwrap_or(d.ahrs_beta);

        let ahrs_positive_w = load_bool(store, "AHRS_POS_W", d.ahrs_positive_w);

        let cal_gyro_threshold = load_int(store, "CAL_GYR_THR", 1, i32::from(i16::MAX))
            .unwrap_or(d.cal_gyro_threshold);
        let cal_accel_threshold = load_int(store, "CAL_ACC_THR", 1, i32::from(i16::MAX))
            .unwrap_or(d.cal_accel_threshold);
        let cal_one_g = load_int(store, "CAL_ONE_G", 1, i32::from(i16::MAX))
            .map(|v| v as i16)
            .unwrap_or(d.cal_one_g);
        let cal_continuous = load_bool(store, "CAL_CONT", d.cal_continuous);

        let out_host_ip = match store.get("OUT_HOST_IP") {
            Some(ParamValue::Ipv4(ip)) => *ip,
            _ => d.out_host_ip,
        };
        let out_host_port = load_int(store, "OUT_HOST_PORT", 1, i32::from(u16::MAX))
            .map(|v| v as u16)
            .unwrap_or(d.out_host_port);
        let out_enable = load_bool(store, "OUT_ENABLE", d.out_enable);

        // 7-bit addresses outside the reserved ranges
        let relay_addr = load_int(store, "RELAY_ADDR", 0x08, 0x77)
            .map(|v| v as u8)
            .unwrap_or(d.relay_addr);
        let relay_settle_us = load_int(store, "RELAY_SETTLE_US", 0, 10_000)
            .map(|v| v as u32)
            .unwrap_or(d.relay_settle_us);

        Self {
            ahrs_beta,
            ahrs_positive_w,
            cal_gyro_threshold,
            cal_accel_threshold,
            cal_one_g,
            cal_continuous,
            out_host_ip,
            out_host_port,
            out_enable,
            relay_addr,
            relay_settle_us,
        }
    }

    /// Filter configuration derived from these parameters
    pub fn madgwick_config(&self) -> MadgwickConfig {
        MadgwickConfig {
            beta: self.ahrs_beta,
            positive_w: self.ahrs_positive_w,
            ..MadgwickConfig::default()
        }
    }

    /// Calibration configuration derived from these parameters
    pub fn calibration_config(&self) -> CalibrationConfig {
        CalibrationConfig {
            gyro_threshold: self.cal_gyro_threshold,
            accel_threshold: self.cal_accel_threshold,
            one_g_ticks: self.cal_one_g,
            continuous_gyro: self.cal_continuous,
        }
    }
}

/// Integer parameter within `[min, max]`; out-of-range values are rejected
/// rather than clamped so a typo falls back to the default
fn load_int(store: &ParameterStore, name: &str, min: i32, max: i32) -> Option<i32> {
    store
        .get(name)
        .and_then(ParamValue::as_i32)
        .filter(|v| (min..=max).contains(v))
}

fn load_bool(store: &ParameterStore, name: &str, default: bool) -> bool {
    store
        .get(name)
        .and_then(ParamValue::as_bool)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registered() -> ParameterStore {
        let mut store = ParameterStore::new();
        TrackerParams::register_defaults(&mut store).unwrap();
        store
    }

    #[test]
    fn test_defaults_round_trip_through_store() {
        let store = registered();
        assert_eq!(store.len(), 11);
        assert_eq!(TrackerParams::from_store(&store), TrackerParams::default());
    }

    #[test]
    fn test_default_values() {
        let params = TrackerParams::default();
        assert!((params.ahrs_beta - 0.15).abs() < 1e-6);
        assert_eq!(params.cal_gyro_threshold, 100);
        assert_eq!(params.cal_accel_threshold, 360);
        assert_eq!(params.cal_one_g, 4096);
        assert_eq!(params.out_host_port, 39570);
        assert_eq!(params.relay_settle_us, 15);
    }

    #[test]
    fn test_from_store_overrides() {
        let mut store = registered();
        store.set("AHRS_BETA", ParamValue::Float(0.04)).unwrap();
        store.set("CAL_GYR_THR", ParamValue::Int(60)).unwrap();
        store
            .set("OUT_HOST_IP", ParamValue::Ipv4([10, 0, 0, 5]))
            .unwrap();
        store.set("OUT_HOST_PORT", ParamValue::Int(39571)).unwrap();
        store.set("OUT_ENABLE", ParamValue::Bool(false)).unwrap();

        let params = TrackerParams::from_store(&store);
        assert!((params.ahrs_beta - 0.04).abs() < 1e-6);
        assert_eq!(params.cal_gyro_threshold, 60);
        assert_eq!(params.out_host_ip, [10, 0, 0, 5]);
        assert_eq!(params.out_host_port, 39571);
        assert!(!params.out_enable);
    }

    #[test]
    fn test_out_of_range_falls_back() {
        let mut store = registered();
        store.set("AHRS_BETA", ParamValue::Float(50.0)).unwrap();
        store.set("OUT_HOST_PORT", ParamValue::Int(70_000)).unwrap();
        store.set("CAL_ACC_THR", ParamValue::Int(0)).unwrap();

        let params = TrackerParams::from_store(&store);
        assert!((params.ahrs_beta - MAX_BETA).abs() < 1e-6);
        assert_eq!(params.out_host_port, DEFAULT_HOST_PORT);
        assert_eq!(params.cal_accel_threshold, DEFAULT_ACCEL_THRESHOLD);
    }

    #[test]
    fn test_relay_addr_is_read_only() {
        let mut store = registered();
        assert_eq!(
            store.set("RELAY_ADDR", ParamValue::Int(0x20)),
            Err(ParameterError::ReadOnly)
        );
    }

    #[test]
    fn test_derived_configs() {
        let mut params = TrackerParams::default();
        params.ahrs_beta = 0.3;
        params.cal_continuous = true;

        let ahrs = params.madgwick_config();
        assert!((ahrs.beta - 0.3).abs() < 1e-6);
        assert!(ahrs.positive_w);

        let cal = params.calibration_config();
        assert!(cal.continuous_gyro);
        assert_eq!(cal.one_g_ticks, 4096);
    }
}
