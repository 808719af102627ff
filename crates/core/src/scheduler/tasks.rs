//! Task table shared by every board
//!
//! Rates follow the sensor and consumer cadence: the filter runs well above
//! the output rate so the measured `dt` stays small, and the relay poll runs
//! on its own task so a stalled bus never delays filtering.

use super::types::TaskMetadata;

/// IMU read, calibration and AHRS update
pub const FUSION_TASK: TaskMetadata = TaskMetadata {
    name: "fusion",
    rate_hz: 500,
    priority: 40,
    budget_us: 1_200,
};

/// Coordinator relay poll and pose composition
pub const RELAY_TASK: TaskMetadata = TaskMetadata {
    name: "relay",
    rate_hz: 100,
    priority: 30,
    budget_us: 6_000,
};

/// Datagram or HID report emission
pub const PRESENTATION_TASK: TaskMetadata = TaskMetadata {
    name: "presentation",
    rate_hz: 100,
    priority: 20,
    budget_us: 2_000,
};

/// Calibration status and statistics report
pub const STATUS_TASK: TaskMetadata = TaskMetadata {
    name: "status",
    rate_hz: 1,
    priority: 0,
    budget_us: 10_000,
};

/// Delay between calibration polls while the device settles (ms)
pub const CALIBRATION_POLL_MS: u64 = 15;
