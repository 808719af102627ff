//! IMU adapters
//!
//! - `mock`: scripted raw samples for tests (always available)
//!
//! Chip adapters implement [`RawImu`](crate::devices::traits::RawImu) in the
//! board crate; none is required by the tracker pipeline itself.

pub mod mock;

pub use mock::MockRawImu;
