//! Sensor fusion subsystem
//!
//! Turns raw IMU samples into the published orientation frame.

pub mod pipeline;
pub mod state;
pub mod task;

pub use pipeline::{FusionConfig, FusionPipeline, FusionStep};
pub use state::{Peaks, PendingActions, PoseState};
pub use task::FusionTask;
