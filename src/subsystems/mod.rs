//! Task-level subsystems
//!
//! - [`fusion`]: sensor sampling, calibration and filtering (every node)
//! - [`chain`]: relay polling and chain composition (coordinator)
//! - [`presentation`]: tracker stream and gamepad output
//! - [`status`]: periodic status line and startup calibration wait

pub mod chain;
pub mod fusion;
pub mod presentation;
pub mod status;
