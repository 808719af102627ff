//! jtracker_core - Pure no_std tracking logic for jtracker
//!
//! This crate contains the platform-agnostic part of the tracker: everything
//! between a raw IMU sample and the bytes that leave the device. It can be
//! tested on host without any feature flags or embassy dependencies.
//!
//! # Design Principles
//!
//! - **Zero cfg**: No `#[cfg(feature = ...)]` directives allowed
//! - **Pure no_std**: No std library dependencies, no allocation
//! - **Trait abstractions**: Platform services (time) injected via traits
//!
//! # Modules
//!
//! - [`math`]: Quaternion and vector helpers on top of nalgebra
//! - [`imu`]: Raw sample type and sensor range scale constants
//! - [`calibration`]: Zero-bias estimation (windowed, continuous, temperature model)
//! - [`ahrs`]: Madgwick gradient-descent orientation filter
//! - [`pose`]: Joint descriptors, neutral/forward calibration, chain composition
//! - [`relay`]: Coordinator/subordinate bus frame and command set
//! - [`output`]: VMT OSC datagram encoder and HID gamepad report
//! - [`parameters`]: Parameter store and typed tracker configuration
//! - [`scheduler`]: Periodic task metadata and statistics
//! - [`traits`]: Platform-agnostic trait abstractions (TimeSource)

#![no_std]

pub mod ahrs;
pub mod calibration;
pub mod imu;
pub mod math;
pub mod output;
pub mod parameters;
pub mod pose;
pub mod relay;
pub mod scheduler;
pub mod traits;
