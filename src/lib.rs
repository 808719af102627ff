#![cfg_attr(not(any(test, feature = "mock")), no_std)]

//! jtracker - Wearable joint tracker firmware
//!
//! Task layer on top of [`jtracker_core`]: bus and network access, the
//! fusion, relay, presentation and status tasks, and the shared state that
//! connects them.
//!
//! A node runs in one of two roles:
//!
//! - **Subordinate**: fuses its own IMU and serves relay frames on the bus
//!   ([`subsystems::fusion`] and [`communication::relay::RelayResponder`])
//! - **Coordinator**: polls subordinates, composes the joint chain and
//!   streams poses to the host ([`subsystems::chain`] and
//!   [`subsystems::presentation`])

// Platform abstraction layer (I2C controller/target, UDP)
pub mod platform;

// Sensor interfaces
pub mod devices;

// Logging, shared state, scheduling, startup parameters
pub mod core;

// Relay protocol, tracker datagrams, gamepad reports
pub mod communication;

// Tasks
pub mod subsystems;
