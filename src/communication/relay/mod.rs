//! Relay bus transport
//!
//! - [`coordinator`]: polls subordinate nodes for frames and sends commands
//! - [`responder`]: answers the coordinator from a subordinate's pose state

pub mod coordinator;
pub mod responder;

pub use coordinator::{RelayCoordinator, RelayError, RelayStats};
pub use responder::{RelayResponder, ResponderStats};
