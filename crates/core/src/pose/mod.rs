//! Joint and pose composition
//!
//! Combines a live orientation (local or relayed) with static joint geometry
//! and two user-captured calibrations into a world pose.

pub mod chain;
pub mod joint;

pub use chain::{ChainError, JointChain};
pub use joint::{JointConfig, JointDescriptor, Pose, ROOT_SERIAL_LEN};
