//! Joint chain subsystem (coordinator role)

pub mod state;
pub mod task;

pub use state::{ChainState, MAX_JOINTS};
pub use task::ChainTask;
