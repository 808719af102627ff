//! Runtime configuration
//!
//! A small typed key/value store plus the tracker's parameter set. Values
//! come from the board's startup table; persistence lives outside this crate.

pub mod error;
pub mod storage;
pub mod tracker;

pub use error::ParameterError;
pub use storage::{
    ParamFlags, ParamMetadata, ParamValue, ParameterStore, MAX_PARAMS, MAX_STRING_LEN,
    PARAM_NAME_LEN,
};
pub use tracker::{TrackerParams, DEFAULT_HOST_PORT, DEFAULT_RELAY_ADDR, DEFAULT_RELAY_SETTLE_US};
