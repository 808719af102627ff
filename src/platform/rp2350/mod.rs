//! RP2350 bindings for Raspberry Pi Pico 2 W
//!
//! Only available with the `pico2_w` feature:
//!
//! ```toml
//! [dependencies]
//! jtracker = { version = "0.1", features = ["pico2_w"] }
//! ```
//!
//! Radio bring-up and network join stay in the board binary; this module only
//! adapts peripherals that already exist to the platform traits.

mod i2c;
mod i2c_target;
mod udp;

pub use i2c::Rp2350I2c;
pub use i2c_target::Rp2350I2cTarget;
pub use udp::UdpSink;
