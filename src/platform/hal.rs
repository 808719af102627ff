//! Adapter from any `embedded-hal-async` I2C bus
//!
//! Lets the relay coordinator and IMU adapters run on any HAL that
//! implements the embedded-hal 1.0 async traits, not just embassy-rp.

use crate::platform::{
    error::{I2cError, PlatformError},
    traits::I2cInterface,
    Result,
};
use embedded_hal::i2c::{Error as _, ErrorKind, NoAcknowledgeSource};
use embedded_hal_async::i2c::I2c;

/// [`I2cInterface`] over an `embedded_hal_async::i2c::I2c` bus
pub struct HalI2c<B> {
    bus: B,
}

impl<B: I2c> HalI2c<B> {
    /// Wrap a bus
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Give the bus back
    pub fn release(self) -> B {
        self.bus
    }
}

impl<B: I2c> I2cInterface for HalI2c<B> {
    async fn write(&mut self, addr: u8, data: &[u8]) -> Result<()> {
        self.bus
            .write(addr, data)
            .await
            .map_err(|e| map_error_kind(e.kind()))
    }

    async fn read(&mut self, addr: u8, buffer: &mut [u8]) -> Result<()> {
        self.bus
            .read(addr, buffer)
            .await
            .map_err(|e| map_error_kind(e.kind()))
    }

    async fn write_read(
        &mut self,
        addr: u8,
        write_data: &[u8],
        read_buffer: &mut [u8],
    ) -> Result<()> {
        self.bus
            .write_read(addr, write_data, read_buffer)
            .await
            .map_err(|e| map_error_kind(e.kind()))
    }
}

/// Map an embedded-hal error kind to a platform error
pub fn map_error_kind(kind: ErrorKind) -> PlatformError {
    let e = match kind {
        ErrorKind::NoAcknowledge(
            NoAcknowledgeSource::Address | NoAcknowledgeSource::Data | NoAcknowledgeSource::Unknown,
        ) => I2cError::Nack,
        ErrorKind::ArbitrationLoss => I2cError::ArbitrationLost,
        ErrorKind::Overrun => I2cError::Overrun,
        _ => I2cError::BusError,
    };
    PlatformError::I2c(e)
}
