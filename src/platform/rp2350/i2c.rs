//! RP2350 I2C controller
//!
//! # Example
//!
//! ```no_run
//! use embassy_rp::i2c::Config as EmbassyI2cConfig;
//! use jtracker::platform::{rp2350::Rp2350I2c, traits::{I2cConfig, I2cInterface}};
//!
//! embassy_rp::bind_interrupts!(struct Irqs {
//!     I2C0_IRQ => embassy_rp::i2c::InterruptHandler<embassy_rp::peripherals::I2C0>;
//! });
//!
//! #[embassy_executor::main]
//! async fn main(_spawner: embassy_executor::Spawner) {
//!     let p = embassy_rp::init(Default::default());
//!     let bus = embassy_rp::i2c::I2c::new_async(
//!         p.I2C0,
//!         p.PIN_1, // SCL
//!         p.PIN_0, // SDA
//!         Irqs,
//!         EmbassyI2cConfig::default(),
//!     );
//!     let mut i2c = Rp2350I2c::new(bus, I2cConfig::default());
//!
//!     let mut frame = [0u8; 24];
//!     i2c.write(0x10, &[0x23]).await.ok();
//!     i2c.read(0x10, &mut frame).await.ok();
//! }
//! ```

use crate::platform::{
    error::{I2cError, PlatformError},
    traits::{I2cConfig, I2cInterface},
    Result,
};
use embassy_rp::i2c::{Async, I2c as EmbassyI2c, Instance};
use embassy_time::{with_timeout, Duration};
use embedded_hal_async::i2c::I2c as _;

/// Async I2C controller on an `embassy-rp` peripheral.
///
/// Every transaction is bounded by `I2cConfig::timeout_us`. The bus frequency
/// is fixed when the peripheral is created; the value in the config is
/// informational.
pub struct Rp2350I2c<'d, T: Instance> {
    i2c: EmbassyI2c<'d, T, Async>,
    config: I2cConfig,
}

impl<'d, T: Instance> Rp2350I2c<'d, T> {
    /// Wrap an initialized peripheral
    pub fn new(i2c: EmbassyI2c<'d, T, Async>, config: I2cConfig) -> Self {
        Self { i2c, config }
    }

    fn timeout(&self) -> Duration {
        Duration::from_micros(u64::from(self.config.timeout_us))
    }
}

impl<'d, T: Instance> I2cInterface for Rp2350I2c<'d, T> {
    async fn write(&mut self, addr: u8, data: &[u8]) -> Result<()> {
        let timeout = self.timeout();
        with_timeout(timeout, self.i2c.write(addr, data))
            .await
            .map_err(|_| PlatformError::I2c(I2cError::Timeout))?
            .map_err(map_embassy_error)
    }

    async fn read(&mut self, addr: u8, buffer: &mut [u8]) -> Result<()> {
        let timeout = self.timeout();
        with_timeout(timeout, self.i2c.read(addr, buffer))
            .await
            .map_err(|_| PlatformError::I2c(I2cError::Timeout))?
            .map_err(map_embassy_error)
    }

    async fn write_read(
        &mut self,
        addr: u8,
        write_data: &[u8],
        read_buffer: &mut [u8],
    ) -> Result<()> {
        let timeout = self.timeout();
        with_timeout(timeout, self.i2c.write_read(addr, write_data, read_buffer))
            .await
            .map_err(|_| PlatformError::I2c(I2cError::Timeout))?
            .map_err(map_embassy_error)
    }
}

#[allow(deprecated)]
fn map_embassy_error(error: embassy_rp::i2c::Error) -> PlatformError {
    use embassy_rp::i2c::{AbortReason, Error};

    match error {
        Error::Abort(AbortReason::NoAcknowledge) => PlatformError::I2c(I2cError::Nack),
        Error::Abort(AbortReason::ArbitrationLoss) => {
            PlatformError::I2c(I2cError::ArbitrationLost)
        }
        Error::Abort(_) => PlatformError::I2c(I2cError::BusError),
        Error::InvalidReadBufferLength | Error::InvalidWriteBufferLength => {
            PlatformError::I2c(I2cError::Overrun)
        }
        Error::AddressOutOfRange(_) | Error::AddressReserved(_) => {
            PlatformError::I2c(I2cError::InvalidAddress)
        }
    }
}
