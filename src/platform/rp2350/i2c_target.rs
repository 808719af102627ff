//! RP2350 I2C target (subordinate node)

use crate::platform::{
    error::{I2cError, PlatformError},
    traits::{I2cTarget, TargetRequest},
    Result,
};
use embassy_rp::i2c::{AbortReason, Instance};
use embassy_rp::i2c_slave::{Command, Error, I2cSlave};

/// Byte clocked out if the controller reads past the frame
const FILL_BYTE: u8 = 0x00;

/// Target endpoint on an `embassy-rp` peripheral.
///
/// The bus address is set in the `i2c_slave::Config` passed to
/// `I2cSlave::new`.
pub struct Rp2350I2cTarget<'d, T: Instance> {
    target: I2cSlave<'d, T>,
}

impl<'d, T: Instance> Rp2350I2cTarget<'d, T> {
    /// Wrap an initialized target peripheral
    pub fn new(target: I2cSlave<'d, T>) -> Self {
        Self { target }
    }
}

impl<'d, T: Instance> I2cTarget for Rp2350I2cTarget<'d, T> {
    async fn listen(&mut self, buffer: &mut [u8]) -> Result<TargetRequest> {
        match self.target.listen(buffer).await.map_err(map_target_error)? {
            Command::Read => Ok(TargetRequest::Read),
            Command::Write(n) | Command::GeneralCall(n) => Ok(TargetRequest::Write(n)),
            Command::WriteRead(n) => Ok(TargetRequest::WriteRead(n)),
        }
    }

    async fn respond_to_read(&mut self, data: &[u8]) -> Result<()> {
        // Short reads leave bytes behind; that is the controller's choice
        self.target
            .respond_and_fill(data, FILL_BYTE)
            .await
            .map(|_| ())
            .map_err(map_target_error)
    }
}

fn map_target_error(error: Error) -> PlatformError {
    match error {
        Error::Abort(AbortReason::NoAcknowledge) => PlatformError::I2c(I2cError::Nack),
        Error::Abort(AbortReason::ArbitrationLoss) => {
            PlatformError::I2c(I2cError::ArbitrationLost)
        }
        Error::Abort(_) => PlatformError::I2c(I2cError::BusError),
        Error::PartialWrite(_) | Error::PartialGeneralCall(_) => {
            PlatformError::I2c(I2cError::Overrun)
        }
    }
}
