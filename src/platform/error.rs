//! Platform error types
//!
//! Every HAL error is mapped to one of these at the platform boundary so the
//! task layer only ever matches on a small, copyable enum.

use core::fmt;

/// Result type for platform operations
pub type Result<T> = core::result::Result<T, PlatformError>;

/// Platform-level errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlatformError {
    /// I2C transaction failed
    I2c(I2cError),
    /// UDP operation failed
    Network(NetworkError),
    /// Platform initialization failed
    InitializationFailed,
    /// Invalid configuration provided
    InvalidConfig,
}

/// I2C-specific errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cError {
    /// Bus error occurred
    BusError,
    /// No acknowledgment received
    Nack,
    /// Arbitration lost
    ArbitrationLost,
    /// Timeout occurred
    Timeout,
    /// Invalid address
    InvalidAddress,
    /// Controller read fewer bytes than offered, or wrote more than fit
    Overrun,
}

/// UDP-specific errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NetworkError {
    /// Socket could not bind its local port
    BindFailed,
    /// No route to the host (link down or ARP pending)
    NoRoute,
    /// Datagram larger than the socket buffer
    PacketTooLarge,
    /// Any other send failure
    SendFailed,
}

impl I2cError {
    /// Return variant name as a static string (usable with defmt on embedded)
    pub fn as_str(&self) -> &'static str {
        match self {
            I2cError::BusError => "BusError",
            I2cError::Nack => "Nack",
            I2cError::ArbitrationLost => "ArbitrationLost",
            I2cError::Timeout => "Timeout",
            I2cError::InvalidAddress => "InvalidAddress",
            I2cError::Overrun => "Overrun",
        }
    }
}

impl NetworkError {
    /// Return variant name as a static string (usable with defmt on embedded)
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkError::BindFailed => "BindFailed",
            NetworkError::NoRoute => "NoRoute",
            NetworkError::PacketTooLarge => "PacketTooLarge",
            NetworkError::SendFailed => "SendFailed",
        }
    }
}

impl PlatformError {
    /// Short description for log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformError::I2c(e) => e.as_str(),
            PlatformError::Network(e) => e.as_str(),
            PlatformError::InitializationFailed => "InitializationFailed",
            PlatformError::InvalidConfig => "InvalidConfig",
        }
    }

    /// True for failures that the next cycle is expected to clear
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PlatformError::I2c(_) | PlatformError::Network(NetworkError::NoRoute)
        )
    }
}

impl From<I2cError> for PlatformError {
    fn from(e: I2cError) -> Self {
        PlatformError::I2c(e)
    }
}

impl From<NetworkError> for PlatformError {
    fn from(e: NetworkError) -> Self {
        PlatformError::Network(e)
    }
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::I2c(e) => write!(f, "I2C error: {:?}", e),
            PlatformError::Network(e) => write!(f, "network error: {:?}", e),
            PlatformError::InitializationFailed => write!(f, "platform initialization failed"),
            PlatformError::InvalidConfig => write!(f, "invalid configuration"),
        }
    }
}
