//! One-byte relay opcodes

/// Command written by the coordinator to a subordinate's bus address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    /// Answer with the latest pose frame
    GetQuaternion = 0x23,
    /// Capture the current orientation as neutral
    SetNeutral = 0x24,
    /// Restart gyro bias calibration
    StartGyroCalibration = 0x25,
    /// Capture the forward (yaw) direction
    SetForwardDirection = 0x26,
}

impl Command {
    /// Opcode byte
    pub const fn opcode(self) -> u8 {
        self as u8
    }

    /// True if the command expects a frame to be read back
    pub const fn expects_frame(self) -> bool {
        matches!(self, Command::GetQuaternion)
    }

    /// Return variant name as a static string (usable with defmt on embedded)
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::GetQuaternion => "GetQuaternion",
            Command::SetNeutral => "SetNeutral",
            Command::StartGyroCalibration => "StartGyroCalibration",
            Command::SetForwardDirection => "SetForwardDirection",
        }
    }
}

/// Unknown opcode byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownCommand(pub u8);

impl TryFrom<u8> for Command {
    type Error = UnknownCommand;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0x23 => Ok(Command::GetQuaternion),
            0x24 => Ok(Command::SetNeutral),
            0x25 => Ok(Command::StartGyroCalibration),
            0x26 => Ok(Command::SetForwardDirection),
            other => Err(UnknownCommand(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcodes_parse_back() {
        for cmd in [
            Command::GetQuaternion,
            Command::SetNeutral,
            Command::StartGyroCalibration,
            Command::SetForwardDirection,
        ] {
            assert_eq!(Command::try_from(cmd.opcode()), Ok(cmd));
        }
        assert_eq!(Command::try_from(0x00), Err(UnknownCommand(0x00)));
    }

    #[test]
    fn only_get_reads_back() {
        assert!(Command::GetQuaternion.expects_frame());
        assert!(!Command::SetNeutral.expects_frame());
    }
}
