//! Tracker datagram encoder
//!
//! Each datagram is one OSC message understood by the host tracking driver:
//!
//! ```text
//! [address pattern, NUL padded to 4][type tags, NUL padded to 4]
//! [index i32][enable i32][time f32][x y z f32][qx qy qz qw f32]   40 bytes
//! [identifier, NUL padded to 4]                                   Joint/Follow only
//! ```
//!
//! The 40-byte argument block is the historical native struct
//! `{qw, qz, qy, qx, z, y, x, time, enable, index}` (little-endian) copied
//! byte-reversed, which is the same as writing each field big-endian in the
//! order above. The driver parses those bytes exactly, so the block must not
//! be reordered.

use heapless::String;
use nalgebra::{Quaternion, Vector3};

/// Size of the numeric argument block
pub const ARGUMENT_BLOCK_LEN: usize = 40;

/// Buffer size that fits any message with a 20-character identifier
pub const MAX_DATAGRAM_LEN: usize = 128;

/// Longest identifier accepted by the decoder
pub const MAX_IDENTIFIER_LEN: usize = 31;

/// Local UDP port the tracker binds to
pub const LOCAL_PORT: u16 = 62333;

/// Message variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmtMessage {
    /// Pose in driver space, no identifier
    Raw,
    /// Pose relative to the tracker named by the identifier, sent once
    Joint,
    /// Pose relative to, and following, the tracker named by the identifier
    Follow,
}

impl VmtMessage {
    /// OSC address pattern
    pub const fn address(self) -> &'static str {
        match self {
            VmtMessage::Raw => "/VMT/Raw/Driver",
            VmtMessage::Joint => "/VMT/Joint/Driver",
            VmtMessage::Follow => "/VMT/Follow/Driver",
        }
    }

    /// OSC type tag string
    pub const fn type_tags(self) -> &'static str {
        match self {
            VmtMessage::Raw => ",iiffffffff",
            VmtMessage::Joint | VmtMessage::Follow => ",iiffffffffs",
        }
    }

    /// True if a trailing identifier follows the argument block
    pub const fn has_identifier(self) -> bool {
        !matches!(self, VmtMessage::Raw)
    }

    fn from_address(address: &str) -> Option<Self> {
        [VmtMessage::Raw, VmtMessage::Joint, VmtMessage::Follow]
            .into_iter()
            .find(|m| m.address() == address)
    }
}

/// Encoder and decoder failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    /// Output buffer cannot hold the message
    BufferTooSmall,
    /// Identifier contains a NUL byte or is too long
    InvalidIdentifier,
    /// Input is not a well-formed tracker message
    Malformed,
}

impl EncodeError {
    /// Return variant name as a static string (usable with defmt on embedded)
    pub fn as_str(&self) -> &'static str {
        match self {
            EncodeError::BufferTooSmall => "BufferTooSmall",
            EncodeError::InvalidIdentifier => "InvalidIdentifier",
            EncodeError::Malformed => "Malformed",
        }
    }
}

impl core::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EncodeError::BufferTooSmall => write!(f, "datagram buffer too small"),
            EncodeError::InvalidIdentifier => write!(f, "invalid tracker identifier"),
            EncodeError::Malformed => write!(f, "malformed tracker datagram"),
        }
    }
}

/// Numeric arguments of one tracker message
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerArgs {
    /// Tracker index on the host
    pub index: i32,
    /// 0 disables the tracker, 1 enables it
    pub enable: i32,
    /// Time offset in seconds, normally 0
    pub time: f32,
    /// Position in meters
    pub position: Vector3<f32>,
    /// Rotation
    pub rotation: Quaternion<f32>,
}

impl TrackerArgs {
    /// Enabled tracker at the given pose
    pub fn new(index: u8, rotation: Quaternion<f32>, position: Vector3<f32>) -> Self {
        Self {
            index: i32::from(index),
            enable: 1,
            time: 0.0,
            position,
            rotation,
        }
    }

    /// Disable message: identity rotation at the origin
    pub fn disabled(index: u8) -> Self {
        Self {
            index: i32::from(index),
            enable: 0,
            time: 0.0,
            position: Vector3::zeros(),
            rotation: Quaternion::identity(),
        }
    }

    fn write_block(&self, out: &mut [u8]) {
        let q = &self.rotation;
        let p = &self.position;
        let words = [
            self.index as u32,
            self.enable as u32,
            self.time.to_bits(),
            p.x.to_bits(),
            p.y.to_bits(),
            p.z.to_bits(),
            q.i.to_bits(),
            q.j.to_bits(),
            q.k.to_bits(),
            q.w.to_bits(),
        ];
        for (chunk, word) in out.chunks_exact_mut(4).zip(words) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
    }

    fn read_block(block: &[u8]) -> Self {
        let mut words = [0u32; 10];
        for (word, chunk) in words.iter_mut().zip(block.chunks_exact(4)) {
            let mut raw = [0u8; 4];
            raw.copy_from_slice(chunk);
            *word = u32::from_be_bytes(raw);
        }
        let f = |i: usize| f32::from_bits(words[i]);
        Self {
            index: words[0] as i32,
            enable: words[1] as i32,
            time: f(2),
            position: Vector3::new(f(3), f(4), f(5)),
            rotation: Quaternion::new(f(9), f(6), f(7), f(8)),
        }
    }
}

/// `len + 1` rounded up to a multiple of 4 (OSC string with terminator)
const fn padded_len(len: usize) -> usize {
    (len + 4) & !3
}

/// Write `s` plus NUL padding at `buf[at..]`, returning the new offset
fn put_padded(buf: &mut [u8], at: usize, s: &str) -> Result<usize, EncodeError> {
    let end = at + padded_len(s.len());
    let out = buf.get_mut(at..end).ok_or(EncodeError::BufferTooSmall)?;
    out.fill(0);
    out[..s.len()].copy_from_slice(s.as_bytes());
    Ok(end)
}

/// Read a NUL-terminated, 4-byte padded string at `buf[at..]`
fn get_padded(buf: &[u8], at: usize) -> Result<(&str, usize), EncodeError> {
    let rest = buf.get(at..).ok_or(EncodeError::Malformed)?;
    let len = rest
        .iter()
        .position(|b| *b == 0)
        .ok_or(EncodeError::Malformed)?;
    let end = at + padded_len(len);
    if end > buf.len() {
        return Err(EncodeError::Malformed);
    }
    let s = core::str::from_utf8(&rest[..len]).map_err(|_| EncodeError::Malformed)?;
    Ok((s, end))
}

/// Total encoded size of a message
pub fn encoded_len(message: VmtMessage, identifier: &str) -> usize {
    let mut len = padded_len(message.address().len())
        + padded_len(message.type_tags().len())
        + ARGUMENT_BLOCK_LEN;
    if message.has_identifier() {
        len += padded_len(identifier.len());
    }
    len
}

/// Encode one message into `buf`, returning the datagram length.
///
/// `identifier` is the root tracker serial; it is ignored for
/// [`VmtMessage::Raw`] and may be empty otherwise.
pub fn encode(
    message: VmtMessage,
    args: &TrackerArgs,
    identifier: &str,
    buf: &mut [u8],
) -> Result<usize, EncodeError> {
    if message.has_identifier()
        && (identifier.len() > MAX_IDENTIFIER_LEN || identifier.as_bytes().contains(&0))
    {
        return Err(EncodeError::InvalidIdentifier);
    }
    if buf.len() < encoded_len(message, identifier) {
        return Err(EncodeError::BufferTooSmall);
    }

    let mut at = put_padded(buf, 0, message.address())?;
    at = put_padded(buf, at, message.type_tags())?;
    args.write_block(&mut buf[at..at + ARGUMENT_BLOCK_LEN]);
    at += ARGUMENT_BLOCK_LEN;
    if message.has_identifier() {
        at = put_padded(buf, at, identifier)?;
    }
    Ok(at)
}

/// Decoded tracker message
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedMessage {
    /// Message variant
    pub message: VmtMessage,
    /// Numeric arguments
    pub args: TrackerArgs,
    /// Trailing identifier, empty for `Raw`
    pub identifier: String<MAX_IDENTIFIER_LEN>,
}

/// Parse a datagram produced by [`encode`]
pub fn decode(buf: &[u8]) -> Result<DecodedMessage, EncodeError> {
    let (address, at) = get_padded(buf, 0)?;
    let message = VmtMessage::from_address(address).ok_or(EncodeError::Malformed)?;

    let (tags, at) = get_padded(buf, at)?;
    if tags != message.type_tags() {
        return Err(EncodeError::Malformed);
    }

    let block = buf
        .get(at..at + ARGUMENT_BLOCK_LEN)
        .ok_or(EncodeError::Malformed)?;
    let args = TrackerArgs::read_block(block);
    let at = at + ARGUMENT_BLOCK_LEN;

    let mut identifier = String::new();
    let end = if message.has_identifier() {
        let (id, end) = get_padded(buf, at)?;
        identifier
            .push_str(id)
            .map_err(|_| EncodeError::InvalidIdentifier)?;
        end
    } else {
        at
    };
    if end != buf.len() {
        return Err(EncodeError::Malformed);
    }

    Ok(DecodedMessage {
        message,
        args,
        identifier,
    })
}
