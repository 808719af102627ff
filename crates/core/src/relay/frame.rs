//! Relay wire frame
//!
//! ```text
//! single: [u32 header][x y z w: f32 ×4][u32 footer]                 24 bytes
//! dual:   [u32 header][x y z w: f32 ×4][x y z w: f32 ×4][u32 footer] 40 bytes
//! ```
//!
//! All fields little-endian. The header and footer guard against torn or
//! shifted reads; a frame with either wrong is dropped whole.

use crate::math::from_xyzw;
use nalgebra::Quaternion;

/// Leading sentinel
pub const FRAME_HEADER: u32 = 0x0102_0304;

/// Trailing sentinel
pub const FRAME_FOOTER: u32 = 0xA7F3_2249;

/// Size of the single-quaternion frame
pub const SINGLE_FRAME_LEN: usize = 24;

/// Size of the dual-quaternion frame
pub const DUAL_FRAME_LEN: usize = 40;

/// Largest frame size, for buffer sizing
pub const MAX_FRAME_LEN: usize = DUAL_FRAME_LEN;

/// Frame layout, fixed per build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameLayout {
    /// Orientation only
    Single,
    /// Orientation plus the subordinate's applied yaw correction
    Dual,
}

impl FrameLayout {
    /// Encoded size in bytes
    pub const fn size(self) -> usize {
        match self {
            FrameLayout::Single => SINGLE_FRAME_LEN,
            FrameLayout::Dual => DUAL_FRAME_LEN,
        }
    }
}

/// Frame rejection reasons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Buffer length does not match the layout
    Length,
    /// Header sentinel mismatch
    Header,
    /// Footer sentinel mismatch
    Footer,
}

impl FrameError {
    /// Return variant name as a static string (usable with defmt on embedded)
    pub fn as_str(&self) -> &'static str {
        match self {
            FrameError::Length => "Length",
            FrameError::Header => "Header",
            FrameError::Footer => "Footer",
        }
    }
}

impl core::fmt::Display for FrameError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FrameError::Length => write!(f, "relay frame length mismatch"),
            FrameError::Header => write!(f, "relay frame header mismatch"),
            FrameError::Footer => write!(f, "relay frame footer mismatch"),
        }
    }
}

/// Decoded relay payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelayFrame {
    /// Subordinate orientation
    pub orientation: Quaternion<f32>,
    /// Yaw correction already applied by the subordinate (dual layout only)
    pub correction: Option<Quaternion<f32>>,
}

impl RelayFrame {
    /// Single-layout frame
    pub fn single(orientation: Quaternion<f32>) -> Self {
        Self {
            orientation,
            correction: None,
        }
    }

    /// Dual-layout frame
    pub fn dual(orientation: Quaternion<f32>, correction: Quaternion<f32>) -> Self {
        Self {
            orientation,
            correction: Some(correction),
        }
    }

    /// Layout this frame encodes to
    pub fn layout(&self) -> FrameLayout {
        match self.correction {
            Some(_) => FrameLayout::Dual,
            None => FrameLayout::Single,
        }
    }

    /// Encode into `buf`, returning the number of bytes written
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize, FrameError> {
        let len = self.layout().size();
        let out = buf.get_mut(..len).ok_or(FrameError::Length)?;

        out[0..4].copy_from_slice(&FRAME_HEADER.to_le_bytes());
        put_quaternion(&mut out[4..20], &self.orientation);
        if let Some(correction) = &self.correction {
            put_quaternion(&mut out[20..36], correction);
        }
        out[len - 4..len].copy_from_slice(&FRAME_FOOTER.to_le_bytes());
        Ok(len)
    }

    /// Encode into a fixed buffer sized for either layout
    pub fn to_bytes(&self) -> ([u8; MAX_FRAME_LEN], usize) {
        let mut buf = [0u8; MAX_FRAME_LEN];
        // MAX_FRAME_LEN covers both layouts
        let len = self.encode(&mut buf).unwrap_or(0);
        (buf, len)
    }

    /// Decode a frame of exactly `layout.size()` bytes
    pub fn decode(buf: &[u8], layout: FrameLayout) -> Result<Self, FrameError> {
        let len = layout.size();
        if buf.len() != len {
            return Err(FrameError::Length);
        }
        if get_u32(&buf[0..4]) != FRAME_HEADER {
            return Err(FrameError::Header);
        }
        if get_u32(&buf[len - 4..len]) != FRAME_FOOTER {
            return Err(FrameError::Footer);
        }

        let orientation = get_quaternion(&buf[4..20]);
        let correction = match layout {
            FrameLayout::Single => None,
            FrameLayout::Dual => Some(get_quaternion(&buf[20..36])),
        };
        Ok(Self {
            orientation,
            correction,
        })
    }
}

fn get_u32(bytes: &[u8]) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(bytes);
    u32::from_le_bytes(raw)
}

fn get_f32(bytes: &[u8]) -> f32 {
    f32::from_bits(get_u32(bytes))
}

/// Wire order is x, y, z, w
fn put_quaternion(out: &mut [u8], q: &Quaternion<f32>) {
    for (chunk, v) in out.chunks_exact_mut(4).zip([q.i, q.j, q.k, q.w]) {
        chunk.copy_from_slice(&v.to_le_bytes());
    }
}

fn get_quaternion(bytes: &[u8]) -> Quaternion<f32> {
    from_xyzw(
        get_f32(&bytes[0..4]),
        get_f32(&bytes[4..8]),
        get_f32(&bytes[8..12]),
        get_f32(&bytes[12..16]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Quaternion<f32> {
        // Values without an exact short decimal form
        from_xyzw(0.123_456_79, -0.987_654_3, 1.0e-7, -0.333_333_34)
    }

    fn bits(q: &Quaternion<f32>) -> [u32; 4] {
        [q.i.to_bits(), q.j.to_bits(), q.k.to_bits(), q.w.to_bits()]
    }

    #[test]
    fn test_single_layout_bytes() {
        let (buf, len) = RelayFrame::single(from_xyzw(0.0, 0.0, 0.0, 1.0)).to_bytes();
        assert_eq!(len, SINGLE_FRAME_LEN);
        assert_eq!(&buf[0..4], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(&buf[16..20], &1.0f32.to_le_bytes());
        assert_eq!(&buf[20..24], &[0x49, 0x22, 0xF3, 0xA7]);
    }

    #[test]
    fn test_round_trip_is_bit_exact() {
        let frame = RelayFrame::single(sample());
        let (buf, len) = frame.to_bytes();
        let decoded = RelayFrame::decode(&buf[..len], FrameLayout::Single).unwrap();
        assert_eq!(bits(&decoded.orientation), bits(&frame.orientation));
        assert_eq!(decoded.correction, None);

        let frame = RelayFrame::dual(sample(), from_xyzw(0.0, 0.0, 0.5, 0.866));
        let (buf, len) = frame.to_bytes();
        assert_eq!(len, DUAL_FRAME_LEN);
        let decoded = RelayFrame::decode(&buf[..len], FrameLayout::Dual).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn test_corrupted_sentinel_rejected() {
        let (buf, len) = RelayFrame::single(sample()).to_bytes();
        for i in 0..4 {
            let mut bad = buf;
            bad[i] ^= 0x40;
            assert_eq!(
                RelayFrame::decode(&bad[..len], FrameLayout::Single),
                Err(FrameError::Header)
            );

            let mut bad = buf;
            bad[len - 1 - i] ^= 0x01;
            assert_eq!(
                RelayFrame::decode(&bad[..len], FrameLayout::Single),
                Err(FrameError::Footer)
            );
        }
    }

    #[test]
    fn test_length_mismatch() {
        let (buf, _) = RelayFrame::single(sample()).to_bytes();
        assert_eq!(
            RelayFrame::decode(&buf[..SINGLE_FRAME_LEN], FrameLayout::Dual),
            Err(FrameError::Length)
        );
        let mut small = [0u8; 10];
        assert_eq!(
            RelayFrame::single(sample()).encode(&mut small),
            Err(FrameError::Length)
        );
    }
}
