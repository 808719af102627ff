//! Gamepad HID report
//!
//! The wireless transport is external; this only packs the report it
//! notifies. Orientation rides on the four rotational axes.

use nalgebra::Quaternion;

/// Packed report size: one button byte plus seven `i16` axes
pub const REPORT_LEN: usize = 15;

/// Full-scale axis value
pub const AXIS_SCALE: f32 = 32767.0;

/// Button byte sent with orientation reports
pub const DEFAULT_BUTTONS: u8 = 0b0000_0001;

/// Gamepad input report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GamepadReport {
    /// Button bitmap
    pub buttons: u8,
    /// Left stick X
    pub x: i16,
    /// Left stick Y
    pub y: i16,
    /// Left trigger axis
    pub z: i16,
    /// Rotation X, carries quaternion x
    pub rx: i16,
    /// Rotation Y, carries quaternion y
    pub ry: i16,
    /// Rotation Z, carries quaternion z
    pub rz: i16,
    /// Slider, carries quaternion w
    pub slider: i16,
}

fn axis(v: f32) -> i16 {
    // Float to int casts saturate; NaN maps to 0
    (v * AXIS_SCALE) as i16
}

impl GamepadReport {
    /// Report carrying a unit orientation
    pub fn from_orientation(q: &Quaternion<f32>) -> Self {
        Self {
            buttons: DEFAULT_BUTTONS,
            rx: axis(q.i),
            ry: axis(q.j),
            rz: axis(q.k),
            slider: axis(q.w),
            ..Default::default()
        }
    }

    /// Orientation recovered from the rotational axes (not renormalized)
    pub fn orientation(&self) -> Quaternion<f32> {
        let f = |v: i16| f32::from(v) / AXIS_SCALE;
        Quaternion::new(f(self.slider), f(self.rx), f(self.ry), f(self.rz))
    }

    /// Packed little-endian bytes
    pub fn to_bytes(&self) -> [u8; REPORT_LEN] {
        let mut out = [0u8; REPORT_LEN];
        out[0] = self.buttons;
        let axes = [
            self.x,
            self.y,
            self.z,
            self.rx,
            self.ry,
            self.rz,
            self.slider,
        ];
        for (chunk, v) in out[1..].chunks_exact_mut(2).zip(axes) {
            chunk.copy_from_slice(&v.to_le_bytes());
        }
        out
    }
}
