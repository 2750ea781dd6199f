//! Orientation math over DMP packets
//!
//! [`OrientationMath`] is the seam between packet decoding and the
//! acquisition loop. [`MotionApps20`] decodes the 42-byte MotionApps 2.0
//! packet:
//!
//! | Offset | Content                                   |
//! |--------|-------------------------------------------|
//! | 0..16  | quaternion w, x, y, z (i32, high word used) |
//! | 16..28 | gyro x, y, z (i32, high word used)        |
//! | 28..40 | accel x, y, z (i32, high word used)       |
//! | 40..42 | padding                                   |

use crate::fifo::FifoPacket;
use libm::{atan2f, atanf, sqrtf};

/// Unit quaternion
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Quaternion {
    /// Scalar part
    pub w: f32,
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
    /// Z component
    pub z: f32,
}

impl Quaternion {
    /// Identity rotation
    pub const IDENTITY: Self = Self {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };
}

/// Gravity direction in the sensor frame, in g
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Gravity {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
    /// Z component
    pub z: f32,
}

/// Euler angles in radians
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct YawPitchRoll {
    /// Rotation about Z
    pub yaw: f32,
    /// Rotation about Y
    pub pitch: f32,
    /// Rotation about X
    pub roll: f32,
}

/// Raw three-axis reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Vector3 {
    /// X axis
    pub x: i16,
    /// Y axis
    pub y: i16,
    /// Z axis
    pub z: i16,
}

/// Conversions from DMP packets to orientation quantities
pub trait OrientationMath {
    /// Orientation quaternion
    fn quaternion(&self, packet: &FifoPacket) -> Quaternion;

    /// Raw accelerometer reading
    fn raw_accel(&self, packet: &FifoPacket) -> Vector3;

    /// Raw gyroscope reading
    fn raw_gyro(&self, packet: &FifoPacket) -> Vector3;

    /// Gravity direction implied by `q`
    fn gravity(&self, q: &Quaternion) -> Gravity;

    /// Yaw, pitch and roll in radians
    fn yaw_pitch_roll(&self, q: &Quaternion, gravity: &Gravity) -> YawPitchRoll;
}

/// MotionApps 2.0 packet layout and formulas
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionApps20;

/// Quaternion fixed-point scale (Q14)
const QUATERNION_SCALE: f32 = 16384.0;

fn vector_at(packet: &FifoPacket, base: usize) -> Vector3 {
    Vector3 {
        x: packet.i16_at(base),
        y: packet.i16_at(base + 4),
        z: packet.i16_at(base + 8),
    }
}

impl OrientationMath for MotionApps20 {
    fn quaternion(&self, packet: &FifoPacket) -> Quaternion {
        let component = |offset| f32::from(packet.i16_at(offset)) / QUATERNION_SCALE;
        Quaternion {
            w: component(0),
            x: component(4),
            y: component(8),
            z: component(12),
        }
    }

    fn raw_gyro(&self, packet: &FifoPacket) -> Vector3 {
        vector_at(packet, 16)
    }

    fn raw_accel(&self, packet: &FifoPacket) -> Vector3 {
        vector_at(packet, 28)
    }

    fn gravity(&self, q: &Quaternion) -> Gravity {
        Gravity {
            x: 2.0 * (q.x * q.z - q.w * q.y),
            y: 2.0 * (q.w * q.x + q.y * q.z),
            z: q.w * q.w - q.x * q.x - q.y * q.y + q.z * q.z,
        }
    }

    fn yaw_pitch_roll(&self, q: &Quaternion, gravity: &Gravity) -> YawPitchRoll {
        let g = gravity;
        YawPitchRoll {
            yaw: atan2f(
                2.0 * q.x * q.y - 2.0 * q.w * q.z,
                2.0 * q.w * q.w + 2.0 * q.x * q.x - 1.0,
            ),
            pitch: atanf(g.x / sqrtf(g.y * g.y + g.z * g.z)),
            roll: atanf(g.y / sqrtf(g.x * g.x + g.z * g.z)),
        }
    }
}
