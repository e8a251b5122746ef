//! Conversions from authoring space into the values the animation chunk stores.
//!
//! Authoring data is right handed, in meters, with Euler angles in radians
//! applied X then Y then Z. The chunk stores centimeters, keys in
//! hundredths of a frame, Euler angles in degrees read back in Z-Y-X
//! order, and compressed quaternions with the vector part negated.

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::error::ExportError;
use crate::structure::anm_utils::{QuaternionShort, Rgb, Vector3};

/// Key units per frame.
pub const FRAME_UNIT: i32 = 100;

pub const UNIT_SCALE: f32 = 100.0;
pub const QUAT_COMPRESS: f32 = 16384.0; // 0x4000
pub const RGB_CONVERT: f32 = 255.0;


/// Bone channels an action may animate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelPath {
    Location,
    RotationEuler,
    RotationQuaternion,
    Scale,
}

impl ChannelPath {
    pub fn parse(name: &str) -> Option<ChannelPath> {
        match name {
            "location" => Some(ChannelPath::Location),
            "rotation_euler" => Some(ChannelPath::RotationEuler),
            "rotation_quaternion" => Some(ChannelPath::RotationQuaternion),
            "scale" => Some(ChannelPath::Scale),
            _ => None,
        }
    }

    /// Number of array components making up one sample.
    pub fn width(self) -> usize {
        match self {
            ChannelPath::RotationQuaternion => 4,
            _ => 3,
        }
    }

    pub fn is_rotation(self) -> bool {
        matches!(self, ChannelPath::RotationEuler | ChannelPath::RotationQuaternion)
    }
}


/// Key of a frame in hundredths. Frames whose key would not fit an `i32` are rejected.
pub fn frame_key(frame: i32) -> Result<i32, ExportError> {
    frame.checked_mul(FRAME_UNIT).ok_or(ExportError::FrameOutOfRange(frame))
}

pub fn pos_m_to_cm(position: Vec3) -> Vec3 {
    position * UNIT_SCALE
}

/// Authoring Euler angles (radians, X then Y then Z) as a quaternion.
pub fn rot_from_euler(angles: Vec3) -> Quat {
    Quat::from_euler(EulerRot::ZYX, angles.z, angles.y, angles.x)
}

/// Authoring quaternion channels, stored w first.
pub fn rot_from_wxyz(w: f32, x: f32, y: f32, z: f32) -> Quat {
    Quat::from_xyzw(x, y, z, w)
}

/// Engine Euler angles in degrees, decomposed in Z-Y-X order.
pub fn rot_to_engine_euler(rotation: Quat) -> Vector3 {
    let (x, y, z) = rotation.to_euler(EulerRot::XYZ);
    Vector3 { x: x.to_degrees(), y: y.to_degrees(), z: z.to_degrees() }
}

/// Engine quaternion components scaled by 0x4000 and truncated.
pub fn compress_quat_components(rotation: Quat) -> [f32; 4] {
    [-rotation.x, -rotation.y, -rotation.z, rotation.w].map(|c| (c * QUAT_COMPRESS).trunc())
}

pub fn compress_quat(rotation: Quat) -> QuaternionShort {
    let [x, y, z, w] = compress_quat_components(rotation);
    QuaternionShort { x: x as i16, y: y as i16, z: z as i16, w: w as i16 }
}

pub fn decompress_quat(rotation: QuaternionShort) -> Quat {
    Quat::from_xyzw(
        -(rotation.x as f32) / QUAT_COMPRESS,
        -(rotation.y as f32) / QUAT_COMPRESS,
        -(rotation.z as f32) / QUAT_COMPRESS,
        rotation.w as f32 / QUAT_COMPRESS,
    )
}

/// Scale samples drop their sign and are compensated by the rest scale.
pub fn convert_scale(scale: Vec3, rest_scale: Vec3) -> Vec3 {
    scale.abs() * rest_scale
}

pub fn color_to_rgb(color: [f32; 3]) -> Rgb {
    let [r, g, b] = color.map(|c| (c * RGB_CONVERT) as u8);
    Rgb { r, g, b }
}


/// Rest transform of a bone relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RestPose {
    pub location: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl RestPose {
    pub fn from_matrix(matrix: Mat4) -> RestPose {
        let (scale, rotation, location) = matrix.to_scale_rotation_translation();
        RestPose { location, rotation, scale }
    }

    /// Pose-space location of a parented bone, in centimeters.
    pub fn location(&self, location: Vec3) -> Vec3 {
        pos_m_to_cm(self.rotation * location + self.location)
    }

    /// Pose-space rotation of a parented bone in engine orientation.
    pub fn rotation(&self, rotation: Quat) -> Quat {
        (self.rotation * rotation).inverse()
    }

    pub fn scale(&self, scale: Vec3) -> Vec3 {
        convert_scale(scale, self.scale)
    }
}
