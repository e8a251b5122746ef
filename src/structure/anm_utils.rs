use binrw::binrw;
use glam::{Quat, Vec3};

#[binrw]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<Vec3> for Vector3 {
    fn from(v: Vec3) -> Self {
        Vector3 { x: v.x, y: v.y, z: v.z }
    }
}

impl From<Vector3> for Vec3 {
    fn from(v: Vector3) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

#[binrw]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl From<Quat> for Vector4 {
    fn from(q: Quat) -> Self {
        Vector4 { x: q.x, y: q.y, z: q.z, w: q.w }
    }
}

#[binrw]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyframeVector3 {
    pub frame: i32,
    pub value: Vector3,
}

#[binrw]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyframeVector4 {
    pub frame: i32,
    pub value: Vector4,
}

#[binrw]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyframeFloat {
    pub frame: i32,
    pub value: f32,
}

#[binrw]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Vector3Short {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

#[binrw]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuaternionShort {
    pub x: i16,
    pub y: i16,
    pub z: i16,
    pub w: i16,
}

#[binrw]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}
