use binrw::binrw;

use crate::structure::anm_utils::*;

/// Standalone `.camera` chunk written next to an animation with a camera entry.
#[binrw]
#[derive(Debug, Clone, PartialEq)]
pub struct NuccCamera {
    pub unk1: u32,
    pub fov: f32,
}

impl Default for NuccCamera {
    fn default() -> Self {
        NuccCamera { unk1: 0, fov: 45.0 }
    }
}

#[binrw]
#[derive(Debug, Clone, PartialEq)]
pub struct NuccLightDirc {
    pub flags: [u32; 4],
    pub color: Vector3,
    pub intensity: f32,
    pub unk: [f32; 4],
    pub rotation: Vector4,
}

impl Default for NuccLightDirc {
    fn default() -> Self {
        NuccLightDirc {
            flags: [0; 4],
            color: Vector3 { x: 0.521569, y: 0.827451, z: 1.0 },
            intensity: 1.0,
            unk: [0.0; 4],
            rotation: Vector4 { x: -0.185349, y: 0.438735, z: -0.181711, w: 0.860313 },
        }
    }
}

#[binrw]
#[derive(Debug, Clone, PartialEq)]
pub struct NuccLightPoint {
    pub flags: [u32; 4],
    pub color: Vector3,
    pub intensity: f32,
    pub unk: f32,
    pub position: Vector3,
    pub radius: f32,
    pub falloff: f32,
    pub padding: [f32; 2],
}

impl Default for NuccLightPoint {
    fn default() -> Self {
        NuccLightPoint {
            flags: [0; 4],
            color: Vector3 { x: 0.0392157, y: 0.117647, z: 1.0 },
            intensity: 0.0,
            unk: 0.0,
            position: Vector3 { x: -23.2275, y: -183.9, z: 111.04 },
            radius: 100.0,
            falloff: 400.0,
            padding: [0.0; 2],
        }
    }
}

#[binrw]
#[derive(Debug, Clone, PartialEq)]
pub struct NuccAmbient {
    pub color: Vector3,
    pub intensity: f32,
}

impl Default for NuccAmbient {
    fn default() -> Self {
        NuccAmbient {
            color: Vector3 { x: 0.290196, y: 0.494118, z: 0.611765 },
            intensity: 1.0,
        }
    }
}

/// Light parameter chunk, one per exported light.
#[derive(Debug, Clone, PartialEq)]
pub enum LightChunk {
    LightDirc(NuccLightDirc),
    LightPoint(NuccLightPoint),
    Ambient(NuccAmbient),
}

impl LightChunk {
    pub fn extension(&self) -> &'static str {
        match self {
            LightChunk::LightDirc(_) => "lightdirc",
            LightChunk::LightPoint(_) => "lightpoint",
            LightChunk::Ambient(_) => "ambient",
        }
    }

    pub fn chunk_type(&self) -> &'static str {
        match self {
            LightChunk::LightDirc(_) => "nuccChunkLightDirc",
            LightChunk::LightPoint(_) => "nuccChunkLightPoint",
            LightChunk::Ambient(_) => "nuccChunkAmbient",
        }
    }

    pub fn to_bytes(&self) -> binrw::BinResult<Vec<u8>> {
        match self {
            LightChunk::LightDirc(light) => super::to_be_bytes(light),
            LightChunk::LightPoint(light) => super::to_be_bytes(light),
            LightChunk::Ambient(light) => super::to_be_bytes(light),
        }
    }
}
