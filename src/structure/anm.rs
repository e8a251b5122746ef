use std::io::{Seek, Write};
use binrw::{binrw, binwrite, BinResult, BinWrite, WriteOptions};

use crate::structure::anm_utils::*;

/// Key of the closing sample every keyed curve ends with.
pub const NULL_KEY: i32 = -1;


/// Root of an animation chunk. Entry, clump and coord counts are derived
/// from the vectors when written.
#[binwrite]
#[derive(Debug, Clone, PartialEq)]
pub struct NuccAnm {
    pub anm_length: u32,
    pub frame_size: u32,

    #[bw(calc = entries.len() as u16)]
    entry_count: u16,

    #[bw(map = |looped: &bool| u16::from(*looped))]
    pub looped: bool,

    #[bw(calc = clumps.len() as u16)]
    clump_count: u16,

    pub other_entry_count: u16,

    #[bw(calc = coord_parents.len() as u32)]
    coord_count: u32,

    pub clumps: Vec<AnmClump>,
    pub coord_parents: Vec<CoordParent>,
    pub entries: Vec<AnmEntry>,
}

impl NuccAnm {
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn clump_count(&self) -> usize {
        self.clumps.len()
    }

    /// Number of parent/child pairs, not of coords.
    pub fn coord_count(&self) -> usize {
        self.coord_parents.len()
    }
}


#[binrw]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnmClump {
    pub clump_index: u32,

    #[br(temp)]
    #[bw(calc = bone_material_indices.len() as u16)]
    bone_material_count: u16,

    #[br(temp)]
    #[bw(calc = model_indices.len() as u16)]
    model_count: u16,

    #[br(count = bone_material_count)]
    pub bone_material_indices: Vec<u32>,

    #[br(count = model_count)]
    pub model_indices: Vec<u32>,
}

#[binrw]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordParent {
    pub parent: AnmCoord,
    pub child: AnmCoord,
}

#[binrw]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnmCoord {
    pub clump_index: i16,
    pub coord_index: u16,
}

#[binrw]
#[brw(repr(u16))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum AnmEntryFormat {
    BONE = 1,
    CAMERA = 2,
    MATERIAL = 4,
    LIGHTDIRC = 5,
    LIGHTPOINT = 6,
    AMBIENT = 8,
}

#[binwrite]
#[derive(Debug, Clone, PartialEq)]
pub struct AnmEntry {
    pub coord: AnmCoord,
    pub entry_format: AnmEntryFormat,

    #[bw(calc = curve_headers.len() as u16)]
    curve_count: u16,

    pub curve_headers: Vec<CurveHeader>,
    pub curves: Vec<Curve>,
}


#[binrw]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurveHeader {
    pub curve_index: u16,
    pub curve_format: AnmCurveFormat,
    pub frame_count: u16,
    pub curve_size: u16,
}

impl CurveHeader {
    /// Header matching `curve`, or `None` when its frame count or size overflows.
    pub fn describe(curve_index: u16, curve: &Curve) -> Option<CurveHeader> {
        Some(CurveHeader {
            curve_index,
            curve_format: curve.format,
            frame_count: u16::try_from(curve.frame_count()).ok()?,
            curve_size: u16::try_from(curve.byte_size()).ok()?,
        })
    }
}

#[binrw]
#[brw(repr(u16))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum AnmCurveFormat {
    FLOAT3 = 0x05,  // location/scale
    INT1_FLOAT3 = 0x06,  // location/scale (with keyframe)
    FLOAT3ALT = 0x08,  // rotation euler
    INT1_FLOAT4 = 0x0A,  // rotation quaternions (with keyframe)
    FLOAT1 = 0x0B,  // "toggled"
    INT1_FLOAT1 = 0x0C,  // camera fov, material params
    SHORT1 = 0x0F,
    SHORT3 = 0x10,  // scale
    SHORT4 = 0x11,  // rotation quaternions
    BYTE3 = 0x14,  // light color
    FLOAT3ALT2 = 0x15,  // scale
    FLOAT1ALT = 0x16,  // light strength
    FLOAT1ALT2 = 0x18,  // ambient strength
}

impl AnmCurveFormat {
    /// Bytes taken by one sample of this format, key included.
    pub fn sample_size(self) -> usize {
        match self {
            AnmCurveFormat::FLOAT3 | AnmCurveFormat::FLOAT3ALT | AnmCurveFormat::FLOAT3ALT2 => 12,
            AnmCurveFormat::INT1_FLOAT3 => 16,
            AnmCurveFormat::INT1_FLOAT4 => 20,
            AnmCurveFormat::FLOAT1 | AnmCurveFormat::FLOAT1ALT | AnmCurveFormat::FLOAT1ALT2 => 4,
            AnmCurveFormat::INT1_FLOAT1 => 8,
            AnmCurveFormat::SHORT1 => 2,
            AnmCurveFormat::SHORT3 => 6,
            AnmCurveFormat::SHORT4 => 8,
            AnmCurveFormat::BYTE3 => 3,
        }
    }

    /// Whether `values` has the sample shape this format is written with.
    pub fn accepts(self, values: &CurveValues) -> bool {
        match values {
            CurveValues::Vector3(_) => matches!(
                self,
                AnmCurveFormat::FLOAT3 | AnmCurveFormat::FLOAT3ALT | AnmCurveFormat::FLOAT3ALT2
            ),
            CurveValues::KeyframeVector3(_) => self == AnmCurveFormat::INT1_FLOAT3,
            CurveValues::KeyframeVector4(_) => self == AnmCurveFormat::INT1_FLOAT4,
            CurveValues::Float(_) => matches!(
                self,
                AnmCurveFormat::FLOAT1 | AnmCurveFormat::FLOAT1ALT | AnmCurveFormat::FLOAT1ALT2
            ),
            CurveValues::KeyframeFloat(_) => self == AnmCurveFormat::INT1_FLOAT1,
            CurveValues::Short(_) => self == AnmCurveFormat::SHORT1,
            CurveValues::Vector3Short(_) => self == AnmCurveFormat::SHORT3,
            CurveValues::QuaternionShort(_) => self == AnmCurveFormat::SHORT4,
            CurveValues::Rgb(_) => self == AnmCurveFormat::BYTE3,
        }
    }
}


#[derive(Debug, Clone, PartialEq)]
pub enum CurveValues {
    Vector3(Vec<Vector3>),
    KeyframeVector3(Vec<KeyframeVector3>),
    KeyframeVector4(Vec<KeyframeVector4>),
    Float(Vec<f32>),
    KeyframeFloat(Vec<KeyframeFloat>),
    Short(Vec<i16>),
    Vector3Short(Vec<Vector3Short>),
    QuaternionShort(Vec<QuaternionShort>),
    Rgb(Vec<Rgb>),
}

impl CurveValues {
    pub fn len(&self) -> usize {
        match self {
            CurveValues::Vector3(curve) => curve.len(),
            CurveValues::KeyframeVector3(curve) => curve.len(),
            CurveValues::KeyframeVector4(curve) => curve.len(),
            CurveValues::Float(curve) => curve.len(),
            CurveValues::KeyframeFloat(curve) => curve.len(),
            CurveValues::Short(curve) => curve.len(),
            CurveValues::Vector3Short(curve) => curve.len(),
            CurveValues::QuaternionShort(curve) => curve.len(),
            CurveValues::Rgb(curve) => curve.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub format: AnmCurveFormat,
    pub values: CurveValues,
}

impl Curve {
    pub fn new(format: AnmCurveFormat, values: CurveValues) -> Curve {
        debug_assert!(format.accepts(&values), "{:?} cannot hold {:?}", format, values);
        Curve { format, values }
    }

    pub fn frame_count(&self) -> usize {
        self.values.len()
    }

    /// Encoded size of the curve body, padded to a 4 byte boundary.
    pub fn byte_size(&self) -> usize {
        let raw = self.frame_count() * self.format.sample_size();
        (raw + 3) & !3
    }

    pub fn pad_color_values(&mut self) {
        if let CurveValues::Rgb(values) = &mut self.values {
            let len = values.len();

            if len % 4 != 0 {
                let last_color = values.last().copied().unwrap_or(Rgb { r: 255, g: 255, b: 255 });

                for _ in len % 4..4 {
                    values.push(last_color);
                }
            }
        }
    }

    /// Appends the -1 key that ends a keyed curve, repeating the last value.
    pub fn append_null_keyframe(&mut self) {
        match &mut self.values {
            CurveValues::KeyframeVector3(keyframes) => {
                if let Some(last) = keyframes.last().copied() {
                    if last.frame != -1 {
                        keyframes.push(KeyframeVector3 { frame: NULL_KEY, value: last.value });
                    }
                }
            }
            CurveValues::KeyframeVector4(keyframes) => {
                if let Some(last) = keyframes.last().copied() {
                    if last.frame != -1 {
                        keyframes.push(KeyframeVector4 { frame: NULL_KEY, value: last.value });
                    }
                }
            }
            CurveValues::KeyframeFloat(keyframes) => {
                if let Some(last) = keyframes.last().copied() {
                    if last.frame != -1 {
                        keyframes.push(KeyframeFloat { frame: NULL_KEY, value: last.value });
                    }
                }
            }
            _ => {} // No null keyframe for unkeyed curves
        }
    }
}

impl BinWrite for Curve {
    type Args = ();

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        options: &WriteOptions,
        _: Self::Args,
    ) -> BinResult<()> {
        match &self.values {
            CurveValues::Vector3(values) => values.write_options(writer, options, ())?,
            CurveValues::KeyframeVector3(values) => values.write_options(writer, options, ())?,
            CurveValues::KeyframeVector4(values) => values.write_options(writer, options, ())?,
            CurveValues::Float(values) => values.write_options(writer, options, ())?,
            CurveValues::KeyframeFloat(values) => values.write_options(writer, options, ())?,
            CurveValues::Short(values) => values.write_options(writer, options, ())?,
            CurveValues::Vector3Short(values) => values.write_options(writer, options, ())?,
            CurveValues::QuaternionShort(values) => values.write_options(writer, options, ())?,
            CurveValues::Rgb(values) => values.write_options(writer, options, ())?,
        }

        let padding = self.byte_size() - self.frame_count() * self.format.sample_size();
        writer.write_all(&[0u8; 3][..padding])?;

        Ok(())
    }
}
