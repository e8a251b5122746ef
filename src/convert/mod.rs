//! Entry encoders: one module per kind of animated target.

pub mod bone;
pub mod camera;
pub mod light;
pub mod material;

use glam::{Quat, Vec3};
use hashbrown::HashMap;

use crate::clump::anm_coord;
use crate::coordinate::{compress_quat, frame_key, pos_m_to_cm, rot_to_engine_euler};
use crate::error::ExportError;
use crate::mapping::{ChunkKind, IndexTable};
use crate::scene::{FrameSampler, SampledState};
use crate::skeleton::AnimatedSkeleton;
use crate::structure::anm::{
    AnmClump, AnmCoord, AnmCurveFormat, AnmEntry, AnmEntryFormat, Curve, CurveHeader, CurveValues,
};
use crate::structure::anm_utils::*;


/// Value stored after the key of a keyed curve.
pub trait KeyedValue: Copy {
    const FORMAT: AnmCurveFormat;

    fn into_values(keys: Vec<(i32, Self)>) -> CurveValues;
}

impl KeyedValue for Vector3 {
    const FORMAT: AnmCurveFormat = AnmCurveFormat::INT1_FLOAT3;

    fn into_values(keys: Vec<(i32, Self)>) -> CurveValues {
        CurveValues::KeyframeVector3(keys.into_iter().map(|(frame, value)| KeyframeVector3 { frame, value }).collect())
    }
}

impl KeyedValue for Vector4 {
    const FORMAT: AnmCurveFormat = AnmCurveFormat::INT1_FLOAT4;

    fn into_values(keys: Vec<(i32, Self)>) -> CurveValues {
        CurveValues::KeyframeVector4(keys.into_iter().map(|(frame, value)| KeyframeVector4 { frame, value }).collect())
    }
}

impl KeyedValue for f32 {
    const FORMAT: AnmCurveFormat = AnmCurveFormat::INT1_FLOAT1;

    fn into_values(keys: Vec<(i32, Self)>) -> CurveValues {
        CurveValues::KeyframeFloat(keys.into_iter().map(|(frame, value)| KeyframeFloat { frame, value }).collect())
    }
}


/// Samples keyed by frame key, in insertion order. Inserting an existing
/// key replaces its value in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframes<T> {
    keys: Vec<(i32, T)>,
    positions: HashMap<i32, usize>,
}

impl<T: KeyedValue> Keyframes<T> {
    pub fn new() -> Keyframes<T> {
        Keyframes { keys: Vec::new(), positions: HashMap::new() }
    }

    pub fn insert(&mut self, key: i32, value: T) {
        match self.positions.get(&key) {
            Some(&position) => self.keys[position].1 = value,
            None => {
                self.positions.insert(key, self.keys.len());
                self.keys.push((key, value));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn last(&self) -> Option<T> {
        self.keys.last().map(|(_, value)| *value)
    }

    /// Keyed curve closed by the null key.
    pub fn into_curve(self) -> Curve {
        let mut curve = Curve::new(T::FORMAT, T::into_values(self.keys));
        curve.append_null_keyframe();
        curve
    }
}

impl<T: KeyedValue> Default for Keyframes<T> {
    fn default() -> Self {
        Keyframes::new()
    }
}

impl<T: KeyedValue> FromIterator<(i32, T)> for Keyframes<T> {
    fn from_iter<I: IntoIterator<Item = (i32, T)>>(iter: I) -> Self {
        let mut keyframes = Keyframes::new();
        for (key, value) in iter {
            keyframes.insert(key, value);
        }
        keyframes
    }
}

/// Keys samples taken at consecutive frames by their frame number.
pub fn keyed_by_frame<T: KeyedValue>(frames: &[i32], values: Vec<T>) -> Result<Keyframes<T>, ExportError> {
    frames
        .iter()
        .zip(values)
        .map(|(&frame, value)| Ok((frame_key(frame)?, value)))
        .collect()
}


/// Collects an entry's curves, keeping each header in step with its curve.
#[derive(Debug)]
pub struct EntryBuilder {
    name: String,
    coord: AnmCoord,
    entry_format: AnmEntryFormat,
    curve_headers: Vec<CurveHeader>,
    curves: Vec<Curve>,
}

impl EntryBuilder {
    pub fn new(name: impl Into<String>, coord: AnmCoord, entry_format: AnmEntryFormat) -> EntryBuilder {
        EntryBuilder {
            name: name.into(),
            coord,
            entry_format,
            curve_headers: Vec::new(),
            curves: Vec::new(),
        }
    }

    pub fn add_curve(&mut self, curve_index: u16, curve: Curve) -> Result<(), ExportError> {
        let header = CurveHeader::describe(curve_index, &curve).ok_or_else(|| ExportError::CurveTooLarge {
            entry: self.name.clone(),
            curve_index,
            frames: curve.frame_count(),
            bytes: curve.byte_size(),
        })?;

        self.curve_headers.push(header);
        self.curves.push(curve);
        Ok(())
    }

    pub fn curve_count(&self) -> usize {
        self.curves.len()
    }

    pub fn build(self) -> AnmEntry {
        AnmEntry {
            coord: self.coord,
            entry_format: self.entry_format,
            curve_headers: self.curve_headers,
            curves: self.curves,
        }
    }
}


/// A skeleton's place in the chunk, shared by its bone and material entries.
#[derive(Debug, Clone, Copy)]
pub struct ClumpContext<'a> {
    pub skeleton: &'a AnimatedSkeleton<'a>,
    pub clump_index: usize,
    pub clump: &'a AnmClump,
    pub table: &'a IndexTable,
}

impl<'a> ClumpContext<'a> {
    /// Coord of a bone or material: its position within the clump's bone/material list.
    pub fn coord(&self, name: &str, kind: ChunkKind) -> Result<AnmCoord, ExportError> {
        let index = self.table.resolve_in(self.skeleton, name, kind)?;
        let position = self
            .clump
            .bone_material_indices
            .iter()
            .position(|&bone_material| bone_material == index)
            .ok_or_else(|| ExportError::Unresolved { name: name.to_string(), kind })?;

        anm_coord(self.clump_index, position)
    }
}


/// Keyed centimeter positions, or a single unkeyed position for a still target.
pub fn position_curve(frames: &[i32], positions: &[Vec3]) -> Result<Curve, ExportError> {
    let positions: Vec<Vector3> = positions.iter().map(|&position| pos_m_to_cm(position).into()).collect();

    if positions.len() > 1 {
        Ok(keyed_by_frame(frames, positions)?.into_curve())
    } else {
        Ok(Curve::new(AnmCurveFormat::FLOAT3, CurveValues::Vector3(positions)))
    }
}

/// Compressed quaternions per frame, or engine Euler degrees for a single sample.
pub fn rotation_curve(rotations: &[Quat]) -> Curve {
    if rotations.len() > 1 {
        Curve::new(
            AnmCurveFormat::SHORT4,
            CurveValues::QuaternionShort(rotations.iter().map(|&rotation| compress_quat(rotation)).collect()),
        )
    } else {
        Curve::new(
            AnmCurveFormat::FLOAT3ALT,
            CurveValues::Vector3(rotations.iter().map(|rotation| rot_to_engine_euler(rotation.inverse())).collect()),
        )
    }
}

/// Keyed floats per frame, or the single value unkeyed.
pub fn scalar_curve(frames: &[i32], values: Vec<f32>) -> Result<Curve, ExportError> {
    if values.len() > 1 {
        Ok(keyed_by_frame(frames, values)?.into_curve())
    } else {
        Ok(Curve::new(AnmCurveFormat::FLOAT1, CurveValues::Float(values)))
    }
}


/// Seeks each frame in turn and reads what is needed from it before moving on.
pub fn sample_frames<S, T, F>(sampler: &mut S, frames: &[i32], mut read: F) -> Result<Vec<T>, ExportError>
where
    S: FrameSampler + ?Sized,
    F: FnMut(&SampledState, i32) -> Result<T, ExportError>,
{
    let mut values = Vec::with_capacity(frames.len());
    for &frame in frames {
        let state = sampler.seek(frame)?;
        values.push(read(state, frame)?);
    }
    Ok(values)
}
