//! Scene description handed over by the authoring environment.
//!
//! [`Scene`] holds everything that does not change while the clip plays:
//! skeletons, their bone hierarchies and action channels, renderable
//! objects, the camera and the lights. Everything that has to be evaluated
//! per frame is read through a [`FrameSampler`], which moves a single
//! evaluation cursor and hands back the [`SampledState`] at that frame.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::ExportError;


#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub frame_end: i32,
    #[serde(default)]
    pub skeletons: Vec<Skeleton>,
    #[serde(default)]
    pub objects: Vec<RenderObject>,
    #[serde(default)]
    pub camera: Option<Camera>,
    #[serde(default)]
    pub lights: Vec<Light>,
}

impl Scene {
    /// Frames sampled for per-frame curves such as visibility. Never empty.
    pub fn frame_range(&self) -> std::ops::Range<i32> {
        0..self.frame_end.max(1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skeleton {
    /// Object name. A trailing ` [C]` marks an imported clump and is not part of the chunk name.
    pub name: String,
    #[serde(default)]
    pub chunk_path: String,
    #[serde(default = "default_true")]
    pub selected: bool,
    #[serde(default)]
    pub bones: Vec<Bone>,
    /// Model chunk names bound to this skeleton, each also the name of a scene object.
    #[serde(default)]
    pub models: Vec<String>,
    #[serde(default)]
    pub animation_data: Option<AnimationData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bone {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    /// Armature-space rest matrix, rows first.
    #[serde(default = "identity_rows")]
    pub rest_matrix: [[f32; 4]; 4],
    #[serde(default)]
    pub copy_transforms: Option<CopyTransforms>,
}

impl Bone {
    pub fn rest_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.rest_matrix).transpose()
    }
}

/// Binding that makes a bone follow a bone of another skeleton.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CopyTransforms {
    pub target: String,
    pub subtarget: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationData {
    #[serde(default)]
    pub action: Option<Action>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    #[serde(default)]
    pub groups: Vec<ChannelGroup>,
}

/// Channels animating one bone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelGroup {
    pub name: String,
    #[serde(default)]
    pub channels: Vec<FCurve>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FCurve {
    pub data_path: String,
    #[serde(default)]
    pub array_index: usize,
    #[serde(default)]
    pub keyframes: Vec<Keyframe>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub frame: f32,
    pub value: f32,
}

impl FCurve {
    /// Property part of the data path, `location` for `pose.bones["x"].location`.
    pub fn channel_name(&self) -> &str {
        self.data_path.rsplit('.').next().unwrap_or(&self.data_path)
    }

    pub fn keyframe_frames(&self) -> Vec<i32> {
        self.keyframes.iter().map(|key| key.frame as i32).collect()
    }

    /// Linear interpolation between keys, holding the end values outside them.
    pub fn evaluate(&self, frame: f32) -> f32 {
        let keys = &self.keyframes;
        let (first, last) = match (keys.first(), keys.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 0.0,
        };

        if frame <= first.frame {
            return first.value;
        }
        if frame >= last.frame {
            return last.value;
        }

        let next = keys.iter().position(|key| key.frame >= frame).unwrap_or(keys.len() - 1);
        let (a, b) = (keys[next - 1], keys[next]);
        if b.frame == a.frame {
            return b.value;
        }
        let t = (frame - a.frame) / (b.frame - a.frame);
        a.value + (b.value - a.value) * t
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderObject {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub material_slots: Vec<String>,
    /// Bone this object is rendered through.
    #[serde(default)]
    pub mesh_bone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub name: String,
    #[serde(default = "default_true")]
    pub animation_data: bool,
    #[serde(default)]
    pub keyframes: Vec<f32>,
}

impl Camera {
    pub fn sample_frames(&self, frame_end: i32) -> Vec<i32> {
        sample_frames(&self.keyframes, frame_end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LightKind {
    Sun,
    Point,
    Area,
    Spot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub name: String,
    pub kind: LightKind,
    #[serde(default)]
    pub keyframes: Vec<f32>,
}

impl Light {
    pub fn sample_frames(&self, frame_end: i32) -> Vec<i32> {
        sample_frames(&self.keyframes, frame_end)
    }
}

/// Every frame of the clip when animated, otherwise a single sample.
fn sample_frames(keyframes: &[f32], frame_end: i32) -> Vec<i32> {
    if keyframes.len() < 2 {
        vec![keyframes.first().map_or(0, |frame| *frame as i32)]
    } else {
        (0..frame_end.max(1)).collect()
    }
}


/// Evaluated scene at one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampledState {
    #[serde(default)]
    pub objects: BTreeMap<String, ObjectState>,
    #[serde(default)]
    pub materials: BTreeMap<String, MaterialState>,
    #[serde(default)]
    pub camera: Option<CameraState>,
    #[serde(default)]
    pub lights: BTreeMap<String, LightState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectState {
    #[serde(default)]
    pub translation: [f32; 3],
    /// World rotation as x, y, z, w.
    #[serde(default = "identity_quat")]
    pub rotation: [f32; 4],
    #[serde(default)]
    pub hide_render: bool,
}

impl Default for ObjectState {
    fn default() -> Self {
        ObjectState { translation: [0.0; 3], rotation: identity_quat(), hide_render: false }
    }
}

impl ObjectState {
    pub fn translation(&self) -> Vec3 {
        Vec3::from_array(self.translation)
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_array(self.rotation)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialState {
    #[serde(default)]
    pub nodes: BTreeMap<String, ShaderNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ShaderNode {
    Mapping { location: [f32; 3], scale: [f32; 3] },
    Value { value: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    #[serde(default)]
    pub translation: [f32; 3],
    #[serde(default = "identity_quat")]
    pub rotation: [f32; 4],
    pub fov: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightState {
    pub color: [f32; 3],
    pub strength: f32,
    #[serde(default)]
    pub translation: [f32; 3],
    #[serde(default = "identity_quat")]
    pub rotation: [f32; 4],
    #[serde(default)]
    pub size: f32,
    #[serde(default)]
    pub size_2: f32,
}


/// Moves the scene's evaluation cursor.
///
/// Every read of per-frame data goes through [`FrameSampler::seek`]; the
/// returned state borrows the sampler, so all values needed at a frame
/// have to be read before seeking again. Samplers are not meant to be
/// shared between concurrent exports.
pub trait FrameSampler {
    fn seek(&mut self, frame: i32) -> Result<&SampledState, ExportError>;
}

/// Per-frame states captured ahead of time, frame 0 first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordedFrames {
    frames: Vec<SampledState>,
}

impl RecordedFrames {
    pub fn new(frames: Vec<SampledState>) -> RecordedFrames {
        RecordedFrames { frames }
    }
}

impl FrameSampler for RecordedFrames {
    /// Frames past either end of the recording hold the nearest recorded state.
    fn seek(&mut self, frame: i32) -> Result<&SampledState, ExportError> {
        let last = self.frames.len().checked_sub(1).ok_or(ExportError::NoRecordedFrames)?;
        let index = (frame.max(0) as usize).min(last);
        Ok(&self.frames[index])
    }
}

/// JSON form of a scene together with its recorded frames.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDump {
    pub scene: Scene,
    #[serde(default)]
    pub frames: Vec<SampledState>,
}

impl SceneDump {
    pub fn from_json_file(filepath: &Path) -> Result<SceneDump, ExportError> {
        let json = fs::read_to_string(filepath)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn into_parts(self) -> (Scene, RecordedFrames) {
        (self.scene, RecordedFrames::new(self.frames))
    }
}


fn default_true() -> bool {
    true
}

fn identity_rows() -> [[f32; 4]; 4] {
    Mat4::IDENTITY.to_cols_array_2d()
}

fn identity_quat() -> [f32; 4] {
    Quat::IDENTITY.to_array()
}
