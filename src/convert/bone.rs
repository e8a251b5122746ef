use glam::{Quat, Vec3};
use hashbrown::HashSet;
use log::{debug, warn};

use crate::convert::{keyed_by_frame, sample_frames, ClumpContext, EntryBuilder, Keyframes};
use crate::coordinate::{
    compress_quat_components, frame_key, pos_m_to_cm, rot_from_euler, rot_from_wxyz, ChannelPath, RestPose,
};
use crate::error::ExportError;
use crate::mapping::ChunkKind;
use crate::optimize::redundant_frames;
use crate::scene::{Bone, ChannelGroup, FCurve, FrameSampler, ObjectState, SampledState, Scene};
use crate::structure::anm::{AnmEntry, AnmEntryFormat};
use crate::structure::anm_utils::{Vector3, Vector4};

/// Curve index of the render visibility curve every bone entry carries.
const VISIBILITY_CURVE: u16 = 3;


/// Channels of one path, ordered by array index.
#[derive(Debug)]
struct ChannelSet<'a> {
    path: ChannelPath,
    channels: Vec<&'a FCurve>,
}

impl<'a> ChannelSet<'a> {
    /// Integer keyframe times of the first component.
    fn frames(&self) -> Vec<i32> {
        self.channels.first().map(|channel| channel.keyframe_frames()).unwrap_or_default()
    }

    fn evaluate(&self, frame: i32) -> Vec<f32> {
        self.channels.iter().map(|channel| channel.evaluate(frame as f32)).collect()
    }
}

/// Splits a channel group into per-path sets in first-appearance order.
fn channel_sets<'a>(bone: &str, group: &'a ChannelGroup) -> Result<Vec<ChannelSet<'a>>, ExportError> {
    let mut sets: Vec<ChannelSet> = Vec::new();

    for channel in &group.channels {
        let path = ChannelPath::parse(channel.channel_name()).ok_or_else(|| ExportError::UnsupportedChannel {
            bone: bone.to_string(),
            path: channel.data_path.clone(),
        })?;

        match sets.iter_mut().find(|set| set.path == path) {
            Some(set) => set.channels.push(channel),
            None => sets.push(ChannelSet { path, channels: vec![channel] }),
        }
    }

    for set in &mut sets {
        set.channels.sort_by_key(|channel| channel.array_index);

        let complete = set.channels.len() == set.path.width()
            && set.channels.iter().enumerate().all(|(i, channel)| channel.array_index == i);

        if !complete {
            return Err(ExportError::ChannelWidth {
                bone: bone.to_string(),
                path: set.channels[0].channel_name().to_string(),
                expected: set.path.width(),
                found: set.channels.len(),
            });
        }
    }

    Ok(sets)
}

fn object_state(state: &SampledState, name: &str, frame: i32) -> Result<ObjectState, ExportError> {
    state.objects.get(name).copied().ok_or_else(|| ExportError::MissingSample {
        kind: "object",
        name: name.to_string(),
        frame,
    })
}

fn rotation_sample(path: ChannelPath, components: &[f32]) -> Quat {
    match path {
        ChannelPath::RotationQuaternion => rot_from_wxyz(components[0], components[1], components[2], components[3]),
        _ => rot_from_euler(Vec3::new(components[0], components[1], components[2])),
    }
}


/// Encodes the entry of one animated bone.
///
/// Parented bones are stored relative to their rest pose. Bones without a
/// parent carry the skeleton object's world transform at each frame
/// instead, since nothing above them places them in the scene.
pub fn make_entry_bone<S: FrameSampler + ?Sized>(
    scene: &Scene,
    context: &ClumpContext,
    bone: &Bone,
    group: &ChannelGroup,
    sampler: &mut S,
    optimize: bool,
) -> Result<AnmEntry, ExportError> {
    let skeleton = context.skeleton;
    let is_root = bone.parent.is_none();
    let rest = RestPose::from_matrix(skeleton.rest_local(bone));
    let sets = channel_sets(&bone.name, group)?;

    let culled = if optimize { culled_frames(&sets) } else { HashSet::new() };
    if !culled.is_empty() {
        debug!("{}: culling {} still frames", bone.name, culled.len());
    }

    let mut builder = EntryBuilder::new(&bone.name, context.coord(&bone.name, ChunkKind::Coord)?, AnmEntryFormat::BONE);

    for (curve_index, set) in sets.iter().enumerate() {
        let frames: Vec<i32> = set.frames().into_iter().filter(|frame| !culled.contains(frame)).collect();
        if frames.is_empty() {
            warn!("{}: no keyframes on {:?}, skipping curve", bone.name, set.path);
            continue;
        }

        let world = if is_root {
            sample_frames(sampler, &frames, |state, frame| object_state(state, skeleton.object_name(), frame))?
        } else {
            Vec::new()
        };

        let curve = match set.path {
            ChannelPath::Location => frames
                .iter()
                .enumerate()
                .map(|(i, &frame)| {
                    let v = Vec3::from_slice(&set.evaluate(frame));
                    let location = match world.get(i) {
                        Some(world) => pos_m_to_cm(v + world.translation()),
                        None => rest.location(v),
                    };
                    Ok((frame_key(frame)?, Vector3::from(location)))
                })
                .collect::<Result<Keyframes<Vector3>, ExportError>>()?
                .into_curve(),

            ChannelPath::RotationEuler | ChannelPath::RotationQuaternion => frames
                .iter()
                .enumerate()
                .map(|(i, &frame)| {
                    let q = rotation_sample(set.path, &set.evaluate(frame));
                    let rotation = match world.get(i) {
                        Some(world) => {
                            let [x, y, z, w] = compress_quat_components(world.rotation() * q);
                            Vector4 { x, y, z, w }
                        }
                        None => Vector4::from(rest.rotation(q)),
                    };
                    Ok((frame_key(frame)?, rotation))
                })
                .collect::<Result<Keyframes<Vector4>, ExportError>>()?
                .into_curve(),

            ChannelPath::Scale => frames
                .iter()
                .map(|&frame| {
                    let v = Vec3::from_slice(&set.evaluate(frame));
                    Ok((frame_key(frame)?, Vector3::from(rest.scale(v))))
                })
                .collect::<Result<Keyframes<Vector3>, ExportError>>()?
                .into_curve(),
        };

        builder.add_curve(curve_index as u16, curve)?;
    }

    let visibility = visibility_keys(scene, bone, skeleton.object_name(), sampler)?;
    builder.add_curve(VISIBILITY_CURVE, visibility.into_curve())?;

    debug!("{}: {} curves", bone.name, builder.curve_count());
    Ok(builder.build())
}

fn culled_frames(sets: &[ChannelSet]) -> HashSet<i32> {
    let location = sets.iter().find(|set| set.path == ChannelPath::Location);
    let rotation = sets.iter().find(|set| set.path.is_rotation());

    match (location, rotation) {
        (Some(location), Some(rotation)) => redundant_frames(&location.channels, &rotation.channels),
        _ => HashSet::new(),
    }
}

/// Render visibility (1 shown, 0 hidden) of the object a bone drives.
///
/// Root bones follow the skeleton object itself; parented bones follow the
/// object rendered through them and are always visible without one.
fn visibility_keys<S: FrameSampler + ?Sized>(
    scene: &Scene,
    bone: &Bone,
    skeleton_object: &str,
    sampler: &mut S,
) -> Result<Keyframes<f32>, ExportError> {
    let source = match bone.parent {
        None => Some(skeleton_object),
        Some(_) => scene
            .objects
            .iter()
            .find(|object| object.mesh_bone.as_deref() == Some(bone.name.as_str()))
            .map(|object| object.name.as_str()),
    };

    let Some(source) = source else {
        return Ok([(frame_key(0)?, 1.0)].into_iter().collect());
    };

    let frames: Vec<i32> = scene.frame_range().collect();
    let values = sample_frames(sampler, &frames, |state, frame| {
        object_state(state, source, frame).map(|object| if object.hide_render { 0.0 } else { 1.0 })
    })?;

    let mut keys = keyed_by_frame(&frames, values)?;
    if let Some(last) = keys.last() {
        keys.insert(frame_key(scene.frame_end.max(0))?, last);
    }

    Ok(keys)
}
