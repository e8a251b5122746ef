use glam::{Quat, Vec3};
use log::debug;

use crate::convert::{position_curve, rotation_curve, sample_frames, scalar_curve, EntryBuilder};
use crate::error::ExportError;
use crate::scene::{Camera, CameraState, FrameSampler, Scene};
use crate::structure::anm::{AnmCoord, AnmEntry, AnmEntryFormat};

const POSITION_CURVE: u16 = 0;
const ROTATION_CURVE: u16 = 1;
const FOV_CURVE: u16 = 2;


/// Encodes the scene camera's position, rotation and field of view.
///
/// An animated camera is sampled every frame; a still one is sampled once
/// and written with unkeyed formats, its rotation as Euler angles.
pub fn make_entry_camera<S: FrameSampler + ?Sized>(
    scene: &Scene,
    camera: &Camera,
    sampler: &mut S,
) -> Result<AnmEntry, ExportError> {
    let frames = camera.sample_frames(scene.frame_end);
    let states: Vec<CameraState> = sample_frames(sampler, &frames, |state, frame| {
        state.camera.ok_or_else(|| ExportError::MissingSample { kind: "camera", name: camera.name.clone(), frame })
    })?;

    let positions: Vec<Vec3> = states.iter().map(|state| Vec3::from_array(state.translation)).collect();
    let rotations: Vec<Quat> = states.iter().map(|state| Quat::from_array(state.rotation)).collect();
    let fovs: Vec<f32> = states.iter().map(|state| state.fov).collect();

    let mut builder = EntryBuilder::new(
        &camera.name,
        AnmCoord { clump_index: -1, coord_index: 0 },
        AnmEntryFormat::CAMERA,
    );
    builder.add_curve(POSITION_CURVE, position_curve(&frames, &positions)?)?;
    builder.add_curve(ROTATION_CURVE, rotation_curve(&rotations))?;
    builder.add_curve(FOV_CURVE, scalar_curve(&frames, fovs)?)?;

    debug!("{}: {} samples", camera.name, frames.len());
    Ok(builder.build())
}
