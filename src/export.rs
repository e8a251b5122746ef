use std::fs;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};

use crate::build_page::{build_anm_page, PageContents, CAMERA_NAME};
use crate::clump::{build_coord_parents, make_clumps};
use crate::convert::bone::make_entry_bone;
use crate::convert::camera::make_entry_camera;
use crate::convert::light::{light_chunk, make_entry_light};
use crate::convert::material::make_entry_material;
use crate::convert::ClumpContext;
use crate::coordinate::FRAME_UNIT;
use crate::error::ExportError;
use crate::mapping::IndexTable;
use crate::optimize::optimize_entry;
use crate::scene::{FrameSampler, Scene};
use crate::settings::ExportSettings;
use crate::skeleton::AnimatedSkeleton;
use crate::structure::anm::{AnmEntry, NuccAnm};
use crate::structure::other::{LightChunk, NuccCamera};
use crate::structure::page::Page;
use crate::structure::to_be_bytes;


/// A light parameter chunk and the name it is listed under.
#[derive(Debug, Clone, PartialEq)]
pub struct LightFile {
    pub name: String,
    pub chunk: LightChunk,
}

impl LightFile {
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, self.chunk.extension())
    }
}

/// Everything one export writes to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct AnmExport {
    /// Clip name, taken from the first skeleton's action.
    pub name: String,
    pub anm: NuccAnm,
    pub camera: Option<NuccCamera>,
    pub lights: Vec<LightFile>,
    pub page: Page,
}

impl AnmExport {
    /// The animation chunk, big-endian.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ExportError> {
        Ok(to_be_bytes(&self.anm)?)
    }

    /// Directory the chunks are written to, named after the clip.
    pub fn directory_name(&self) -> String {
        format!("[000] {} (nuccChunkAnm)", self.name)
    }

    /// Writes the animation, camera and light chunks and `_page.json` under `out_dir`.
    pub fn write_to_dir(&self, out_dir: &Path) -> Result<PathBuf, ExportError> {
        let anm = self.to_bytes()?;
        let camera = self.camera.as_ref().map(to_be_bytes).transpose()?;
        let lights = self
            .lights
            .iter()
            .map(|light| Ok((light.file_name(), light.chunk.to_bytes()?)))
            .collect::<Result<Vec<_>, ExportError>>()?;
        let page = self.page.to_json_string()?;

        let dir = out_dir.join(self.directory_name());
        fs::create_dir_all(&dir)?;

        fs::write(dir.join(format!("{}.anm", self.name)), anm)?;
        if let Some(camera) = camera {
            fs::write(dir.join(format!("{}.camera", CAMERA_NAME)), camera)?;
        }
        for (file_name, bytes) in lights {
            fs::write(dir.join(file_name), bytes)?;
        }
        fs::write(dir.join("_page.json"), page)?;

        info!("wrote {}", dir.display());
        Ok(dir)
    }
}


fn progress_bar(len: u64, show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::with_template("encoding entries...  {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}") {
        pb.set_style(style.progress_chars("||-"));
    }
    pb
}

fn header_count(what: &'static str, count: usize) -> Result<u16, ExportError> {
    u16::try_from(count).map_err(|_| ExportError::CountOverflow { what, count })
}


/// Encodes every animated skeleton, the camera and the lights of `scene` into
/// one animation chunk. Nothing is written; see [`AnmExport::write_to_dir`].
pub fn export<S: FrameSampler + ?Sized>(
    scene: &Scene,
    sampler: &mut S,
    settings: &ExportSettings,
) -> Result<AnmExport, ExportError> {
    let skeletons = AnimatedSkeleton::collect(scene)?;
    let first = skeletons.first().ok_or(ExportError::NoAnimatedSkeletons)?;
    let name = first.action().name.clone();

    let table = IndexTable::build(&skeletons)?;
    let clumps = make_clumps(&skeletons, &table)?;
    let coord_parents = build_coord_parents(&skeletons)?;
    info!(
        "{}: {} skeletons, {} indexed chunks, {} coord pairs",
        name,
        skeletons.len(),
        table.len(),
        coord_parents.len()
    );

    let camera = scene.camera.as_ref().filter(|camera| camera.animation_data);

    let work = skeletons
        .iter()
        .map(|skeleton| {
            skeleton.action().groups.len() + if settings.export_materials { skeleton.materials().len() } else { 0 }
        })
        .sum::<usize>()
        + usize::from(camera.is_some())
        + scene.lights.len();
    let pb = progress_bar(work as u64, settings.show_progress);

    let finish = |entry: AnmEntry| if settings.optimize { optimize_entry(entry) } else { entry };
    let mut entries: Vec<AnmEntry> = Vec::new();

    for (clump_index, (skeleton, clump)) in skeletons.iter().zip(&clumps).enumerate() {
        let context = ClumpContext { skeleton, clump_index, clump, table: &table };

        for group in &skeleton.action().groups {
            pb.inc(1);
            let Some(bone) = skeleton.bone_index(&group.name).and_then(|index| skeleton.bones().get(index)) else {
                debug!("{}: group '{}' is not an exported bone", skeleton.name(), group.name);
                continue;
            };

            let entry = make_entry_bone(scene, &context, bone, group, sampler, settings.optimize)?;
            entries.push(finish(entry));
        }

        if settings.export_materials {
            for material in skeleton.materials() {
                pb.inc(1);
                let entry = make_entry_material(scene, &context, material, sampler)?;
                entries.push(finish(entry));
            }
        }
    }

    let mut other_entries = 0;

    let camera_chunk = match camera {
        Some(camera) => {
            pb.inc(1);
            entries.push(finish(make_entry_camera(scene, camera, sampler)?));
            other_entries += 1;
            Some(NuccCamera::default())
        }
        None => None,
    };

    let mut lights = Vec::new();
    for (light_index, light) in scene.lights.iter().enumerate() {
        pb.inc(1);
        let Some(entry) = make_entry_light(scene, light, light_index, sampler)? else {
            warn!("{}: {:?} lights are not exported", light.name, light.kind);
            continue;
        };
        entries.push(finish(entry));
        other_entries += 1;

        if let Some(chunk) = light_chunk(light.kind) {
            lights.push(LightFile { name: format!("{}{:02}", light.name, light_index + 1), chunk });
        }
    }

    pb.finish_and_clear();

    header_count("entry", entries.len())?;
    header_count("clump", clumps.len())?;
    let other_entry_count = header_count("other entry", other_entries)?;
    let frame_end = scene.frame_end.max(0) as usize;
    let anm_length = u32::try_from(frame_end * FRAME_UNIT as usize)
        .map_err(|_| ExportError::CountOverflow { what: "frame", count: frame_end })?;

    let anm = NuccAnm {
        anm_length,
        frame_size: FRAME_UNIT as u32,
        looped: settings.looped,
        other_entry_count,
        clumps,
        coord_parents,
        entries,
    };
    info!("{}: {} entries, {} other", name, anm.entry_count(), other_entry_count);

    let page = build_anm_page(&PageContents {
        clip_name: &name,
        skeletons: &skeletons,
        has_camera: camera_chunk.is_some(),
        lights: &lights,
        anm_chunk_path: settings.anm_chunk_path.as_deref(),
    })?;

    Ok(AnmExport { name, anm, camera: camera_chunk, lights, page })
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::fixtures::*;
    use crate::scene::{Camera, CameraState, Light, LightKind, LightState, RecordedFrames};
    use crate::structure::anm::AnmEntryFormat;

    fn scene() -> Scene {
        Scene { frame_end: 11, skeletons: vec![two_bone_skeleton("rig")], ..Default::default() }
    }

    #[test]
    fn bone_entries_follow_action_groups() {
        let scene = scene();
        let export = export(&scene, &mut still_frames(&scene, 11), &ExportSettings::default()).unwrap();

        assert_eq!(export.name, "rig_action");
        assert_eq!(export.anm.anm_length, 1100);
        assert_eq!(export.anm.frame_size, 100);
        assert_eq!(export.anm.clump_count(), 1);
        assert_eq!(export.anm.coord_count(), 1);
        assert_eq!(export.anm.other_entry_count, 0);
        assert!(export.anm.entries.iter().all(|entry| entry.entry_format == AnmEntryFormat::BONE));
        assert_eq!(export.anm.entry_count(), 2);
    }

    #[test]
    fn extra_clump_exports_beside_its_base() {
        let scene = Scene {
            frame_end: 11,
            skeletons: vec![two_bone_skeleton("rig [C]"), two_bone_skeleton("rig [C]_extra_clump")],
            ..Default::default()
        };
        let export = export(&scene, &mut still_frames(&scene, 11), &ExportSettings::default()).unwrap();

        assert_eq!(export.anm.clump_count(), 2);
        assert_eq!(export.anm.clumps[1].clump_index, 3);
        assert_eq!(export.anm.entry_count(), 4);
        assert_eq!(export.anm.entries[2].coord.clump_index, 1);

        assert_eq!(export.page.chunk_references.len(), 6);
        assert_eq!(export.page.chunk_references[4].chunk.name, "root");
        assert!(!export.page.chunk_maps.iter().any(|chunk| chunk.name.contains("extra_clump")));
    }

    #[test]
    fn no_animated_skeletons() {
        let scene = Scene { frame_end: 10, ..Default::default() };
        let error = export(&scene, &mut RecordedFrames::default(), &ExportSettings::default()).unwrap_err();

        assert!(matches!(error, ExportError::NoAnimatedSkeletons));
    }

    #[test]
    fn camera_and_lights_are_other_entries() {
        let mut scene = scene();
        scene.camera = Some(Camera { name: "camera".to_string(), animation_data: true, keyframes: vec![] });
        scene.lights = vec![
            Light { name: "spot".to_string(), kind: LightKind::Spot, keyframes: vec![] },
            Light { name: "sun".to_string(), kind: LightKind::Sun, keyframes: vec![] },
        ];

        let mut frames = still_frames(&scene, 1);
        let mut state = frames.seek(0).unwrap().clone();
        state.camera = Some(CameraState { translation: [0.0; 3], rotation: [0.0, 0.0, 0.0, 1.0], fov: 30.0 });
        state.lights.insert(
            "sun".to_string(),
            LightState {
                color: [1.0; 3],
                strength: 1.0,
                translation: [0.0; 3],
                rotation: [0.0, 0.0, 0.0, 1.0],
                size: 0.0,
                size_2: 0.0,
            },
        );

        let export = export(&scene, &mut RecordedFrames::new(vec![state]), &ExportSettings::default()).unwrap();

        assert_eq!(export.anm.other_entry_count, 2);
        assert_eq!(export.camera.as_ref().map(|camera| camera.fov), Some(45.0));
        assert_eq!(export.lights.len(), 1);
        assert_eq!(export.lights[0].file_name(), "sun02.lightdirc");

        let sun = export.anm.entries.last().unwrap();
        assert_eq!(sun.entry_format, AnmEntryFormat::LIGHTDIRC);
        assert_eq!(sun.coord.coord_index, 1);
    }
}
