use crate::error::ExportError;
use crate::export::LightFile;
use crate::mapping::ChunkKind;
use crate::skeleton::AnimatedSkeleton;
use crate::structure::page::*;

pub const ANM_CHUNK: &str = "nuccChunkAnm";
pub const CAMERA_CHUNK: &str = "nuccChunkCamera";
pub const CAMERA_NAME: &str = "camera01";


/// Everything the manifest of one export describes.
#[derive(Debug, Clone, Copy)]
pub struct PageContents<'a> {
    pub clip_name: &'a str,
    pub skeletons: &'a [AnimatedSkeleton<'a>],
    pub has_camera: bool,
    pub lights: &'a [LightFile],
    /// Overrides the animation chunk's path.
    pub anm_chunk_path: Option<&'a str>,
}

fn reference(name: &str, kind: ChunkKind, path: &str) -> (Chunk, ChunkReference) {
    let chunk = Chunk::new(name, kind.chunk_type(), path);
    let reference = ChunkReference { name: name.to_string(), chunk: chunk.clone() };
    (chunk, reference)
}

fn file(file_name: String, chunk: &Chunk) -> Files {
    Files { file_name, chunk: chunk.clone() }
}

/// Clump, bone, material and model names of a skeleton, in index table order.
fn chunk_names<'s>(skeleton: &'s AnimatedSkeleton) -> Vec<(&'s str, ChunkKind)> {
    std::iter::once((skeleton.name(), ChunkKind::Clump))
        .chain(skeleton.bones().iter().map(|bone| (bone.name.as_str(), ChunkKind::Coord)))
        .chain(skeleton.materials().iter().map(|material| (material.as_str(), ChunkKind::Material)))
        .chain(skeleton.models().iter().map(|&model| (model, ChunkKind::Model)))
        .collect()
}

/// An extra clump owns no chunks. Each of its names refers to the base
/// skeleton's chunk of the same kind at the same position.
fn push_extra_clump(
    page: &mut Page,
    extra: &AnimatedSkeleton,
    skeletons: &[AnimatedSkeleton],
) -> Result<(), ExportError> {
    let base = extra
        .find_base(skeletons)
        .ok_or_else(|| ExportError::MissingBaseClump(extra.object_name().to_string()))?;
    let mut targets = chunk_names(base);

    for (name, kind) in chunk_names(extra) {
        let position = targets
            .iter()
            .position(|&(_, target_kind)| target_kind == kind)
            .ok_or_else(|| ExportError::Unresolved { name: name.to_string(), kind })?;
        let (target, _) = targets.remove(position);

        page.chunk_references.push(ChunkReference {
            name: name.to_string(),
            chunk: Chunk::new(target, kind.chunk_type(), extra.chunk_path()),
        });
    }

    Ok(())
}

/// Builds `_page.json` for an animation chunk and its camera and light chunks.
pub fn build_anm_page(contents: &PageContents) -> Result<Page, ExportError> {
    let mut page = Page::default();
    page.chunk_maps.push(Chunk::null());

    let first_path = contents.skeletons.first().map_or("", |skeleton| skeleton.chunk_path());

    if contents.has_camera {
        let camera = Chunk::new(CAMERA_NAME, CAMERA_CHUNK, first_path);
        page.files.push(file(format!("{}.camera", CAMERA_NAME), &camera));
        page.chunk_maps.push(camera);
    }

    for light in contents.lights {
        let chunk = Chunk::new(&light.name, light.chunk.chunk_type(), first_path);
        page.files.push(file(light.file_name(), &chunk));
        page.chunk_maps.push(chunk);
    }

    let anm_path = contents.anm_chunk_path.filter(|path| !path.is_empty()).unwrap_or(first_path);
    let anm = Chunk::new(contents.clip_name, ANM_CHUNK, anm_path);
    page.files.push(file(format!("{}.anm", contents.clip_name), &anm));
    page.chunk_maps.push(anm);

    for skeleton in contents.skeletons {
        if skeleton.is_extra_clump() {
            push_extra_clump(&mut page, skeleton, contents.skeletons)?;
            continue;
        }

        for (name, kind) in chunk_names(skeleton) {
            let (chunk, chunk_reference) = reference(name, kind, skeleton.chunk_path());
            page.chunk_maps.push(chunk);
            page.chunk_references.push(chunk_reference);
        }
    }

    page.chunk_maps.push(Chunk::new("Page0", "nuccChunkPage", ""));
    page.chunk_maps.push(Chunk::new("index", "nuccChunkIndex", ""));

    Ok(page)
}
