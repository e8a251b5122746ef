use glam::Mat4;
use hashbrown::HashSet;

use crate::error::ExportError;
use crate::scene::{Action, Bone, Scene, Skeleton};

/// Names containing this marker belong to level-of-detail proxies and are never exported.
const LOD_MARKER: &str = "lod";

/// Suffix the importer appends to clump objects.
const CLUMP_SUFFIX: &str = " [C]";

/// Suffix of a clump object that re-binds another skeleton's chunks under its own names.
const EXTRA_CLUMP_SUFFIX: &str = "_extra_clump";


pub fn is_lod(name: &str) -> bool {
    name.contains(LOD_MARKER)
}

/// A selected skeleton with an action, viewed the way the animation chunk addresses it.
#[derive(Debug, Clone)]
pub struct AnimatedSkeleton<'a> {
    skeleton: &'a Skeleton,
    action: &'a Action,
    bones: Vec<&'a Bone>,
    materials: Vec<String>,
    models: Vec<&'a str>,
}

impl<'a> AnimatedSkeleton<'a> {
    /// Selected skeletons carrying animation data, in scene order.
    pub fn collect(scene: &'a Scene) -> Result<Vec<AnimatedSkeleton<'a>>, ExportError> {
        scene
            .skeletons
            .iter()
            .filter(|skeleton| skeleton.selected && skeleton.animation_data.is_some())
            .map(|skeleton| AnimatedSkeleton::new(scene, skeleton))
            .collect()
    }

    pub fn new(scene: &'a Scene, skeleton: &'a Skeleton) -> Result<AnimatedSkeleton<'a>, ExportError> {
        let action = skeleton
            .animation_data
            .as_ref()
            .and_then(|data| data.action.as_ref())
            .ok_or_else(|| ExportError::MissingAction(skeleton.name.clone()))?;

        let bones = skeleton.bones.iter().filter(|bone| !is_lod(&bone.name)).collect();
        let models = skeleton.models.iter().map(String::as_str).filter(|model| !is_lod(model)).collect();

        Ok(AnimatedSkeleton {
            skeleton,
            action,
            bones,
            materials: collect_materials(scene, skeleton),
            models,
        })
    }

    /// Chunk name of the skeleton, without the clump marker.
    pub fn name(&self) -> &str {
        let name = self.skeleton.name.as_str();
        name.strip_suffix(CLUMP_SUFFIX).unwrap_or(name)
    }

    /// Scene object name, used to sample the skeleton's world transform.
    pub fn object_name(&self) -> &str {
        &self.skeleton.name
    }

    /// Object name of the skeleton whose chunks this extra clump refers to.
    pub fn extra_clump_base(&self) -> Option<&str> {
        self.skeleton.name.strip_suffix(EXTRA_CLUMP_SUFFIX)
    }

    pub fn is_extra_clump(&self) -> bool {
        self.extra_clump_base().is_some()
    }

    /// The base skeleton of an extra clump among `skeletons`.
    pub fn find_base<'s>(&self, skeletons: &'s [AnimatedSkeleton<'a>]) -> Option<&'s AnimatedSkeleton<'a>> {
        let base = self.extra_clump_base()?;
        let base_name = base.strip_suffix(CLUMP_SUFFIX).unwrap_or(base);

        skeletons
            .iter()
            .filter(|skeleton| !skeleton.is_extra_clump())
            .find(|skeleton| skeleton.object_name() == base || skeleton.name() == base_name)
    }

    pub fn chunk_path(&self) -> &str {
        &self.skeleton.chunk_path
    }

    pub fn action(&self) -> &'a Action {
        self.action
    }

    pub fn bones(&self) -> &[&'a Bone] {
        &self.bones
    }

    pub fn materials(&self) -> &[String] {
        &self.materials
    }

    pub fn models(&self) -> &[&'a str] {
        &self.models
    }

    /// Name the clump is registered under: the first model, or the first bone for model-less rigs.
    pub fn primary_name(&self) -> Result<&str, ExportError> {
        self.models
            .first()
            .copied()
            .or_else(|| self.bones.first().map(|bone| bone.name.as_str()))
            .ok_or_else(|| ExportError::EmptySkeleton(self.skeleton.name.clone()))
    }

    pub fn bone(&self, name: &str) -> Option<&'a Bone> {
        self.skeleton.bones.iter().find(|bone| bone.name == name)
    }

    /// Position of a bone among the exported (non-LOD) bones.
    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|bone| bone.name == name)
    }

    /// Rest transform of `bone` relative to its parent's rest transform.
    pub fn rest_local(&self, bone: &Bone) -> Mat4 {
        let parent = bone
            .parent
            .as_deref()
            .and_then(|parent| self.bone(parent))
            .map_or(Mat4::IDENTITY, Bone::rest_matrix);

        parent.inverse() * bone.rest_matrix()
    }
}

/// Materials of every object parented to one of the skeleton's models,
/// deduplicated, LOD materials dropped, sorted by name.
fn collect_materials(scene: &Scene, skeleton: &Skeleton) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut materials: Vec<String> = scene
        .objects
        .iter()
        .filter(|object| {
            object
                .parent
                .as_ref()
                .map_or(false, |parent| skeleton.models.contains(parent))
        })
        .flat_map(|object| object.material_slots.iter())
        .filter(|&material| !is_lod(material) && seen.insert(material.as_str()))
        .cloned()
        .collect();

    materials.sort();
    materials
}
