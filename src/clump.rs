use log::debug;

use crate::error::ExportError;
use crate::mapping::{ChunkKind, IndexTable};
use crate::skeleton::AnimatedSkeleton;
use crate::structure::anm::{AnmClump, AnmCoord, CoordParent};


/// Clump record of one skeleton: its bones then materials, and its models,
/// as positions in the index table.
pub fn make_clump(skeleton: &AnimatedSkeleton, table: &IndexTable) -> Result<AnmClump, ExportError> {
    let bones = skeleton
        .bones()
        .iter()
        .map(|bone| table.resolve_in(skeleton, &bone.name, ChunkKind::Coord));
    let materials = skeleton
        .materials()
        .iter()
        .map(|material| table.resolve_in(skeleton, material, ChunkKind::Material));

    Ok(AnmClump {
        clump_index: table.resolve_in(skeleton, skeleton.primary_name()?, ChunkKind::Clump)?,
        bone_material_indices: bones.chain(materials).collect::<Result<_, _>>()?,
        model_indices: skeleton
            .models()
            .iter()
            .map(|model| table.resolve_in(skeleton, model, ChunkKind::Model))
            .collect::<Result<_, _>>()?,
    })
}

pub fn make_clumps(skeletons: &[AnimatedSkeleton], table: &IndexTable) -> Result<Vec<AnmClump>, ExportError> {
    skeletons.iter().map(|skeleton| make_clump(skeleton, table)).collect()
}

/// Coord addressed by skeleton position and position within that clump.
pub fn anm_coord(clump_index: usize, coord_index: usize) -> Result<AnmCoord, ExportError> {
    Ok(AnmCoord {
        clump_index: i16::try_from(clump_index)
            .map_err(|_| ExportError::CountOverflow { what: "clump", count: clump_index })?,
        coord_index: u16::try_from(coord_index)
            .map_err(|_| ExportError::CountOverflow { what: "coord", count: coord_index })?,
    })
}

/// Parent/child coord pairs of every skeleton: bone hierarchy first, then
/// copy-transform bindings that follow a bone of another animated skeleton.
pub fn build_coord_parents(skeletons: &[AnimatedSkeleton]) -> Result<Vec<CoordParent>, ExportError> {
    let mut coord_parents = Vec::new();

    for (clump_index, skeleton) in skeletons.iter().enumerate() {
        for (coord_index, bone) in skeleton.bones().iter().enumerate() {
            let Some(parent) = bone.parent.as_deref() else { continue };

            let parent_index = skeleton.bone_index(parent).ok_or_else(|| ExportError::Unresolved {
                name: parent.to_string(),
                kind: ChunkKind::Coord,
            })?;

            coord_parents.push(CoordParent {
                parent: anm_coord(clump_index, parent_index)?,
                child: anm_coord(clump_index, coord_index)?,
            });
        }

        for (coord_index, bone) in skeleton.bones().iter().enumerate() {
            let Some(binding) = &bone.copy_transforms else { continue };

            let target = skeletons
                .iter()
                .position(|other| other.object_name() == binding.target)
                .filter(|&target| target != clump_index);

            let Some(target_index) = target else {
                debug!("{}: copy transforms target '{}' is not another animated skeleton", bone.name, binding.target);
                continue;
            };

            let target_bone = skeletons[target_index].bone_index(&binding.subtarget).ok_or_else(|| {
                ExportError::Unresolved { name: binding.subtarget.clone(), kind: ChunkKind::Coord }
            })?;

            coord_parents.push(CoordParent {
                parent: anm_coord(target_index, target_bone)?,
                child: anm_coord(clump_index, coord_index)?,
            });
        }
    }

    Ok(coord_parents)
}
