use std::fmt;
use hashbrown::HashMap;

use crate::error::ExportError;
use crate::skeleton::AnimatedSkeleton;


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkKind {
    Clump,
    Coord,
    Material,
    Model,
}

impl ChunkKind {
    pub fn chunk_type(self) -> &'static str {
        match self {
            ChunkKind::Clump => "nuccChunkClump",
            ChunkKind::Coord => "nuccChunkCoord",
            ChunkKind::Material => "nuccChunkMaterial",
            ChunkKind::Model => "nuccChunkModel",
        }
    }
}

impl fmt::Display for ChunkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.chunk_type())
    }
}


/// Global chunk addressing shared by every clump of one export.
///
/// The position of a `(name, kind)` pair in the table is the index clumps
/// and entries refer to it by. Built once from the animated skeletons and
/// read-only afterwards.
///
/// Names are unique across the table, except that an extra clump repeats
/// the names of the skeleton it re-binds. Each skeleton therefore resolves
/// its own names through [`IndexTable::resolve_in`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexTable {
    entries: Vec<(String, ChunkKind)>,
    lookup: HashMap<(String, ChunkKind), u32>,
    scopes: HashMap<String, HashMap<(String, ChunkKind), u32>>,
}

impl IndexTable {
    /// Per skeleton: its clump, its bones, its materials, then its models.
    pub fn build(skeletons: &[AnimatedSkeleton]) -> Result<IndexTable, ExportError> {
        let mut table = IndexTable::default();

        for skeleton in skeletons {
            let mut scope = HashMap::new();
            let shared = !skeleton.is_extra_clump();

            table.push(&mut scope, shared, skeleton.primary_name()?, ChunkKind::Clump)?;

            for bone in skeleton.bones() {
                table.push(&mut scope, shared, &bone.name, ChunkKind::Coord)?;
            }
            for material in skeleton.materials() {
                table.push(&mut scope, shared, material, ChunkKind::Material)?;
            }
            for model in skeleton.models() {
                table.push(&mut scope, shared, model, ChunkKind::Model)?;
            }

            table.scopes.insert(skeleton.object_name().to_string(), scope);
        }

        Ok(table)
    }

    fn push(
        &mut self,
        scope: &mut HashMap<(String, ChunkKind), u32>,
        shared: bool,
        name: &str,
        kind: ChunkKind,
    ) -> Result<(), ExportError> {
        let key = (name.to_string(), kind);
        if scope.contains_key(&key) || (shared && self.lookup.contains_key(&key)) {
            return Err(ExportError::DuplicateReference { name: key.0, kind });
        }

        let index = self.entries.len() as u32;
        if shared {
            self.lookup.insert(key.clone(), index);
        }
        scope.insert(key.clone(), index);
        self.entries.push(key);
        Ok(())
    }

    /// Index of a name registered by a regular skeleton.
    pub fn resolve(&self, name: &str, kind: ChunkKind) -> Result<u32, ExportError> {
        self.lookup
            .get(&(name.to_string(), kind))
            .copied()
            .ok_or_else(|| ExportError::Unresolved { name: name.to_string(), kind })
    }

    /// Index of a name as registered by `skeleton` itself.
    pub fn resolve_in(&self, skeleton: &AnimatedSkeleton, name: &str, kind: ChunkKind) -> Result<u32, ExportError> {
        self.scopes
            .get(skeleton.object_name())
            .and_then(|scope| scope.get(&(name.to_string(), kind)))
            .copied()
            .ok_or_else(|| ExportError::Unresolved { name: name.to_string(), kind })
    }

    pub fn get(&self, index: u32) -> Option<(&str, ChunkKind)> {
        self.entries.get(index as usize).map(|(name, kind)| (name.as_str(), *kind))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ChunkKind)> {
        self.entries.iter().map(|(name, kind)| (name.as_str(), *kind))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::fixtures::*;
    use crate::scene::{RenderObject, Scene};

    fn scene() -> Scene {
        Scene {
            frame_end: 10,
            skeletons: vec![
                skeleton(
                    "1nrt [C]",
                    vec![bone("pelvis", None), bone("hip", Some("pelvis")), bone("hip_lod", Some("pelvis"))],
                    &["1nrtbod1"],
                    vec![],
                ),
                two_bone_skeleton("2sik"),
            ],
            objects: vec![RenderObject {
                name: "body".to_string(),
                parent: Some("1nrtbod1".to_string()),
                material_slots: vec!["skin".to_string(), "cloth".to_string()],
                mesh_bone: None,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn table_layout_follows_skeleton_order() {
        let scene = scene();
        let skeletons = AnimatedSkeleton::collect(&scene).unwrap();
        let table = IndexTable::build(&skeletons).unwrap();

        let entries: Vec<_> = table.iter().collect();
        assert_eq!(
            entries,
            vec![
                ("1nrtbod1", ChunkKind::Clump),
                ("pelvis", ChunkKind::Coord),
                ("hip", ChunkKind::Coord),
                ("cloth", ChunkKind::Material),
                ("skin", ChunkKind::Material),
                ("1nrtbod1", ChunkKind::Model),
                ("root", ChunkKind::Clump),
                ("root", ChunkKind::Coord),
                ("child", ChunkKind::Coord),
            ]
        );
    }

    #[test]
    fn rebuilding_gives_identical_indices() {
        let scene = scene();
        let skeletons = AnimatedSkeleton::collect(&scene).unwrap();

        let first = IndexTable::build(&skeletons).unwrap();
        let second = IndexTable::build(&skeletons).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.resolve("hip", ChunkKind::Coord).unwrap(), 2);
        assert_eq!(first.get(5), Some(("1nrtbod1", ChunkKind::Model)));
    }

    #[test]
    fn same_name_in_two_skeletons_is_a_duplicate() {
        let scene = Scene {
            frame_end: 10,
            skeletons: vec![two_bone_skeleton("a"), two_bone_skeleton("b")],
            ..Default::default()
        };
        let skeletons = AnimatedSkeleton::collect(&scene).unwrap();

        let error = IndexTable::build(&skeletons).unwrap_err();
        assert!(matches!(error, ExportError::DuplicateReference { kind: ChunkKind::Clump, .. }));
    }

    #[test]
    fn extra_clump_repeats_base_names_in_its_own_scope() {
        let scene = Scene {
            frame_end: 10,
            skeletons: vec![two_bone_skeleton("rig [C]"), two_bone_skeleton("rig [C]_extra_clump")],
            ..Default::default()
        };
        let skeletons = AnimatedSkeleton::collect(&scene).unwrap();
        let table = IndexTable::build(&skeletons).unwrap();

        assert_eq!(table.len(), 6);
        assert_eq!(table.resolve("child", ChunkKind::Coord).unwrap(), 2);
        assert_eq!(table.resolve_in(&skeletons[0], "child", ChunkKind::Coord).unwrap(), 2);
        assert_eq!(table.resolve_in(&skeletons[1], "child", ChunkKind::Coord).unwrap(), 5);
        assert_eq!(table.resolve_in(&skeletons[1], "root", ChunkKind::Clump).unwrap(), 3);
    }

    #[test]
    fn repeated_name_within_one_skeleton_is_a_duplicate() {
        let scene = Scene {
            frame_end: 10,
            skeletons: vec![skeleton(
                "rig [C]_extra_clump",
                vec![bone("root", None), bone("root", None)],
                &[],
                vec![],
            )],
            ..Default::default()
        };
        let skeletons = AnimatedSkeleton::collect(&scene).unwrap();

        assert!(matches!(
            IndexTable::build(&skeletons),
            Err(ExportError::DuplicateReference { kind: ChunkKind::Coord, .. })
        ));
    }

    #[test]
    fn unknown_names_do_not_resolve() {
        let table = IndexTable::default();
        assert!(matches!(
            table.resolve("ghost", ChunkKind::Material),
            Err(ExportError::Unresolved { kind: ChunkKind::Material, .. })
        ));
    }
}
