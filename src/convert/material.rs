use log::debug;

use crate::convert::{keyed_by_frame, sample_frames, ClumpContext, EntryBuilder};
use crate::error::ExportError;
use crate::mapping::ChunkKind;
use crate::scene::{FrameSampler, MaterialState, Scene, ShaderNode};
use crate::structure::anm::{AnmCurveFormat, AnmEntry, AnmEntryFormat, Curve, CurveValues};

/// Curve slot of the cel shading parameter, written constant on every material.
const CEL_SHADE_CURVE: u16 = 4;


/// Shading parameters of a material at one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
struct MaterialSample {
    uv1_offset: [f32; 2],
    uv1_scale: [f32; 2],
    uv2_offset: [f32; 2],
    uv2_scale: [f32; 2],
    blend: f32,
    glare: f32,
    alpha: f32,
}

impl Default for MaterialSample {
    fn default() -> Self {
        MaterialSample {
            uv1_offset: [0.0, 0.0],
            uv1_scale: [1.0, 1.0],
            uv2_offset: [0.0, 0.0],
            uv2_scale: [1.0, 1.0],
            blend: 0.0,
            glare: 0.12,
            alpha: 205.0,
        }
    }
}

impl MaterialSample {
    fn from_state(state: &MaterialState) -> MaterialSample {
        let mut sample = MaterialSample::default();

        let uv1 = state.nodes.get("Mapping").or_else(|| state.nodes.get("UV_0_Mapping"));
        if let Some(ShaderNode::Mapping { location, scale }) = uv1 {
            sample.uv1_offset = [location[0], location[1]];
            sample.uv1_scale = [scale[0], scale[1]];
        }
        if let Some(ShaderNode::Mapping { location, scale }) = state.nodes.get("UV_1_Mapping") {
            sample.uv2_offset = [location[0], location[1]];
            sample.uv2_scale = [scale[0], scale[1]];
        }

        let value = |name: &str| match state.nodes.get(name) {
            Some(ShaderNode::Value { value }) => Some(*value),
            _ => None,
        };
        sample.blend = value("BlendRate").unwrap_or(sample.blend);
        sample.glare = value("Glare").unwrap_or(sample.glare);
        sample.alpha = value("Alpha").unwrap_or(sample.alpha);

        sample
    }

    /// V offsets are measured from the opposite edge of the texture.
    fn flip_v(offset: f32, scale: f32) -> f32 {
        1.0 - scale - offset
    }

    /// Each parameter paired with the curve slot it is written to.
    fn channels(&self) -> [(u16, f32); 11] {
        [
            (0, self.uv1_offset[0]),
            (1, Self::flip_v(self.uv1_offset[1], self.uv1_scale[1])),
            (8, self.uv1_scale[0]),
            (9, self.uv1_scale[1]),
            (2, self.uv2_offset[0]),
            (3, Self::flip_v(self.uv2_offset[1], self.uv2_scale[1])),
            (10, self.uv2_scale[0]),
            (11, self.uv2_scale[1]),
            (12, self.blend),
            (15, self.glare),
            (16, self.alpha),
        ]
    }
}


/// Encodes the UV scroll and shading curves of one material, sampled every frame.
pub fn make_entry_material<S: FrameSampler + ?Sized>(
    scene: &Scene,
    context: &ClumpContext,
    material: &str,
    sampler: &mut S,
) -> Result<AnmEntry, ExportError> {
    let frames: Vec<i32> = scene.frame_range().collect();
    let samples = sample_frames(sampler, &frames, |state, frame| {
        state
            .materials
            .get(material)
            .map(MaterialSample::from_state)
            .ok_or_else(|| ExportError::MissingSample { kind: "material", name: material.to_string(), frame })
    })?;

    let mut builder = EntryBuilder::new(material, context.coord(material, ChunkKind::Material)?, AnmEntryFormat::MATERIAL);

    for (slot, (curve_index, _)) in MaterialSample::default().channels().into_iter().enumerate() {
        let values: Vec<f32> = samples.iter().map(|sample| sample.channels()[slot].1).collect();
        builder.add_curve(curve_index, keyed_by_frame(&frames, values)?.into_curve())?;
    }

    builder.add_curve(CEL_SHADE_CURVE, Curve::new(AnmCurveFormat::FLOAT1, CurveValues::Float(vec![0.0])))?;

    debug!("{}: {} frames", material, frames.len());
    Ok(builder.build())
}


#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::clump::make_clump;
    use crate::mapping::IndexTable;
    use crate::scene::fixtures::*;
    use crate::scene::{RecordedFrames, RenderObject, SampledState};
    use crate::skeleton::AnimatedSkeleton;
    use crate::structure::anm_utils::KeyframeFloat;

    fn scene() -> Scene {
        Scene {
            frame_end: 2,
            skeletons: vec![skeleton("rig", vec![bone("root", None)], &["body_mdl"], vec![])],
            objects: vec![RenderObject {
                name: "body".to_string(),
                parent: Some("body_mdl".to_string()),
                material_slots: vec!["water".to_string()],
                mesh_bone: None,
            }],
            ..Default::default()
        }
    }

    fn frame(nodes: &[(&str, ShaderNode)]) -> SampledState {
        let mut state = SampledState::default();
        let nodes: BTreeMap<_, _> = nodes.iter().map(|(name, node)| (name.to_string(), *node)).collect();
        state.materials.insert("water".to_string(), MaterialState { nodes });
        state
    }

    fn encode(scene: &Scene, frames: Vec<SampledState>) -> Result<AnmEntry, ExportError> {
        let skeletons = AnimatedSkeleton::collect(scene)?;
        let table = IndexTable::build(&skeletons)?;
        let clump = make_clump(&skeletons[0], &table)?;
        let context = ClumpContext { skeleton: &skeletons[0], clump_index: 0, clump: &clump, table: &table };

        make_entry_material(scene, &context, "water", &mut RecordedFrames::new(frames))
    }

    #[test]
    fn material_curves_use_fixed_slots() {
        let entry = encode(&scene(), vec![frame(&[])]).unwrap();

        let slots: Vec<_> = entry.curve_headers.iter().map(|header| header.curve_index).collect();
        assert_eq!(slots, vec![0, 1, 8, 9, 2, 3, 10, 11, 12, 15, 16, 4]);
        assert_eq!(entry.coord.coord_index, 1);
        assert_eq!(entry.entry_format, AnmEntryFormat::MATERIAL);

        let cel = entry.curve_headers.last().unwrap();
        assert_eq!((cel.curve_format, cel.frame_count), (AnmCurveFormat::FLOAT1, 1));
    }

    #[test]
    fn uv_scroll_is_sampled_each_frame() {
        let scroll = |u: f32| ShaderNode::Mapping { location: [u, 0.25, 0.0], scale: [1.0, 0.5, 1.0] };
        let entry = encode(
            &scene(),
            vec![frame(&[("UV_0_Mapping", scroll(0.0))]), frame(&[("UV_0_Mapping", scroll(0.5)), ("Alpha", ShaderNode::Value { value: 128.0 })])],
        )
        .unwrap();

        assert_eq!(
            entry.curves[0].values,
            CurveValues::KeyframeFloat(vec![
                KeyframeFloat { frame: 0, value: 0.0 },
                KeyframeFloat { frame: 100, value: 0.5 },
                KeyframeFloat { frame: -1, value: 0.5 },
            ])
        );
        // 1 - 0.5 - 0.25
        assert_eq!(
            entry.curves[1].values,
            CurveValues::KeyframeFloat(vec![
                KeyframeFloat { frame: 0, value: 0.25 },
                KeyframeFloat { frame: 100, value: 0.25 },
                KeyframeFloat { frame: -1, value: 0.25 },
            ])
        );
        assert_eq!(
            entry.curves[10].values,
            CurveValues::KeyframeFloat(vec![
                KeyframeFloat { frame: 0, value: 205.0 },
                KeyframeFloat { frame: 100, value: 128.0 },
                KeyframeFloat { frame: -1, value: 128.0 },
            ])
        );
    }

    #[test]
    fn unsampled_material_is_missing() {
        let error = encode(&scene(), vec![SampledState::default()]).unwrap_err();
        assert!(matches!(error, ExportError::MissingSample { kind: "material", frame: 0, .. }));
    }
}
