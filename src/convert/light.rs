use glam::{Quat, Vec3};
use log::debug;

use crate::convert::{position_curve, rotation_curve, sample_frames, EntryBuilder};
use crate::coordinate::{color_to_rgb, UNIT_SCALE};
use crate::error::ExportError;
use crate::scene::{FrameSampler, Light, LightKind, LightState, Scene};
use crate::structure::anm::{AnmCoord, AnmCurveFormat, AnmEntry, AnmEntryFormat, Curve, CurveValues};
use crate::structure::other::{LightChunk, NuccAmbient, NuccLightDirc, NuccLightPoint};


/// Entry format a light is exported as, if its kind is supported.
pub fn light_entry_format(kind: LightKind) -> Option<AnmEntryFormat> {
    match kind {
        LightKind::Point => Some(AnmEntryFormat::LIGHTPOINT),
        LightKind::Sun => Some(AnmEntryFormat::LIGHTDIRC),
        LightKind::Area => Some(AnmEntryFormat::AMBIENT),
        LightKind::Spot => None,
    }
}

/// Parameter chunk written next to the animation for a supported light.
pub fn light_chunk(kind: LightKind) -> Option<LightChunk> {
    match kind {
        LightKind::Point => Some(LightChunk::LightPoint(NuccLightPoint::default())),
        LightKind::Sun => Some(LightChunk::LightDirc(NuccLightDirc::default())),
        LightKind::Area => Some(LightChunk::Ambient(NuccAmbient::default())),
        LightKind::Spot => None,
    }
}

fn color_curve(states: &[LightState]) -> Curve {
    let mut curve = Curve::new(
        AnmCurveFormat::BYTE3,
        CurveValues::Rgb(states.iter().map(|state| color_to_rgb(state.color)).collect()),
    );
    curve.pad_color_values();
    curve
}

fn float_curve(values: impl Iterator<Item = f32>) -> Curve {
    Curve::new(AnmCurveFormat::FLOAT1ALT, CurveValues::Float(values.collect()))
}


/// Encodes one light. Point lights carry colour, strength, position and
/// both radii; sun lights colour, strength and rotation; area lights,
/// exported as ambient light, colour and strength. Spot lights yield `None`.
pub fn make_entry_light<S: FrameSampler + ?Sized>(
    scene: &Scene,
    light: &Light,
    light_index: usize,
    sampler: &mut S,
) -> Result<Option<AnmEntry>, ExportError> {
    let Some(entry_format) = light_entry_format(light.kind) else {
        return Ok(None);
    };

    let frames = light.sample_frames(scene.frame_end);
    let states: Vec<LightState> = sample_frames(sampler, &frames, |state, frame| {
        state.lights.get(&light.name).copied().ok_or_else(|| ExportError::MissingSample {
            kind: "light",
            name: light.name.clone(),
            frame,
        })
    })?;

    let mut curves = vec![color_curve(&states), float_curve(states.iter().map(|state| state.strength))];

    match light.kind {
        LightKind::Point => {
            let positions: Vec<Vec3> = states.iter().map(|state| Vec3::from_array(state.translation)).collect();
            curves.push(position_curve(&frames, &positions)?);
            curves.push(float_curve(states.iter().map(|state| state.size * UNIT_SCALE)));
            curves.push(float_curve(states.iter().map(|state| state.size_2 * UNIT_SCALE)));
        }
        LightKind::Sun => {
            let rotations: Vec<Quat> = states.iter().map(|state| Quat::from_array(state.rotation)).collect();
            curves.push(rotation_curve(&rotations));
        }
        LightKind::Area | LightKind::Spot => {}
    }

    let coord = AnmCoord {
        clump_index: -1,
        coord_index: u16::try_from(light_index)
            .map_err(|_| ExportError::CountOverflow { what: "light", count: light_index })?,
    };
    let mut builder = EntryBuilder::new(&light.name, coord, entry_format);
    for (curve_index, curve) in curves.into_iter().enumerate() {
        builder.add_curve(curve_index as u16, curve)?;
    }

    debug!("{}: {:?}, {} samples", light.name, light.kind, frames.len());
    Ok(Some(builder.build()))
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{RecordedFrames, SampledState};
    use crate::structure::anm_utils::Rgb;

    fn state(color: [f32; 3]) -> LightState {
        LightState {
            color,
            strength: 2.0,
            translation: [1.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0, 1.0],
            size: 0.5,
            size_2: 1.5,
        }
    }

    fn frames(name: &str, states: &[LightState]) -> RecordedFrames {
        RecordedFrames::new(
            states
                .iter()
                .map(|&light| {
                    let mut state = SampledState::default();
                    state.lights.insert(name.to_string(), light);
                    state
                })
                .collect(),
        )
    }

    #[test]
    fn still_point_light_curves() {
        let scene = Scene { frame_end: 10, ..Default::default() };
        let light = Light { name: "lamp".to_string(), kind: LightKind::Point, keyframes: vec![] };

        let entry = make_entry_light(&scene, &light, 2, &mut frames("lamp", &[state([1.0, 0.0, 0.0])]))
            .unwrap()
            .unwrap();

        assert_eq!(entry.entry_format, AnmEntryFormat::LIGHTPOINT);
        assert_eq!((entry.coord.clump_index, entry.coord.coord_index), (-1, 2));

        let headers: Vec<_> = entry
            .curve_headers
            .iter()
            .map(|header| (header.curve_index, header.curve_format, header.frame_count))
            .collect();
        assert_eq!(
            headers,
            vec![
                (0, AnmCurveFormat::BYTE3, 4),
                (1, AnmCurveFormat::FLOAT1ALT, 1),
                (2, AnmCurveFormat::FLOAT3, 1),
                (3, AnmCurveFormat::FLOAT1ALT, 1),
                (4, AnmCurveFormat::FLOAT1ALT, 1),
            ]
        );
        assert_eq!(entry.curves[0].values, CurveValues::Rgb(vec![Rgb { r: 255, g: 0, b: 0 }; 4]));
        assert_eq!(entry.curves[4].values, CurveValues::Float(vec![150.0]));
    }

    #[test]
    fn animated_sun_rotation_is_compressed() {
        let scene = Scene { frame_end: 2, ..Default::default() };
        let light = Light { name: "sun".to_string(), kind: LightKind::Sun, keyframes: vec![0.0, 1.0] };
        let states = [state([1.0, 1.0, 1.0]), state([0.5, 0.5, 0.5])];

        let entry = make_entry_light(&scene, &light, 0, &mut frames("sun", &states)).unwrap().unwrap();

        let formats: Vec<_> = entry.curve_headers.iter().map(|header| header.curve_format).collect();
        assert_eq!(formats, vec![AnmCurveFormat::BYTE3, AnmCurveFormat::FLOAT1ALT, AnmCurveFormat::SHORT4]);
        assert_eq!(entry.curve_headers[2].frame_count, 2);
    }

    #[test]
    fn spot_lights_are_skipped() {
        let scene = Scene { frame_end: 2, ..Default::default() };
        let light = Light { name: "spot".to_string(), kind: LightKind::Spot, keyframes: vec![] };

        assert!(make_entry_light(&scene, &light, 0, &mut RecordedFrames::default()).unwrap().is_none());
    }
}
