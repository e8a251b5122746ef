use hashbrown::HashSet;

use crate::scene::FCurve;
use crate::structure::anm::{AnmCurveFormat, AnmEntry, Curve, CurveHeader, CurveValues};


/// Frames whose location and rotation keys equal both neighbours'.
///
/// Keys are compared by position along the first location channel; the
/// first and last keys are always kept, as is any position some channel
/// has no key for.
pub fn redundant_frames(location: &[&FCurve], rotation: &[&FCurve]) -> HashSet<i32> {
    let mut frames = HashSet::new();

    let Some(reference) = location.first() else { return frames };
    if rotation.is_empty() {
        return frames;
    }

    let count = reference.keyframes.len();
    if count <= 2 {
        return frames;
    }

    for i in 1..count - 1 {
        if location.iter().chain(rotation).all(|channel| holds_value(channel, i)) {
            frames.insert(reference.keyframes[i].frame as i32);
        }
    }

    frames
}

fn holds_value(channel: &FCurve, i: usize) -> bool {
    match channel.keyframes.get(i - 1..=i + 1) {
        Some([previous, current, next]) => previous.value == current.value && current.value == next.value,
        _ => false,
    }
}


/// Rewrites a keyed curve holding a single value into its cheapest form.
///
/// Keyed vectors and floats become one unkeyed sample. Keyed quaternions
/// stay keyed: they keep their first key and the null key.
pub fn collapse(header: CurveHeader, curve: Curve) -> (CurveHeader, Curve) {
    let collapsed = match &curve.values {
        CurveValues::KeyframeVector3(keys) => constant(keys.iter().map(|key| key.value))
            .map(|value| Curve::new(AnmCurveFormat::FLOAT3, CurveValues::Vector3(vec![value]))),

        CurveValues::KeyframeFloat(keys) => constant(keys.iter().map(|key| key.value))
            .map(|value| Curve::new(AnmCurveFormat::FLOAT1, CurveValues::Float(vec![value]))),

        CurveValues::KeyframeVector4(keys) if keys.len() > 2 => constant(keys.iter().map(|key| key.value))
            .map(|_| {
                let mut curve = Curve::new(AnmCurveFormat::INT1_FLOAT4, CurveValues::KeyframeVector4(vec![keys[0]]));
                curve.append_null_keyframe();
                curve
            }),

        _ => None,
    };

    match collapsed {
        Some(collapsed) => (CurveHeader::describe(header.curve_index, &collapsed).unwrap_or(header), collapsed),
        None => (header, curve),
    }
}

fn constant<T: PartialEq + Copy>(mut values: impl Iterator<Item = T>) -> Option<T> {
    let first = values.next()?;
    values.all(|value| value == first).then_some(first)
}

pub fn optimize_entry(entry: AnmEntry) -> AnmEntry {
    let (curve_headers, curves) = entry
        .curve_headers
        .into_iter()
        .zip(entry.curves)
        .map(|(header, curve)| collapse(header, curve))
        .unzip();

    AnmEntry { curve_headers, curves, ..entry }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::Keyframes;
    use crate::scene::fixtures::fcurve;
    use crate::structure::anm_utils::*;

    fn keyed<T: crate::convert::KeyedValue>(values: &[T]) -> (CurveHeader, Curve) {
        let keyframes: Keyframes<T> = values.iter().enumerate().map(|(i, value)| (i as i32 * 100, *value)).collect();
        let curve = keyframes.into_curve();
        (CurveHeader::describe(0, &curve).unwrap(), curve)
    }

    #[test]
    fn constant_vector_is_demoted() {
        let value = Vector3 { x: 1.0, y: 2.0, z: 3.0 };
        let (header, curve) = keyed(&[value, value, value]);

        let (header, curve) = collapse(header, curve);

        assert_eq!(curve, Curve::new(AnmCurveFormat::FLOAT3, CurveValues::Vector3(vec![value])));
        assert_eq!(header.curve_format, AnmCurveFormat::FLOAT3);
        assert_eq!(header.frame_count, 1);
        assert_eq!(header.curve_size, 12);
    }

    #[test]
    fn constant_quaternion_keeps_one_key() {
        let value = Vector4 { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };
        let (header, curve) = keyed(&[value, value]);

        let (header, curve) = collapse(header, curve);

        assert_eq!(header.curve_format, AnmCurveFormat::INT1_FLOAT4);
        assert_eq!(header.frame_count, 2);
        assert_eq!(
            curve.values,
            CurveValues::KeyframeVector4(vec![KeyframeVector4 { frame: 0, value }, KeyframeVector4 { frame: -1, value }])
        );
    }

    #[test]
    fn collapse_is_idempotent() {
        for (header, curve) in [keyed(&[4.0f32, 4.0]), keyed(&[0.5f32, 1.0])] {
            let once = collapse(header, curve);
            let twice = collapse(once.0, once.1.clone());
            assert_eq!(once, twice);
        }

        let value = Vector4 { x: 0.5, y: 0.5, z: 0.5, w: 0.5 };
        let (header, curve) = keyed(&[value, value, value]);
        let once = collapse(header, curve);
        assert_eq!(collapse(once.0, once.1.clone()), once);
    }

    #[test]
    fn varying_curve_is_untouched() {
        let (header, curve) = keyed(&[1.0f32, 2.0]);
        assert_eq!(collapse(header, curve.clone()), (header, curve));
    }

    #[test]
    fn interior_frame_of_still_triple_is_culled() {
        let location: Vec<_> = (0..3).map(|axis| fcurve("location", axis, &[(0.0, 1.0), (5.0, 1.0), (10.0, 1.0)])).collect();
        let rotation: Vec<_> = (0..4).map(|axis| fcurve("rotation_quaternion", axis, &[(0.0, 0.5), (5.0, 0.5), (10.0, 0.5)])).collect();

        let frames = redundant_frames(&location.iter().collect::<Vec<_>>(), &rotation.iter().collect::<Vec<_>>());

        assert_eq!(frames.into_iter().collect::<Vec<_>>(), vec![5]);
    }

    #[test]
    fn one_differing_component_keeps_the_frame() {
        let location: Vec<_> = (0..3).map(|axis| fcurve("location", axis, &[(0.0, 1.0), (5.0, 1.0), (10.0, 1.0)])).collect();
        let mut rotation: Vec<_> = (0..4).map(|axis| fcurve("rotation_quaternion", axis, &[(0.0, 0.5), (5.0, 0.5), (10.0, 0.5)])).collect();
        rotation[3].keyframes[2].value = 0.25;

        let frames = redundant_frames(&location.iter().collect::<Vec<_>>(), &rotation.iter().collect::<Vec<_>>());

        assert!(frames.is_empty());
    }
}
