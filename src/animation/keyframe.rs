use crate::{
    animation::ease::ease_in_out_cubic,
    foundation::error::{MockshotError, MockshotResult},
};

pub trait Lerp: Sized {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        if t >= 1.0 {
            return *b;
        }
        // Clamping to the segment keeps adjacent segments from overlapping by an ulp.
        let (lo, hi) = if a <= b { (*a, *b) } else { (*b, *a) };
        (a + (b - a) * t).clamp(lo, hi)
    }
}

/// The fixed set of animatable device properties.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimProperty {
    X,
    Y,
    RotationZ,
    RotationX,
    RotationY,
    Scale,
    Opacity,
}

impl AnimProperty {
    pub const ALL: [AnimProperty; 7] = [
        AnimProperty::X,
        AnimProperty::Y,
        AnimProperty::RotationZ,
        AnimProperty::RotationX,
        AnimProperty::RotationY,
        AnimProperty::Scale,
        AnimProperty::Opacity,
    ];

    /// Key used in project documents and preset JSON.
    pub fn key(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::RotationZ => "rotation",
            Self::RotationX => "rotateX",
            Self::RotationY => "rotateY",
            Self::Scale => "scale",
            Self::Opacity => "opacity",
        }
    }
}

/// A partial property map. Keys outside the fixed set are dropped on deserialize.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct KeyframeProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, rename = "rotation", skip_serializing_if = "Option::is_none")]
    pub rotation_z: Option<f64>,
    #[serde(default, rename = "rotateX", skip_serializing_if = "Option::is_none")]
    pub rotation_x: Option<f64>,
    #[serde(default, rename = "rotateY", skip_serializing_if = "Option::is_none")]
    pub rotation_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl KeyframeProps {
    pub const NONE: KeyframeProps = KeyframeProps {
        x: None,
        y: None,
        rotation_z: None,
        rotation_x: None,
        rotation_y: None,
        scale: None,
        opacity: None,
    };

    pub fn get(&self, prop: AnimProperty) -> Option<f64> {
        match prop {
            AnimProperty::X => self.x,
            AnimProperty::Y => self.y,
            AnimProperty::RotationZ => self.rotation_z,
            AnimProperty::RotationX => self.rotation_x,
            AnimProperty::RotationY => self.rotation_y,
            AnimProperty::Scale => self.scale,
            AnimProperty::Opacity => self.opacity,
        }
    }

    pub fn set(&mut self, prop: AnimProperty, value: Option<f64>) {
        match prop {
            AnimProperty::X => self.x = value,
            AnimProperty::Y => self.y = value,
            AnimProperty::RotationZ => self.rotation_z = value,
            AnimProperty::RotationX => self.rotation_x = value,
            AnimProperty::RotationY => self.rotation_y = value,
            AnimProperty::Scale => self.scale = value,
            AnimProperty::Opacity => self.opacity = value,
        }
    }
}

/// A complete set of transform values (no gaps).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TransformValues {
    pub x: f64,
    pub y: f64,
    #[serde(rename = "rotation")]
    pub rotation_z: f64,
    #[serde(rename = "rotateX")]
    pub rotation_x: f64,
    #[serde(rename = "rotateY")]
    pub rotation_y: f64,
    pub scale: f64,
    pub opacity: f64,
}

impl Default for TransformValues {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            rotation_z: 0.0,
            rotation_x: 0.0,
            rotation_y: 0.0,
            scale: 1.0,
            opacity: 1.0,
        }
    }
}

impl TransformValues {
    pub fn get(&self, prop: AnimProperty) -> f64 {
        match prop {
            AnimProperty::X => self.x,
            AnimProperty::Y => self.y,
            AnimProperty::RotationZ => self.rotation_z,
            AnimProperty::RotationX => self.rotation_x,
            AnimProperty::RotationY => self.rotation_y,
            AnimProperty::Scale => self.scale,
            AnimProperty::Opacity => self.opacity,
        }
    }

    pub fn set(&mut self, prop: AnimProperty, value: f64) {
        match prop {
            AnimProperty::X => self.x = value,
            AnimProperty::Y => self.y = value,
            AnimProperty::RotationZ => self.rotation_z = value,
            AnimProperty::RotationX => self.rotation_x = value,
            AnimProperty::RotationY => self.rotation_y = value,
            AnimProperty::Scale => self.scale = value,
            AnimProperty::Opacity => self.opacity = value,
        }
    }

    /// Fill the gaps of `props` from `self`.
    pub fn resolve(&self, props: &KeyframeProps) -> TransformValues {
        let mut out = *self;
        for prop in AnimProperty::ALL {
            if let Some(v) = props.get(prop) {
                out.set(prop, v);
            }
        }
        out
    }
}

impl Lerp for TransformValues {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        let mut out = *a;
        for prop in AnimProperty::ALL {
            out.set(prop, f64::lerp(&a.get(prop), &b.get(prop), t));
        }
        out
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Keyframe {
    /// Normalized position in the loop, `[0, 1]`.
    pub time: f64,
    #[serde(default)]
    pub properties: KeyframeProps,
}

impl Keyframe {
    pub const fn new(time: f64, properties: KeyframeProps) -> Self {
        Self { time, properties }
    }
}

/// Keys must be finite, inside `[0, 1]`, and in non-decreasing time order.
pub fn validate_keyframes(keys: &[Keyframe]) -> MockshotResult<()> {
    if keys.is_empty() {
        return Err(MockshotError::animation("keyframe list must not be empty"));
    }
    if let Some(k) = keys
        .iter()
        .find(|k| !k.time.is_finite() || !(0.0..=1.0).contains(&k.time))
    {
        return Err(MockshotError::animation(format!(
            "keyframe time {} is outside [0, 1]",
            k.time
        )));
    }
    if !keys.windows(2).all(|w| w[0].time <= w[1].time) {
        return Err(MockshotError::animation(
            "keyframes must be sorted by time",
        ));
    }
    Ok(())
}

/// Sample `keys` at normalized time `t`.
///
/// Outside the keyed range the boundary key holds; no extrapolation. Inside it, the first pair
/// with `a.time <= t <= b.time` is used, so a coincident pair of keys resolves to the value
/// before the jump when an earlier segment already ends at `t`. A zero-length bracket counts
/// as fully progressed. Properties a key leaves out come from `base`.
pub fn interpolate(keys: &[Keyframe], t: f64, base: &TransformValues) -> TransformValues {
    let (Some(first), Some(last)) = (keys.first(), keys.last()) else {
        return *base;
    };
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

    if t < first.time {
        return base.resolve(&first.properties);
    }
    if t > last.time {
        return base.resolve(&last.properties);
    }
    let Some((a, b)) = keys
        .windows(2)
        .map(|w| (&w[0], &w[1]))
        .find(|(a, b)| a.time <= t && t <= b.time)
    else {
        // Single key.
        return base.resolve(&first.properties);
    };

    let denom = b.time - a.time;
    let p = if denom <= 0.0 {
        1.0
    } else {
        (t - a.time) / denom
    };

    let start = base.resolve(&a.properties);
    let end = base.resolve(&b.properties);
    TransformValues::lerp(&start, &end, ease_in_out_cubic(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slide_keys() -> Vec<Keyframe> {
        vec![
            Keyframe::new(
                0.0,
                KeyframeProps {
                    y: Some(400.0),
                    opacity: Some(0.0),
                    scale: Some(0.8),
                    ..KeyframeProps::NONE
                },
            ),
            Keyframe::new(
                0.6,
                KeyframeProps {
                    y: Some(-20.0),
                    opacity: Some(1.0),
                    scale: Some(0.92),
                    ..KeyframeProps::NONE
                },
            ),
            Keyframe::new(
                1.0,
                KeyframeProps {
                    y: Some(0.0),
                    opacity: Some(1.0),
                    scale: Some(0.9),
                    ..KeyframeProps::NONE
                },
            ),
        ]
    }

    fn base() -> TransformValues {
        TransformValues {
            x: 100.0,
            y: 200.0,
            rotation_z: 5.0,
            rotation_x: 0.0,
            rotation_y: 0.0,
            scale: 1.0,
            opacity: 1.0,
        }
    }

    #[test]
    fn boundaries_hit_first_and_last_keys_exactly() {
        let keys = slide_keys();
        let at0 = interpolate(&keys, 0.0, &base());
        assert_eq!(at0.y, 400.0);
        assert_eq!(at0.scale, 0.8);
        assert_eq!(at0.opacity, 0.0);
        assert_eq!(at0.x, 100.0);

        let at1 = interpolate(&keys, 1.0, &base());
        assert_eq!(at1.y, 0.0);
        assert_eq!(at1.scale, 0.9);
        assert_eq!(at1.rotation_z, 5.0);
    }

    #[test]
    fn interior_key_is_hit_exactly() {
        let at = interpolate(&slide_keys(), 0.6, &base());
        assert_eq!(at.y, -20.0);
        assert_eq!(at.scale, 0.92);
    }

    #[test]
    fn midpoint_of_segment_uses_eased_progress() {
        let keys = vec![
            Keyframe::new(
                0.0,
                KeyframeProps {
                    x: Some(0.0),
                    ..KeyframeProps::NONE
                },
            ),
            Keyframe::new(
                1.0,
                KeyframeProps {
                    x: Some(100.0),
                    ..KeyframeProps::NONE
                },
            ),
        ];
        let b = TransformValues::default();
        assert_eq!(interpolate(&keys, 0.5, &b).x, 50.0);
        // 4 * 0.25^3 = 0.0625
        assert!((interpolate(&keys, 0.25, &b).x - 6.25).abs() < 1e-9);
    }

    #[test]
    fn missing_property_falls_back_to_base_on_one_side() {
        let keys = vec![
            Keyframe::new(0.0, KeyframeProps::NONE),
            Keyframe::new(
                1.0,
                KeyframeProps {
                    x: Some(0.0),
                    ..KeyframeProps::NONE
                },
            ),
        ];
        let v = interpolate(&keys, 0.5, &base());
        assert_eq!(v.x, 50.0);
    }

    #[test]
    fn empty_keys_return_base() {
        assert_eq!(interpolate(&[], 0.4, &base()), base());
    }

    #[test]
    fn out_of_range_time_clamps_to_boundary_keys() {
        let keys = slide_keys();
        assert_eq!(interpolate(&keys, -2.0, &base()).y, 400.0);
        assert_eq!(interpolate(&keys, 9.0, &base()).y, 0.0);
        assert_eq!(interpolate(&keys, f64::NAN, &base()).y, 400.0);
    }

    #[test]
    fn keys_not_spanning_full_range_hold_their_values() {
        let keys = vec![
            Keyframe::new(
                0.2,
                KeyframeProps {
                    x: Some(10.0),
                    ..KeyframeProps::NONE
                },
            ),
            Keyframe::new(
                0.8,
                KeyframeProps {
                    x: Some(20.0),
                    ..KeyframeProps::NONE
                },
            ),
        ];
        assert_eq!(interpolate(&keys, 0.0, &base()).x, 10.0);
        assert_eq!(interpolate(&keys, 1.0, &base()).x, 20.0);
    }

    #[test]
    fn coincident_keys_jump_without_dividing_by_zero() {
        let keys = vec![
            Keyframe::new(
                0.0,
                KeyframeProps {
                    x: Some(0.0),
                    ..KeyframeProps::NONE
                },
            ),
            Keyframe::new(
                0.5,
                KeyframeProps {
                    x: Some(10.0),
                    ..KeyframeProps::NONE
                },
            ),
            Keyframe::new(
                0.5,
                KeyframeProps {
                    x: Some(90.0),
                    ..KeyframeProps::NONE
                },
            ),
            Keyframe::new(
                1.0,
                KeyframeProps {
                    x: Some(100.0),
                    ..KeyframeProps::NONE
                },
            ),
        ];
        // The segment ending at 0.5 is found first.
        let v = interpolate(&keys, 0.5, &base());
        assert_eq!(v.x, 10.0);
        assert_eq!(interpolate(&keys, 0.75, &base()).x, 95.0);
    }

    #[test]
    fn zero_length_bracket_resolves_to_its_later_key() {
        let keys = vec![
            Keyframe::new(
                0.5,
                KeyframeProps {
                    x: Some(10.0),
                    ..KeyframeProps::NONE
                },
            ),
            Keyframe::new(
                0.5,
                KeyframeProps {
                    x: Some(90.0),
                    ..KeyframeProps::NONE
                },
            ),
            Keyframe::new(
                1.0,
                KeyframeProps {
                    x: Some(100.0),
                    ..KeyframeProps::NONE
                },
            ),
        ];
        let v = interpolate(&keys, 0.5, &base());
        assert_eq!(v.x, 90.0);
        assert_eq!(interpolate(&keys, 0.2, &base()).x, 10.0);
    }

    #[test]
    fn single_key_holds_everywhere() {
        let keys = [Keyframe::new(
            0.5,
            KeyframeProps {
                scale: Some(2.0),
                ..KeyframeProps::NONE
            },
        )];
        for t in [0.0, 0.5, 1.0] {
            assert_eq!(interpolate(&keys, t, &base()).scale, 2.0);
        }
    }

    #[test]
    fn unknown_keys_are_ignored_on_deserialize() {
        let k: Keyframe =
            serde_json::from_str(r#"{"time":0.5,"properties":{"y":3,"skew":9}}"#).unwrap();
        assert_eq!(k.properties.y, Some(3.0));
        assert_eq!(k.properties.x, None);
    }

    #[test]
    fn validate_rejects_unsorted_and_out_of_range() {
        let mut keys = slide_keys();
        assert!(validate_keyframes(&keys).is_ok());
        keys.swap(0, 2);
        assert!(validate_keyframes(&keys).is_err());
        assert!(validate_keyframes(&[Keyframe::new(1.5, KeyframeProps::NONE)]).is_err());
        assert!(validate_keyframes(&[]).is_err());
    }
}
