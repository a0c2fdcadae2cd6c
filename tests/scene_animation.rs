use mockshot::{
    AnimationConfig, DeviceDescriptor, DeviceModel, Keyframe, KeyframeProps, SceneFrame,
    ScreenConfig, TransformValues, find_preset, interpolate, presets,
};
use proptest::prelude::*;

fn screen_with_device() -> ScreenConfig {
    let mut screen = ScreenConfig::new_default("s");
    screen.devices = vec![DeviceDescriptor::new("d", DeviceModel::Iphone15Pro)];
    screen
}

#[test]
fn slide_in_bottom_starts_low_and_lands_at_rest() {
    let screen = screen_with_device();
    let animation = AnimationConfig::for_preset("slide-in-bottom");

    let start = SceneFrame::from_screen(&screen, &animation, 0.0);
    let d = &start.devices[0];
    assert_eq!(d.device.y, 400.0);
    assert_eq!(d.device.scale, 0.8);
    assert_eq!(d.opacity, 0.0);

    let end = SceneFrame::from_screen(&screen, &animation, 1.0);
    let d = &end.devices[0];
    assert_eq!(d.device.y, 0.0);
    assert_eq!(d.device.scale, 0.9);
    assert_eq!(d.opacity, 1.0);

    // Overshoot key at 0.6 is reached exactly.
    let mid = SceneFrame::from_screen(&screen, &animation, 0.6);
    assert_eq!(mid.devices[0].device.y, -20.0);

    // The stored descriptor is never touched.
    assert_eq!(screen.devices[0].y, 0.0);
    assert_eq!(screen.devices[0].scale, 0.9);
}

#[test]
fn disabled_animation_passes_devices_through() {
    let screen = screen_with_device();
    let animation = AnimationConfig {
        enabled: false,
        ..AnimationConfig::for_preset("slide-in-bottom")
    };
    let frame = SceneFrame::from_screen(&screen, &animation, 0.0);
    assert_eq!(frame.devices[0].device, screen.devices[0]);
    assert_eq!(frame.devices[0].opacity, 1.0);
}

#[test]
fn frame_paints_devices_in_z_order() {
    let mut screen = ScreenConfig::new_default("s");
    let mut back = DeviceDescriptor::new("back", DeviceModel::Iphone15Pro);
    back.z_index = 1;
    let mut front = DeviceDescriptor::new("front", DeviceModel::Pixel9);
    front.z_index = 5;
    screen.devices = vec![front, back];

    let frame = SceneFrame::from_screen(&screen, &AnimationConfig::default(), 0.0);
    let ids: Vec<&str> = frame.devices.iter().map(|d| d.device.id.as_str()).collect();
    assert_eq!(ids, ["back", "front"]);
}

fn two_keys(from: f64, to: f64) -> [Keyframe; 2] {
    [
        Keyframe::new(
            0.0,
            KeyframeProps {
                x: Some(from),
                ..KeyframeProps::NONE
            },
        ),
        Keyframe::new(
            1.0,
            KeyframeProps {
                x: Some(to),
                ..KeyframeProps::NONE
            },
        ),
    ]
}

proptest! {
    #[test]
    fn presets_stay_within_their_keyframe_ranges(idx in 0usize..9, t in 0.0f64..=1.0) {
        let preset = &presets()[idx % presets().len()];
        let v = interpolate(preset.keyframes, t, &TransformValues::default());
        prop_assert!(v.x.is_finite() && v.y.is_finite() && v.scale.is_finite());
        prop_assert!((0.0..=1.0).contains(&v.opacity), "{}: {}", preset.id, v.opacity);
    }

    #[test]
    fn boundary_keys_hold_outside_the_range(t in -10.0f64..10.0) {
        let preset = find_preset("slide-in-bottom").unwrap();
        let base = TransformValues::default();
        let v = interpolate(preset.keyframes, t, &base);
        if t <= 0.0 {
            prop_assert_eq!(v.y, 400.0);
        } else if t >= 1.0 {
            prop_assert_eq!(v.y, 0.0);
        }
    }

    #[test]
    fn two_key_interpolation_is_monotonic(
        from in -500.0f64..500.0,
        to in -500.0f64..500.0,
        a in 0.0f64..=1.0,
        b in 0.0f64..=1.0,
    ) {
        let keys = two_keys(from, to);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let x_lo = interpolate(&keys, lo, &TransformValues::default()).x;
        let x_hi = interpolate(&keys, hi, &TransformValues::default()).x;
        if from <= to {
            prop_assert!(x_lo <= x_hi + 1e-9);
        } else {
            prop_assert!(x_lo + 1e-9 >= x_hi);
        }
    }

    #[test]
    fn untouched_properties_come_from_the_base(t in 0.0f64..=1.0, rz in -180.0f64..180.0) {
        let base = TransformValues { rotation_z: rz, ..TransformValues::default() };
        let v = interpolate(&two_keys(0.0, 100.0), t, &base);
        prop_assert_eq!(v.rotation_z, rz);
        prop_assert_eq!(v.scale, 1.0);
    }
}
