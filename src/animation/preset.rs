//! The static animation preset catalog.

use crate::animation::keyframe::{Keyframe, KeyframeProps};

/// Duration used when neither the project config nor the preset provides one.
pub const FALLBACK_DURATION_MS: u32 = 2000;

#[derive(Clone, Copy, Debug, serde::Serialize)]
pub struct AnimationPreset {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Wall-clock length of one loop cycle.
    pub duration_ms: u32,
    pub keyframes: &'static [Keyframe],
}

const P: KeyframeProps = KeyframeProps::NONE;

static SLIDE_IN_BOTTOM: [Keyframe; 3] = [
    Keyframe::new(
        0.0,
        KeyframeProps {
            y: Some(400.0),
            opacity: Some(0.0),
            scale: Some(0.8),
            ..P
        },
    ),
    Keyframe::new(
        0.6,
        KeyframeProps {
            y: Some(-20.0),
            opacity: Some(1.0),
            scale: Some(0.92),
            ..P
        },
    ),
    Keyframe::new(
        1.0,
        KeyframeProps {
            y: Some(0.0),
            opacity: Some(1.0),
            scale: Some(0.9),
            ..P
        },
    ),
];

static SLIDE_IN_TOP: [Keyframe; 3] = [
    Keyframe::new(
        0.0,
        KeyframeProps {
            y: Some(-400.0),
            opacity: Some(0.0),
            scale: Some(0.8),
            ..P
        },
    ),
    Keyframe::new(
        0.6,
        KeyframeProps {
            y: Some(20.0),
            opacity: Some(1.0),
            scale: Some(0.92),
            ..P
        },
    ),
    Keyframe::new(
        1.0,
        KeyframeProps {
            y: Some(0.0),
            opacity: Some(1.0),
            scale: Some(0.9),
            ..P
        },
    ),
];

static FADE_IN: [Keyframe; 2] = [
    Keyframe::new(
        0.0,
        KeyframeProps {
            opacity: Some(0.0),
            ..P
        },
    ),
    Keyframe::new(
        1.0,
        KeyframeProps {
            opacity: Some(1.0),
            ..P
        },
    ),
];

static ZOOM_IN: [Keyframe; 3] = [
    Keyframe::new(
        0.0,
        KeyframeProps {
            scale: Some(0.5),
            opacity: Some(0.0),
            ..P
        },
    ),
    Keyframe::new(
        0.7,
        KeyframeProps {
            scale: Some(0.95),
            opacity: Some(1.0),
            ..P
        },
    ),
    Keyframe::new(
        1.0,
        KeyframeProps {
            scale: Some(0.9),
            opacity: Some(1.0),
            ..P
        },
    ),
];

static FLOAT: [Keyframe; 3] = [
    Keyframe::new(
        0.0,
        KeyframeProps {
            y: Some(0.0),
            ..P
        },
    ),
    Keyframe::new(
        0.5,
        KeyframeProps {
            y: Some(-30.0),
            ..P
        },
    ),
    Keyframe::new(
        1.0,
        KeyframeProps {
            y: Some(0.0),
            ..P
        },
    ),
];

static TILT_3D: [Keyframe; 3] = [
    Keyframe::new(
        0.0,
        KeyframeProps {
            rotation_x: Some(10.0),
            rotation_y: Some(-25.0),
            ..P
        },
    ),
    Keyframe::new(
        0.5,
        KeyframeProps {
            rotation_x: Some(5.0),
            rotation_y: Some(25.0),
            ..P
        },
    ),
    Keyframe::new(
        1.0,
        KeyframeProps {
            rotation_x: Some(10.0),
            rotation_y: Some(-25.0),
            ..P
        },
    ),
];

static ROTATE_IN: [Keyframe; 2] = [
    Keyframe::new(
        0.0,
        KeyframeProps {
            rotation_z: Some(-30.0),
            scale: Some(0.6),
            opacity: Some(0.0),
            ..P
        },
    ),
    Keyframe::new(
        1.0,
        KeyframeProps {
            rotation_z: Some(0.0),
            scale: Some(0.9),
            opacity: Some(1.0),
            ..P
        },
    ),
];

static SWING: [Keyframe; 4] = [
    Keyframe::new(
        0.0,
        KeyframeProps {
            rotation_z: Some(0.0),
            ..P
        },
    ),
    Keyframe::new(
        0.25,
        KeyframeProps {
            rotation_z: Some(8.0),
            ..P
        },
    ),
    Keyframe::new(
        0.75,
        KeyframeProps {
            rotation_z: Some(-8.0),
            ..P
        },
    ),
    Keyframe::new(
        1.0,
        KeyframeProps {
            rotation_z: Some(0.0),
            ..P
        },
    ),
];

static PULSE: [Keyframe; 3] = [
    Keyframe::new(
        0.0,
        KeyframeProps {
            scale: Some(0.9),
            ..P
        },
    ),
    Keyframe::new(
        0.5,
        KeyframeProps {
            scale: Some(0.98),
            ..P
        },
    ),
    Keyframe::new(
        1.0,
        KeyframeProps {
            scale: Some(0.9),
            ..P
        },
    ),
];

static PRESETS: [AnimationPreset; 9] = [
    AnimationPreset {
        id: "slide-in-bottom",
        name: "Slide In (Bottom)",
        description: "Device rises from below with a small overshoot",
        duration_ms: 1500,
        keyframes: &SLIDE_IN_BOTTOM,
    },
    AnimationPreset {
        id: "slide-in-top",
        name: "Slide In (Top)",
        description: "Device drops in from above",
        duration_ms: 1500,
        keyframes: &SLIDE_IN_TOP,
    },
    AnimationPreset {
        id: "fade-in",
        name: "Fade In",
        description: "Simple opacity fade",
        duration_ms: 1000,
        keyframes: &FADE_IN,
    },
    AnimationPreset {
        id: "zoom-in",
        name: "Zoom In",
        description: "Grows from half size and settles",
        duration_ms: 1200,
        keyframes: &ZOOM_IN,
    },
    AnimationPreset {
        id: "float",
        name: "Float",
        description: "Gentle vertical hover, loops seamlessly",
        duration_ms: 3000,
        keyframes: &FLOAT,
    },
    AnimationPreset {
        id: "tilt-3d",
        name: "3D Tilt",
        description: "Turns side to side in perspective",
        duration_ms: 2500,
        keyframes: &TILT_3D,
    },
    AnimationPreset {
        id: "rotate-in",
        name: "Rotate In",
        description: "Spins into place while fading in",
        duration_ms: 1500,
        keyframes: &ROTATE_IN,
    },
    AnimationPreset {
        id: "swing",
        name: "Swing",
        description: "Pendulum rotation around the center",
        duration_ms: 2000,
        keyframes: &SWING,
    },
    AnimationPreset {
        id: "pulse",
        name: "Pulse",
        description: "Subtle breathing scale",
        duration_ms: 1600,
        keyframes: &PULSE,
    },
];

pub fn presets() -> &'static [AnimationPreset] {
    &PRESETS
}

pub fn find_preset(id: &str) -> Option<&'static AnimationPreset> {
    PRESETS.iter().find(|p| p.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::keyframe::validate_keyframes;

    #[test]
    fn catalog_is_well_formed() {
        for p in presets() {
            validate_keyframes(p.keyframes).unwrap();
            assert_eq!(p.keyframes.first().map(|k| k.time), Some(0.0), "{}", p.id);
            assert_eq!(p.keyframes.last().map(|k| k.time), Some(1.0), "{}", p.id);
            assert!(p.duration_ms > 0);
        }
    }

    #[test]
    fn ids_are_unique() {
        let mut ids: Vec<_> = presets().iter().map(|p| p.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), presets().len());
    }

    #[test]
    fn lookup() {
        assert_eq!(find_preset("slide-in-bottom").map(|p| p.duration_ms), Some(1500));
        assert!(find_preset("nope").is_none());
    }
}
