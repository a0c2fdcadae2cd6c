use crate::{
    animation::{config::AnimationConfig, keyframe::interpolate},
    foundation::core::Canvas,
    scene::{
        device::DeviceDescriptor,
        project::{BackgroundConfig, ScreenConfig, TextConfig},
    },
};

/// A device with its transform at the current animation time, plus the opacity the renderer
/// must apply. The descriptor's non-transform fields are the base device's, untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimatedDevice {
    pub device: DeviceDescriptor,
    pub opacity: f64,
}

/// Derive the animated device set for time `t`. The input descriptors are never modified.
///
/// With animation disabled or no known preset, every device passes through at full opacity.
pub fn project(devices: &[DeviceDescriptor], config: &AnimationConfig, t: f64) -> Vec<AnimatedDevice> {
    let Some(preset) = config.active_preset() else {
        return devices
            .iter()
            .map(|d| AnimatedDevice {
                device: d.clone(),
                opacity: 1.0,
            })
            .collect();
    };

    devices
        .iter()
        .map(|d| {
            let values = interpolate(preset.keyframes, t, &d.base_transform());
            AnimatedDevice {
                device: d.with_transform(&values),
                opacity: values.opacity.clamp(0.0, 1.0),
            }
        })
        .collect()
}

/// Everything a render surface paints for one instant of one screen.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneFrame {
    pub canvas: Canvas,
    pub background: BackgroundConfig,
    /// In paint order (ascending z-index).
    pub devices: Vec<AnimatedDevice>,
    /// Drawn above the devices.
    pub text: TextConfig,
    pub time: f64,
}

impl SceneFrame {
    pub fn from_screen(screen: &ScreenConfig, animation: &AnimationConfig, t: f64) -> Self {
        let mut devices = project(&screen.devices, animation, t);
        devices.sort_by_key(|d| d.device.z_index);
        Self {
            canvas: Canvas::EDITOR,
            background: screen.background.clone(),
            devices,
            text: screen.text.clone(),
            time: t,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::device::DeviceModel;

    fn devices() -> Vec<DeviceDescriptor> {
        let mut a = DeviceDescriptor::new("a", DeviceModel::Iphone15Pro);
        a.x = -250.0;
        a.y = 100.0;
        a.rotation_z = -15.0;
        a.scale = 0.85;
        a.z_index = 2;
        let b = DeviceDescriptor::new("b", DeviceModel::Pixel9);
        vec![a, b]
    }

    #[test]
    fn disabled_config_passes_devices_through() {
        let devs = devices();
        let mut cfg = AnimationConfig::for_preset("slide-in-bottom");
        cfg.enabled = false;
        let out = project(&devs, &cfg, 0.0);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].device, devs[0]);
        assert_eq!(out[0].opacity, 1.0);
    }

    #[test]
    fn unknown_preset_passes_devices_through() {
        let devs = devices();
        let cfg = AnimationConfig {
            enabled: true,
            preset_id: Some("nope".to_owned()),
            ..AnimationConfig::default()
        };
        assert_eq!(project(&devs, &cfg, 0.5)[1].device, devs[1]);
    }

    #[test]
    fn slide_in_bottom_overrides_only_keyed_properties() {
        let devs = devices();
        let cfg = AnimationConfig::for_preset("slide-in-bottom");

        let start = project(&devs, &cfg, 0.0);
        assert_eq!(start[0].device.y, 400.0);
        assert_eq!(start[0].device.scale, 0.8);
        assert_eq!(start[0].device.x, -250.0);
        assert_eq!(start[0].device.rotation_z, -15.0);
        assert_eq!(start[0].opacity, 0.0);

        let end = project(&devs, &cfg, 1.0);
        assert_eq!(end[0].device.y, 0.0);
        assert_eq!(end[0].device.scale, 0.9);
        assert_eq!(end[0].opacity, 1.0);
        assert_eq!(end[0].device.z_index, 2);
        assert_eq!(end[0].device.shadow, devs[0].shadow);

        // Base descriptors are untouched.
        assert_eq!(devs[0].y, 100.0);
    }

    #[test]
    fn scene_frame_orders_by_z_index() {
        let mut screen = ScreenConfig::new_default("s");
        screen.devices = devices();
        let frame = SceneFrame::from_screen(&screen, &AnimationConfig::default(), 0.0);
        assert_eq!(frame.devices[0].device.id, "b");
        assert_eq!(frame.devices[1].device.id, "a");
        assert_eq!(frame.canvas, Canvas::EDITOR);
    }
}
