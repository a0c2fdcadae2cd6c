use crate::{
    animation::keyframe::TransformValues,
    foundation::core::{Rgba8, Vec2},
};

/// Width, in canvas pixels, at which every device frame is laid out before its own scale.
pub const DEVICE_LAYOUT_WIDTH: f64 = 800.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DeviceModel {
    #[serde(rename = "iPhone 16 Pro")]
    Iphone16Pro,
    #[serde(rename = "iPhone 16 Pro Max")]
    Iphone16ProMax,
    #[serde(rename = "iPhone 15 Pro")]
    Iphone15Pro,
    #[serde(rename = "iPhone 15 Pro Max")]
    Iphone15ProMax,
    #[serde(rename = "iPhone 14 Pro")]
    Iphone14Pro,
    #[serde(rename = "iPhone 14 Plus")]
    Iphone14Plus,
    #[serde(rename = "iPhone SE")]
    IphoneSe,
    #[serde(rename = "iPad Pro 13\"")]
    IpadPro13,
    #[serde(rename = "iPad Pro 11\"")]
    IpadPro11,
    #[serde(rename = "iPad Pro")]
    IpadPro,
    #[serde(rename = "Samsung S24 Ultra")]
    SamsungS24Ultra,
    #[serde(rename = "Samsung S24")]
    SamsungS24,
    #[serde(rename = "Samsung S23")]
    SamsungS23,
    #[serde(rename = "Galaxy Z Fold")]
    GalaxyZFold,
    #[serde(rename = "Pixel 9 Pro")]
    Pixel9Pro,
    #[serde(rename = "Pixel 9")]
    Pixel9,
    #[serde(rename = "Pixel 8 Pro")]
    Pixel8Pro,
    #[serde(rename = "Pixel 7")]
    Pixel7,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
}

/// Per-model layout constants, in the frame's own coordinate space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeviceGeometry {
    /// Frame artwork size; only the aspect ratio matters once laid out.
    pub frame_size: Vec2,
    pub corner_radius: f64,
    /// Screen inset as a fraction of the frame width, applied on every side.
    pub screen_inset: f64,
    pub screen_radius: f64,
    pub frame_color: Rgba8,
    pub platform: Platform,
}

const fn geometry(
    w: f64,
    h: f64,
    corner_radius: f64,
    screen_inset: f64,
    screen_radius: f64,
    frame_color: Rgba8,
    platform: Platform,
) -> DeviceGeometry {
    DeviceGeometry {
        frame_size: Vec2::new(w, h),
        corner_radius,
        screen_inset,
        screen_radius,
        frame_color,
        platform,
    }
}

const TITANIUM_16: DeviceGeometry = geometry(
    430.0,
    932.0,
    58.0,
    0.025,
    52.0,
    Rgba8::opaque(0x2a, 0x2a, 0x2a),
    Platform::Ios,
);
const TITANIUM_15: DeviceGeometry = geometry(
    430.0,
    932.0,
    55.0,
    0.03,
    48.0,
    Rgba8::opaque(0x22, 0x22, 0x22),
    Platform::Ios,
);
const STEEL_14: DeviceGeometry = geometry(
    430.0,
    932.0,
    52.0,
    0.035,
    42.0,
    Rgba8::opaque(0x55, 0x55, 0x55),
    Platform::Ios,
);
const CLASSIC_SE: DeviceGeometry = geometry(
    400.0,
    800.0,
    32.0,
    0.05,
    0.0,
    Rgba8::opaque(0xe5, 0xe7, 0xeb),
    Platform::Ios,
);
const IPAD: DeviceGeometry = geometry(
    600.0,
    800.0,
    32.0,
    0.025,
    20.0,
    Rgba8::opaque(0x2a, 0x2a, 0x2a),
    Platform::Ios,
);
const S24_ULTRA: DeviceGeometry = geometry(
    440.0,
    940.0,
    16.0,
    0.015,
    6.0,
    Rgba8::opaque(0x1a, 0x1a, 0x1a),
    Platform::Android,
);
const S24: DeviceGeometry = geometry(
    440.0,
    940.0,
    36.0,
    0.015,
    12.0,
    Rgba8::opaque(0x1a, 0x1a, 0x1a),
    Platform::Android,
);
const S23: DeviceGeometry = geometry(
    430.0,
    932.0,
    45.0,
    0.03,
    28.0,
    Rgba8::opaque(0xe2, 0xe2, 0xe2),
    Platform::Android,
);
const FOLD: DeviceGeometry = geometry(
    380.0,
    930.0,
    20.0,
    0.02,
    8.0,
    Rgba8::opaque(0x3a, 0x3a, 0x3a),
    Platform::Android,
);
const PIXEL_PRO: DeviceGeometry = geometry(
    412.0,
    915.0,
    40.0,
    0.03,
    36.0,
    Rgba8::opaque(0x33, 0x33, 0x33),
    Platform::Android,
);
const PIXEL_7: DeviceGeometry = geometry(
    412.0,
    915.0,
    30.0,
    0.035,
    24.0,
    Rgba8::opaque(0xf0, 0xf0, 0xf0),
    Platform::Android,
);

impl DeviceModel {
    pub const ALL: [DeviceModel; 18] = [
        DeviceModel::Iphone16Pro,
        DeviceModel::Iphone16ProMax,
        DeviceModel::Iphone15Pro,
        DeviceModel::Iphone15ProMax,
        DeviceModel::Iphone14Pro,
        DeviceModel::Iphone14Plus,
        DeviceModel::IphoneSe,
        DeviceModel::IpadPro13,
        DeviceModel::IpadPro11,
        DeviceModel::IpadPro,
        DeviceModel::SamsungS24Ultra,
        DeviceModel::SamsungS24,
        DeviceModel::SamsungS23,
        DeviceModel::GalaxyZFold,
        DeviceModel::Pixel9Pro,
        DeviceModel::Pixel9,
        DeviceModel::Pixel8Pro,
        DeviceModel::Pixel7,
    ];

    pub fn geometry(self) -> &'static DeviceGeometry {
        match self {
            Self::Iphone16Pro | Self::Iphone16ProMax => &TITANIUM_16,
            Self::Iphone15Pro | Self::Iphone15ProMax => &TITANIUM_15,
            Self::Iphone14Pro | Self::Iphone14Plus => &STEEL_14,
            Self::IphoneSe => &CLASSIC_SE,
            Self::IpadPro13 | Self::IpadPro11 | Self::IpadPro => &IPAD,
            Self::SamsungS24Ultra => &S24_ULTRA,
            Self::SamsungS24 => &S24,
            Self::SamsungS23 => &S23,
            Self::GalaxyZFold => &FOLD,
            Self::Pixel9Pro | Self::Pixel9 | Self::Pixel8Pro => &PIXEL_PRO,
            Self::Pixel7 => &PIXEL_7,
        }
    }

    /// Size on the canvas at scale 1: [`DEVICE_LAYOUT_WIDTH`] wide, height from the frame aspect.
    pub fn layout_size(self) -> Vec2 {
        let g = self.geometry();
        Vec2::new(
            DEVICE_LAYOUT_WIDTH,
            DEVICE_LAYOUT_WIDTH * g.frame_size.y / g.frame_size.x,
        )
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadowConfig {
    pub enabled: bool,
    pub color: String,
    pub blur: f64,
    pub opacity: f64,
    pub offset_y: f64,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            color: "#000000".to_owned(),
            blur: 40.0,
            opacity: 0.4,
            offset_y: 20.0,
        }
    }
}

/// Base (unanimated) placement of one device on a screen. Offsets are from the canvas center.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDescriptor {
    pub id: String,
    #[serde(rename = "type")]
    pub model: DeviceModel,
    /// Screenshot reference: a file path, or `None` for an empty screen.
    #[serde(default)]
    pub image: Option<String>,
    pub x: f64,
    pub y: f64,
    #[serde(rename = "rotation")]
    pub rotation_z: f64,
    #[serde(default, rename = "rotateX")]
    pub rotation_x: f64,
    #[serde(default, rename = "rotateY")]
    pub rotation_y: f64,
    pub scale: f64,
    #[serde(default)]
    pub shadow: ShadowConfig,
    #[serde(default)]
    pub z_index: i32,
}

impl DeviceDescriptor {
    pub fn new(id: impl Into<String>, model: DeviceModel) -> Self {
        Self {
            id: id.into(),
            model,
            image: None,
            x: 0.0,
            y: 0.0,
            rotation_z: 0.0,
            rotation_x: 0.0,
            rotation_y: 0.0,
            scale: 0.9,
            shadow: ShadowConfig::default(),
            z_index: 1,
        }
    }

    /// Base transform values for interpolation. Opacity is always fully visible at rest.
    pub fn base_transform(&self) -> TransformValues {
        TransformValues {
            x: self.x,
            y: self.y,
            rotation_z: self.rotation_z,
            rotation_x: self.rotation_x,
            rotation_y: self.rotation_y,
            scale: self.scale,
            opacity: 1.0,
        }
    }

    /// A copy with the transform fields replaced by `values`.
    pub fn with_transform(&self, values: &TransformValues) -> Self {
        Self {
            x: values.x,
            y: values.y,
            rotation_z: values.rotation_z,
            rotation_x: values.rotation_x,
            rotation_y: values.rotation_y,
            scale: values.scale,
            ..self.clone()
        }
    }
}
