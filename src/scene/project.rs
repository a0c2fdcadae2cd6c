use crate::{
    animation::config::AnimationConfig,
    scene::device::{DeviceDescriptor, DeviceModel},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextPosition {
    #[default]
    Top,
    Bottom,
}

/// Title/subtitle overlay drawn above or below the devices.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextConfig {
    pub title: String,
    pub subtitle: String,
    pub title_color: String,
    pub subtitle_color: String,
    pub font_family: String,
    pub alignment: TextAlign,
    pub position: TextPosition,
    pub title_size: f64,
    pub subtitle_size: f64,
    pub title_weight: u16,
    pub subtitle_weight: u16,
    pub letter_spacing: f64,
    pub line_height: f64,
    pub text_shadow: bool,
    pub text_shadow_blur: f64,
    pub text_shadow_color: String,
    /// Percentage of the canvas width.
    pub max_width: f64,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            title: "Your App Title".to_owned(),
            subtitle: "Describe your best feature here".to_owned(),
            title_color: "#ffffff".to_owned(),
            subtitle_color: "#e2e8f0".to_owned(),
            font_family: "Inter".to_owned(),
            alignment: TextAlign::Center,
            position: TextPosition::Top,
            title_size: 80.0,
            subtitle_size: 48.0,
            title_weight: 700,
            subtitle_weight: 500,
            letter_spacing: 0.0,
            line_height: 1.2,
            text_shadow: false,
            text_shadow_blur: 12.0,
            text_shadow_color: "#00000026".to_owned(),
            max_width: 100.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundKind {
    Solid,
    #[default]
    Gradient,
    Mesh,
    Pattern,
    Image,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MeshPoint {
    pub id: String,
    /// Percentages of the canvas, `0..=100`.
    pub x: f64,
    pub y: f64,
    pub color: String,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MeshGradientConfig {
    pub points: Vec<MeshPoint>,
    pub blur: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternConfig {
    #[serde(rename = "type")]
    pub kind: String,
    pub color: String,
    pub background_color: String,
    pub size: f64,
    pub spacing: f64,
    pub opacity: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundImageConfig {
    pub src: Option<String>,
    pub blur: f64,
    pub overlay_color: String,
    pub overlay_opacity: f64,
    pub fit: String,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundConfig {
    #[serde(rename = "type")]
    pub kind: BackgroundKind,
    pub color1: String,
    pub color2: String,
    /// CSS-style direction: `to bottom right`, `to left`, `135deg`.
    #[serde(default)]
    pub direction: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh: Option<MeshGradientConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<PatternConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<BackgroundImageConfig>,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            kind: BackgroundKind::Gradient,
            color1: "#4f46e5".to_owned(),
            color2: "#9333ea".to_owned(),
            direction: "to bottom right".to_owned(),
            mesh: None,
            pattern: None,
            image: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScreenConfig {
    pub id: String,
    pub devices: Vec<DeviceDescriptor>,
    pub text: TextConfig,
    pub background: BackgroundConfig,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Screen {
    pub id: String,
    pub name: String,
    pub order: u32,
    pub config: ScreenConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub created_at: u64,
    #[serde(default)]
    pub updated_at: u64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub screens: Vec<Screen>,
    pub active_screen_id: String,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub created_at: u64,
    #[serde(default)]
    pub updated_at: u64,
}

pub fn generate_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64)
}

fn device_id(screen_id: &str) -> String {
    format!("{screen_id}_dev_{}", generate_id())
}

impl ScreenConfig {
    /// The stock single-device layout every new screen starts from.
    pub fn new_default(id: impl Into<String>) -> Self {
        let id = id.into();
        let device = DeviceDescriptor::new(device_id(&id), DeviceModel::Iphone15Pro);
        Self {
            id,
            devices: vec![device],
            text: TextConfig::default(),
            background: BackgroundConfig::default(),
        }
    }

    /// Devices in paint order: ascending z-index, document order among equals.
    pub fn devices_in_paint_order(&self) -> Vec<&DeviceDescriptor> {
        let mut out: Vec<_> = self.devices.iter().collect();
        out.sort_by_key(|d| d.z_index);
        out
    }
}

/// One device slot in a [`ScreenTemplate`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TemplateDevice {
    pub model: DeviceModel,
    pub x: f64,
    pub y: f64,
    pub rotation_z: f64,
    pub rotation_x: f64,
    pub rotation_y: f64,
    pub scale: f64,
    pub z_index: i32,
}

impl TemplateDevice {
    const fn phone(x: f64, y: f64, rotation_z: f64, scale: f64, z_index: i32) -> Self {
        Self {
            model: DeviceModel::Iphone15Pro,
            x,
            y,
            rotation_z,
            rotation_x: 0.0,
            rotation_y: 0.0,
            scale,
            z_index,
        }
    }

    const fn tilted(self, rotation_x: f64, rotation_y: f64) -> Self {
        Self {
            rotation_x,
            rotation_y,
            ..self
        }
    }
}

/// A canned screen layout: device placement plus text anchoring.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ScreenTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    #[serde(skip)]
    pub devices: &'static [TemplateDevice],
    pub alignment: TextAlign,
    pub position: TextPosition,
}

static TEMPLATES: [ScreenTemplate; 6] = [
    ScreenTemplate {
        id: "single-hero",
        name: "Single Hero",
        description: "One centered device",
        devices: &[TemplateDevice::phone(0.0, 0.0, 0.0, 0.9, 1)],
        alignment: TextAlign::Center,
        position: TextPosition::Top,
    },
    ScreenTemplate {
        id: "dual-angled",
        name: "Dual Angled",
        description: "Two phones tilting inwards",
        devices: &[
            TemplateDevice::phone(-250.0, 100.0, -15.0, 0.85, 1),
            TemplateDevice::phone(250.0, 100.0, 15.0, 0.85, 2),
        ],
        alignment: TextAlign::Center,
        position: TextPosition::Top,
    },
    ScreenTemplate {
        id: "three-phones",
        name: "Three Phones",
        description: "A presentation trio",
        devices: &[
            TemplateDevice::phone(-400.0, 150.0, -10.0, 0.75, 1),
            TemplateDevice::phone(400.0, 150.0, 10.0, 0.75, 1),
            TemplateDevice::phone(0.0, 50.0, 0.0, 0.85, 2),
        ],
        alignment: TextAlign::Center,
        position: TextPosition::Top,
    },
    ScreenTemplate {
        id: "tablet-and-phone",
        name: "Tablet & Phone",
        description: "Show responsive design",
        devices: &[
            TemplateDevice {
                model: DeviceModel::IpadPro,
                ..TemplateDevice::phone(-100.0, 100.0, 0.0, 0.9, 1)
            },
            TemplateDevice::phone(350.0, 400.0, -5.0, 0.6, 2),
        ],
        alignment: TextAlign::Left,
        position: TextPosition::Top,
    },
    ScreenTemplate {
        id: "3d-perspective",
        name: "3D Perspective",
        description: "Dramatic 3D angle view",
        devices: &[TemplateDevice::phone(0.0, 50.0, 0.0, 0.95, 1).tilted(10.0, -20.0)],
        alignment: TextAlign::Center,
        position: TextPosition::Top,
    },
    ScreenTemplate {
        id: "3d-showcase",
        name: "3D Showcase",
        description: "Two devices in 3D space",
        devices: &[
            TemplateDevice::phone(-200.0, 50.0, 0.0, 0.8, 1).tilted(5.0, 25.0),
            TemplateDevice::phone(200.0, 50.0, 0.0, 0.8, 2).tilted(5.0, -25.0),
        ],
        alignment: TextAlign::Center,
        position: TextPosition::Top,
    },
];

pub fn templates() -> &'static [ScreenTemplate] {
    &TEMPLATES
}

pub fn find_template(id: &str) -> Option<&'static ScreenTemplate> {
    TEMPLATES.iter().find(|t| t.id == id)
}

impl ScreenConfig {
    /// Replace the devices with the template's slots and reset the text to the stock copy in the
    /// template's anchoring. The background and screen id are kept.
    pub fn apply_template(&mut self, template: &ScreenTemplate) {
        self.devices = template
            .devices
            .iter()
            .map(|slot| DeviceDescriptor {
                x: slot.x,
                y: slot.y,
                rotation_z: slot.rotation_z,
                rotation_x: slot.rotation_x,
                rotation_y: slot.rotation_y,
                scale: slot.scale,
                z_index: slot.z_index,
                ..DeviceDescriptor::new(device_id(&self.id), slot.model)
            })
            .collect();
        self.text = TextConfig {
            alignment: template.alignment,
            position: template.position,
            ..TextConfig::default()
        };
        tracing::debug!(screen = %self.id, template = template.id, "template applied");
    }
}

impl Screen {
    pub fn new(order: u32) -> Self {
        Self::named(order, format!("Screen {}", order + 1))
    }

    pub fn named(order: u32, name: impl Into<String>) -> Self {
        let id = generate_id();
        let now = now_millis();
        Self {
            config: ScreenConfig::new_default(id.clone()),
            id,
            name: name.into(),
            order,
            thumbnail: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Copy `screen` under fresh screen and device ids.
pub fn duplicate_screen(screen: &Screen, order: u32) -> Screen {
    let id = generate_id();
    let now = now_millis();
    let devices = screen
        .config
        .devices
        .iter()
        .map(|d| DeviceDescriptor {
            id: device_id(&id),
            ..d.clone()
        })
        .collect();
    Screen {
        name: format!("{} (copy)", screen.name),
        order,
        config: ScreenConfig {
            id: id.clone(),
            devices,
            ..screen.config.clone()
        },
        thumbnail: screen.thumbnail.clone(),
        created_at: now,
        updated_at: now,
        id,
    }
}

impl Project {
    pub fn new_default(name: Option<&str>) -> Self {
        let first = Screen::new(0);
        let now = now_millis();
        Self {
            id: generate_id(),
            name: name.unwrap_or("My Project").to_owned(),
            active_screen_id: first.id.clone(),
            screens: vec![first],
            animation: AnimationConfig::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn screen(&self, id: &str) -> Option<&Screen> {
        self.screens.iter().find(|s| s.id == id)
    }

    /// The active screen, or the first one if the active id dangles.
    pub fn active_screen(&self) -> Option<&Screen> {
        self.screen(&self.active_screen_id)
            .or_else(|| self.screens.first())
    }

    /// Point a dangling `active_screen_id` at the first screen. Returns whether anything changed.
    pub fn repair_active_screen(&mut self) -> bool {
        if self.screen(&self.active_screen_id).is_some() {
            return false;
        }
        match self.screens.first() {
            Some(first) => {
                tracing::warn!(
                    dangling = %self.active_screen_id,
                    fallback = %first.id,
                    "active screen id repaired"
                );
                self.active_screen_id = first.id.clone();
                true
            }
            None => false,
        }
    }

    pub fn add_screen(&mut self) -> &Screen {
        let order = self.screens.len() as u32;
        self.screens.push(Screen::new(order));
        let idx = self.screens.len() - 1;
        &self.screens[idx]
    }

    pub fn renumber(&mut self) {
        for (i, s) in self.screens.iter_mut().enumerate() {
            s.order = i as u32;
        }
    }
}
