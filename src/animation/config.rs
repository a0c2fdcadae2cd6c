use crate::animation::preset::{AnimationPreset, FALLBACK_DURATION_MS, find_preset};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Per-project animation settings, persisted verbatim inside the project document.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationConfig {
    pub enabled: bool,
    pub preset_id: Option<String>,
    /// Loop length in milliseconds; `0` defers to the preset's own duration.
    #[serde(rename = "duration")]
    pub duration_ms: u32,
    #[serde(rename = "loop")]
    pub loop_: bool,
    /// Last published position, `[0, 1]`.
    #[serde(default)]
    pub current_time: f64,
    #[serde(default)]
    pub playback_state: PlaybackState,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            preset_id: None,
            duration_ms: FALLBACK_DURATION_MS,
            loop_: true,
            current_time: 0.0,
            playback_state: PlaybackState::Stopped,
        }
    }
}

impl AnimationConfig {
    /// An enabled config for `preset_id` using the preset's duration.
    pub fn for_preset(preset_id: &str) -> Self {
        Self {
            enabled: true,
            preset_id: Some(preset_id.to_owned()),
            duration_ms: find_preset(preset_id).map_or(FALLBACK_DURATION_MS, |p| p.duration_ms),
            ..Self::default()
        }
    }

    pub fn preset(&self) -> Option<&'static AnimationPreset> {
        self.preset_id.as_deref().and_then(find_preset)
    }

    /// The preset to animate with, or `None` when animation is off.
    pub fn active_preset(&self) -> Option<&'static AnimationPreset> {
        if !self.enabled {
            return None;
        }
        self.preset()
    }

    pub fn effective_duration_ms(&self) -> u32 {
        if self.duration_ms > 0 {
            return self.duration_ms;
        }
        self.preset()
            .map(|p| p.duration_ms)
            .filter(|&d| d > 0)
            .unwrap_or(FALLBACK_DURATION_MS)
    }
}
