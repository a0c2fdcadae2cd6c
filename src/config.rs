//! Editor configuration.
//!
//! Every field has a default, so a config file only needs the values it changes. A few tuning
//! knobs can also be set from the environment.

use std::path::{Path, PathBuf};

use crate::{
    export::GifExportConfig,
    foundation::error::{MockshotError, MockshotResult},
    history::HistoryOptions,
};

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub history: HistoryOptions,
    pub playback: PlaybackSettings,
    pub export: ExportSettings,
    pub storage: StorageSettings,
    pub render: RenderSettings,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Used when neither the project nor the preset gives a duration.
    pub default_duration_ms: u32,
    pub refresh_hz: u32,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            default_duration_ms: 2000,
            refresh_hz: 60,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Extra wait after each seek, on top of the paint cycles capture waits for.
    pub settle_delay_ms: u64,
    pub gif: GifExportConfig,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            settle_delay_ms: 50,
            gif: GifExportConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub path: PathBuf,
    pub save_debounce_ms: u64,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("mockshot-project.json"),
            save_debounce_ms: 1000,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Font file for title/subtitle overlays. When unset a common system font is tried.
    pub font_path: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `mockshot=debug,warn`.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            json: false,
        }
    }
}

impl EditorConfig {
    pub fn load(path: &Path) -> MockshotResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            MockshotError::validation(format!("failed to read config '{}': {e}", path.display()))
        })?;
        let cfg: Self = serde_json::from_str(&text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> MockshotResult<()> {
        if self.playback.refresh_hz == 0 {
            return Err(MockshotError::validation("playback.refresh_hz must be positive"));
        }
        self.export.gif.validate()
    }

    /// Apply `MOCKSHOT_SETTLE_DELAY_MS`, `MOCKSHOT_MAX_HISTORY`, `MOCKSHOT_FONT` and `MOCKSHOT_LOG`.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Like [`EditorConfig::apply_env_overrides`] with an explicit lookup. Unparseable values
    /// are ignored.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(ms) = lookup("MOCKSHOT_SETTLE_DELAY_MS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|&ms| ms <= 10_000)
        {
            self.export.settle_delay_ms = ms;
        }
        if let Some(n) = lookup("MOCKSHOT_MAX_HISTORY")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
        {
            self.history.max_history = n;
        }
        if let Some(font) = lookup("MOCKSHOT_FONT").filter(|v| !v.trim().is_empty()) {
            self.render.font_path = Some(PathBuf::from(font.trim()));
        }
        if let Some(level) = lookup("MOCKSHOT_LOG").filter(|v| !v.trim().is_empty()) {
            self.logging.level = level;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_editor_behavior() {
        let cfg = EditorConfig::default();
        assert_eq!(cfg.history.max_history, 50);
        assert_eq!(cfg.history.debounce_ms, 1000);
        assert_eq!(cfg.export.settle_delay_ms, 50);
        assert_eq!(cfg.export.gif.fps, 15);
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.storage.save_debounce_ms, 1000);
        assert!(cfg.render.font_path.is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let cfg: EditorConfig =
            serde_json::from_str(r#"{"export":{"gif":{"fps":10}},"logging":{"json":true}}"#)
                .unwrap();
        assert_eq!(cfg.export.gif.fps, 10);
        assert_eq!(cfg.export.gif.width, 414);
        assert_eq!(cfg.export.settle_delay_ms, 50);
        assert!(cfg.logging.json);
    }

    #[test]
    fn overrides_skip_invalid_values() {
        let mut cfg = EditorConfig::default();
        cfg.apply_overrides_from(|k| match k {
            "MOCKSHOT_SETTLE_DELAY_MS" => Some("120".to_owned()),
            "MOCKSHOT_MAX_HISTORY" => Some("0".to_owned()),
            "MOCKSHOT_LOG" => Some("debug".to_owned()),
            "MOCKSHOT_FONT" => Some(" fonts/Inter.ttf ".to_owned()),
            _ => None,
        });
        assert_eq!(cfg.export.settle_delay_ms, 120);
        assert_eq!(cfg.history.max_history, 50);
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.render.font_path, Some(PathBuf::from("fonts/Inter.ttf")));

        cfg.apply_overrides_from(|k| (k == "MOCKSHOT_SETTLE_DELAY_MS").then(|| "soon".to_owned()));
        assert_eq!(cfg.export.settle_delay_ms, 120);

        cfg.apply_overrides_from(|k| (k == "MOCKSHOT_MAX_HISTORY").then(|| "7".to_owned()));
        assert_eq!(cfg.history.max_history, 7);
    }

    #[test]
    fn load_rejects_invalid_gif_settings() {
        let path = std::env::temp_dir().join(format!(
            "mockshot_cfg_{}_{}.json",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::write(&path, r#"{"export":{"gif":{"quality":42}}}"#).unwrap();
        assert!(EditorConfig::load(&path).is_err());
        std::fs::remove_file(&path).ok();
    }
}
