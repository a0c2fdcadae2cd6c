//! Project persistence behind an injected port.

pub mod import;

use std::path::{Path, PathBuf};

use crate::{
    foundation::{
        error::{MockshotError, MockshotResult},
        time::{Debouncer, TimeSource},
    },
    scene::project::{Project, Screen},
};

pub use import::{ExportedProject, PROJECT_FORMAT_VERSION, export_project, import_project};

pub const DEFAULT_SAVE_DEBOUNCE_MS: u64 = 1000;

/// Where the editor keeps its working project.
pub trait ProjectStore {
    /// The stored project, repaired, or `None` if nothing usable is stored.
    fn load(&self) -> Option<Project>;

    /// Schedule a write. Later calls within the debounce window replace earlier ones.
    fn save(&mut self, project: &Project);

    /// Write immediately, dropping any scheduled write.
    fn save_now(&mut self, project: &Project) -> MockshotResult<()>;

    fn clear(&mut self) -> MockshotResult<()>;

    /// Perform a scheduled write whose debounce has elapsed. Returns whether a write happened.
    fn poll(&mut self) -> MockshotResult<bool> {
        Ok(false)
    }
}

/// Parse a stored document, rejecting anything structurally unusable and repairing the rest.
pub fn parse_stored(json: &str) -> Option<Project> {
    let value: serde_json::Value = match serde_json::from_str(json) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "stored project is not valid json");
            return None;
        }
    };
    let has_id = value
        .get("id")
        .and_then(|v| v.as_str())
        .is_some_and(|s| !s.is_empty());
    let has_screens = value.get("screens").is_some_and(|v| v.is_array());
    if !has_id || !has_screens {
        tracing::warn!("stored project has an invalid structure, ignoring it");
        return None;
    }
    let mut project: Project = match serde_json::from_value(value) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(error = %e, "stored project could not be decoded");
            return None;
        }
    };
    repair_loaded(&mut project);
    Some(project)
}

/// An empty screen list gets one default screen; a dangling active id falls back to the first.
pub fn repair_loaded(project: &mut Project) {
    if project.screens.is_empty() {
        let screen = Screen::new(0);
        project.active_screen_id = screen.id.clone();
        project.screens.push(screen);
    }
    project.repair_active_screen();
}

/// One JSON file on disk with debounced writes.
pub struct JsonFileStore<C> {
    path: PathBuf,
    clock: C,
    debounce: Debouncer,
    pending: Option<String>,
}

impl<C: TimeSource> JsonFileStore<C> {
    pub fn new(path: impl Into<PathBuf>, clock: C, debounce_ms: u64) -> Self {
        Self {
            path: path.into(),
            clock,
            debounce: Debouncer::new(debounce_ms),
            pending: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has_pending_write(&self) -> bool {
        self.pending.is_some()
    }

    #[tracing::instrument(skip(self, json), fields(path = %self.path.display(), bytes = json.len()))]
    fn write(&self, json: &str) -> MockshotResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                MockshotError::storage(format!(
                    "failed to create directory '{}': {e}",
                    parent.display()
                ))
            })?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| {
            MockshotError::storage(format!("failed to write '{}': {e}", tmp.display()))
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            MockshotError::storage(format!(
                "failed to move '{}' into place: {e}",
                self.path.display()
            ))
        })?;
        tracing::debug!("project saved");
        Ok(())
    }
}

impl<C: TimeSource> ProjectStore for JsonFileStore<C> {
    fn load(&self) -> Option<Project> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read stored project");
                return None;
            }
        };
        parse_stored(&json)
    }

    fn save(&mut self, project: &Project) {
        match serde_json::to_string(project) {
            Ok(json) => {
                self.pending = Some(json);
                self.debounce.arm(self.clock.now_ms());
            }
            Err(e) => tracing::error!(error = %e, "failed to serialize project for saving"),
        }
    }

    fn save_now(&mut self, project: &Project) -> MockshotResult<()> {
        self.debounce.cancel();
        self.pending = None;
        let json = serde_json::to_string(project)?;
        self.write(&json)
    }

    fn poll(&mut self) -> MockshotResult<bool> {
        if !self.debounce.fire_if_due(self.clock.now_ms()) {
            return Ok(false);
        }
        let Some(json) = self.pending.take() else {
            return Ok(false);
        };
        self.write(&json)?;
        Ok(true)
    }

    fn clear(&mut self) -> MockshotResult<()> {
        self.debounce.cancel();
        self.pending = None;
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MockshotError::storage(format!(
                "failed to remove '{}': {e}",
                self.path.display()
            ))),
        }
    }
}

/// In-memory store; saves land immediately.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    json: Option<String>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(json: impl Into<String>) -> Self {
        Self {
            json: Some(json.into()),
            saves: 0,
        }
    }

    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl ProjectStore for MemoryStore {
    fn load(&self) -> Option<Project> {
        self.json.as_deref().and_then(parse_stored)
    }

    fn save(&mut self, project: &Project) {
        if let Err(e) = self.save_now(project) {
            tracing::error!(error = %e, "failed to save project");
        }
    }

    fn save_now(&mut self, project: &Project) -> MockshotResult<()> {
        self.json = Some(serde_json::to_string(project)?);
        self.saves += 1;
        Ok(())
    }

    fn clear(&mut self) -> MockshotResult<()> {
        self.json = None;
        Ok(())
    }
}
