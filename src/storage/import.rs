//! Project file import and export.

use serde_json::Value;

use crate::{
    foundation::error::{MockshotError, MockshotResult},
    scene::project::{Project, now_millis},
};

pub const PROJECT_FORMAT_VERSION: &str = "1.0.0";

/// The on-disk wrapper written by [`export_project`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedProject {
    pub version: String,
    pub exported_at: String,
    pub project: Project,
}

/// Serialize `project` for sharing. Thumbnails are dropped.
pub fn export_project(project: &Project) -> MockshotResult<String> {
    let mut project = project.clone();
    for screen in &mut project.screens {
        screen.thumbnail = None;
    }
    let doc = ExportedProject {
        version: PROJECT_FORMAT_VERSION.to_owned(),
        exported_at: chrono::Utc::now().to_rfc3339(),
        project,
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Suggested file name for an exported project.
pub fn export_file_name(project: &Project) -> String {
    let slug = project
        .name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase();
    format!("mockshot-project-{slug}-{}.json", now_millis())
}

/// Parse and validate a project document, with or without the export wrapper.
///
/// Every structural problem is reported before anything is decoded. The only repair applied is
/// pointing a dangling active screen at the first screen; screen order is renumbered and
/// timestamps refreshed.
#[tracing::instrument(skip(json), fields(bytes = json.len()))]
pub fn import_project(json: &str) -> MockshotResult<Project> {
    let parsed: Value = serde_json::from_str(json)
        .map_err(|e| MockshotError::import(format!("failed to parse project file: {e}")))?;
    if !parsed.is_object() {
        return Err(MockshotError::import("invalid project file format"));
    }
    let mut value = match parsed.get("project") {
        Some(inner) if inner.is_object() => inner.clone(),
        _ => parsed,
    };

    validate_project_value(&value)?;

    // Anything else missing here is repaired below.
    if let Some(obj) = value.as_object_mut() {
        obj.entry("activeScreenId")
            .or_insert_with(|| Value::String(String::new()));
    }

    let mut project: Project = serde_json::from_value(value)
        .map_err(|e| MockshotError::import(format!("invalid project: {e}")))?;

    project.repair_active_screen();
    project.renumber();
    let now = now_millis();
    project.updated_at = now;
    for screen in &mut project.screens {
        screen.updated_at = now;
    }
    tracing::info!(screens = project.screens.len(), "project imported");
    Ok(project)
}

fn non_empty_str(v: &Value, key: &str) -> bool {
    v.get(key)
        .and_then(Value::as_str)
        .is_some_and(|s| !s.is_empty())
}

fn validate_project_value(project: &Value) -> MockshotResult<()> {
    if !non_empty_str(project, "id") {
        return Err(MockshotError::import("invalid project: missing or invalid id"));
    }
    if !non_empty_str(project, "name") {
        return Err(MockshotError::import(
            "invalid project: missing or invalid name",
        ));
    }
    let screens = match project.get("screens").and_then(Value::as_array) {
        Some(s) if !s.is_empty() => s,
        _ => {
            return Err(MockshotError::import(
                "invalid project: screens must be a non-empty array",
            ));
        }
    };

    for (index, screen) in screens.iter().enumerate() {
        if !non_empty_str(screen, "id") {
            return Err(MockshotError::import(format!(
                "invalid screen at index {index}: missing or invalid id"
            )));
        }
        if !non_empty_str(screen, "name") {
            return Err(MockshotError::import(format!(
                "invalid screen at index {index}: missing or invalid name"
            )));
        }
        let Some(config) = screen.get("config").filter(|c| c.is_object()) else {
            return Err(MockshotError::import(format!(
                "invalid screen at index {index}: missing or invalid config"
            )));
        };
        if !non_empty_str(config, "id") {
            return Err(MockshotError::import(format!(
                "screen {index}: invalid config id"
            )));
        }
        if !config.get("devices").is_some_and(Value::is_array) {
            return Err(MockshotError::import(format!(
                "screen {index}: devices must be an array"
            )));
        }
        if !config.get("text").is_some_and(Value::is_object) {
            return Err(MockshotError::import(format!(
                "screen {index}: text config is required"
            )));
        }
        if !config.get("background").is_some_and(Value::is_object) {
            return Err(MockshotError::import(format!(
                "screen {index}: background config is required"
            )));
        }
    }
    Ok(())
}
