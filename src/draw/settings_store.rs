use crate::draw::settings::CanvasSettings;
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

pub const CANVAS_SETTINGS_FILE_NAME: &str = "brush_settings.json";

pub fn settings_path_from_exe_path(exe_path: &Path) -> Result<PathBuf> {
    let parent = exe_path
        .parent()
        .ok_or_else(|| anyhow!("executable path has no parent: {}", exe_path.display()))?;
    Ok(parent.join(CANVAS_SETTINGS_FILE_NAME))
}

pub fn resolve_settings_path() -> Result<PathBuf> {
    let exe_path = std::env::current_exe().context("resolve current executable")?;
    settings_path_from_exe_path(&exe_path)
}

pub fn load() -> Result<CanvasSettings> {
    let path = resolve_settings_path()?;
    load_from_path(&path)
}

pub fn save(settings: &CanvasSettings) -> Result<PathBuf> {
    let path = resolve_settings_path()?;
    save_to_path(&path, settings)?;
    Ok(path)
}

/// Missing or blank files yield defaults; anything loaded is sanitized.
pub fn load_from_path(path: &Path) -> Result<CanvasSettings> {
    if !path.exists() {
        return Ok(CanvasSettings::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read brush settings file {}", path.display()))?;

    if content.trim().is_empty() {
        return Ok(CanvasSettings::default());
    }

    let mut loaded: CanvasSettings = serde_json::from_str(&content)
        .with_context(|| format!("deserialize brush settings file {}", path.display()))?;
    loaded.sanitize();
    Ok(loaded)
}

pub fn save_to_path(path: &Path, settings: &CanvasSettings) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create brush settings parent folder {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(settings).context("serialize brush settings")?;
    std::fs::write(path, json)
        .with_context(|| format!("write brush settings file {}", path.display()))?;
    Ok(())
}
