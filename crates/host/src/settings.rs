//! Persisted settings file: a JSON object with a `Settings Version` key,
//! a `DynamicStates` group mapping instance name → the instance's
//! versioned `stored_data` record, and a `Plugin` group holding the
//! process-wide repeat defaults and the scripts base directory.

use dsep_registry::InstanceData;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::path::Path;

/// Current on-disk settings schema version.
pub const SETTINGS_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginSettings {
    pub default_repeat_rate_ms: i64,
    pub default_repeat_delay_ms: i64,
    pub scripts_base_dir: String,
}

impl Default for PluginSettings {
    fn default() -> Self {
        PluginSettings {
            default_repeat_rate_ms: dsep_registry::MIN_REPEAT_MS,
            default_repeat_delay_ms: dsep_registry::MIN_REPEAT_MS,
            scripts_base_dir: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistedSettings {
    #[serde(rename = "Settings Version")]
    pub version: u32,
    #[serde(rename = "DynamicStates", default)]
    pub dynamic_states: HashMap<String, JsonValue>,
    #[serde(rename = "Plugin", default)]
    pub plugin: PluginSettings,
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed settings file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Load the settings file, migrating an older `version` forward to
/// [`SETTINGS_VERSION`] if needed. A missing file loads as defaults.
pub fn load(path: &Path) -> Result<PersistedSettings, SettingsError> {
    if !path.exists() {
        return Ok(PersistedSettings { version: SETTINGS_VERSION, ..Default::default() });
    }
    let raw = std::fs::read_to_string(path)?;
    let mut settings: PersistedSettings = serde_json::from_str(&raw)?;
    migrate(&mut settings);
    Ok(settings)
}

pub fn save(path: &Path, settings: &PersistedSettings) -> Result<(), SettingsError> {
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, json)?;
    Ok(())
}

fn migrate(settings: &mut PersistedSettings) {
    if settings.version < SETTINGS_VERSION {
        settings.version = SETTINGS_VERSION;
    }
}

/// Deserialize one saved instance record, skipping (and logging) it rather
/// than failing the whole load — a single corrupt or unknown-version
/// record must not take the rest of the persisted instances down with it.
pub fn load_instance_record(name: &str, raw: &JsonValue) -> Option<InstanceData> {
    match dsep_registry::migrate_instance_data(raw.clone()) {
        Ok(data) => Some(data),
        Err(err) => {
            tracing::warn!(instance = name, error = %err, "skipping unreadable saved instance");
            None
        }
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
