//! Instance record: one script binding's configuration,
//! held behind a bounded-timeout read-write lock, using `parking_lot`'s
//! timed `try_read_for`/`try_write_for` instead of an unconditional
//! `.lock()` so a stuck caller times out and logs rather than blocking
//! the whole process indefinitely.

use dsep_core::{Activation, DefaultType, DseError, InputType, InstanceName, Persistence, Scope, StateFlags};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::path::Path;
use std::time::Duration;

/// Bounded acquisition timeout for a single instance's lock.
pub const INSTANCE_LOCK_TIMEOUT: Duration = Duration::from_millis(250);

/// Current schema version for persisted instance records.
pub const SAVED_PROPERTIES_VERSION: u32 = 2;

/// The versioned, self-describing serialization of an instance's
/// configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceData {
    #[serde(default = "current_version")]
    pub version: u32,
    pub scope: Scope,
    pub input_type: InputType,
    pub source: String,
    pub file: String,
    pub module_alias: String,
    pub default_value: String,
    pub default_type: DefaultType,
    pub create_state: bool,
    pub repeat_delay: i64,
    pub repeat_rate: i64,
    /// `< 0` means unbounded; counts repeat-timer ticks, not the initial
    /// `OnPress` evaluation.
    #[serde(default = "default_max_repeat_count")]
    pub max_repeat_count: i64,
    pub engine_name: String,
    pub state_category: String,
    pub state_name: String,
    pub persistence: Persistence,
    pub activation: Activation,
    #[serde(default)]
    pub stored_data: JsonValue,
}

fn current_version() -> u32 {
    SAVED_PROPERTIES_VERSION
}

fn default_max_repeat_count() -> i64 {
    -1
}

impl Default for InstanceData {
    fn default() -> Self {
        InstanceData {
            version: SAVED_PROPERTIES_VERSION,
            scope: Scope::Shared,
            input_type: InputType::Expression,
            source: String::new(),
            file: String::new(),
            module_alias: dsep_core::DEFAULT_MODULE_ALIAS.to_string(),
            default_value: String::new(),
            default_type: DefaultType::None,
            create_state: true,
            repeat_delay: -1,
            repeat_rate: -1,
            max_repeat_count: -1,
            engine_name: dsep_core::SHARED_ENGINE_NAME.to_string(),
            state_category: String::new(),
            state_name: String::new(),
            persistence: Persistence::Session,
            activation: Activation::ON_PRESS,
            stored_data: JsonValue::Null,
        }
    }
}

/// Deserialize a persisted record, migrating older schema versions.
/// Version 1 records numbered `input_type` differently (legacy
/// `Unknown=0, Expression=1, ScriptFile=2, Module=3` vs. current
/// `Expression=0, ScriptFile=1, Module=2`) — see `InputType::from_legacy_u8`.
pub fn migrate_instance_data(mut value: JsonValue) -> Result<InstanceData, DseError> {
    let version = value.get("version").and_then(JsonValue::as_u64).unwrap_or(1) as u32;
    if version < SAVED_PROPERTIES_VERSION {
        if let Some(legacy) = value.get("input_type").and_then(JsonValue::as_u64) {
            let migrated = InputType::from_legacy_u8(legacy as u8).ok_or_else(|| {
                DseError::PersistenceError(format!("unknown legacy input_type {legacy}"))
            })?;
            value["input_type"] = JsonValue::String(migrated.name().to_string());
        }
        value["version"] = JsonValue::from(SAVED_PROPERTIES_VERSION);
    }
    serde_json::from_value(value).map_err(|e| DseError::PersistenceError(e.to_string()))
}

/// Mutable state behind the instance lock: configuration, lifecycle flags,
/// and the monotonically increasing repeater id ("repeater identity").
#[derive(Debug, Clone)]
pub struct InstanceState {
    pub data: InstanceData,
    pub flags: StateFlags,
    pub repeater_id: u64,
    /// Repeat-timer ticks delivered since the current repeater started;
    /// reset whenever a fresh repeater id is issued.
    pub repeat_count: i64,
}

pub struct Instance {
    pub name: InstanceName,
    state: RwLock<InstanceState>,
}

impl Instance {
    /// A freshly unbound instance is `Uninitialized`.
    pub fn new(name: InstanceName, data: InstanceData) -> Self {
        Instance {
            name,
            state: RwLock::new(InstanceState {
                data,
                flags: StateFlags::UNINITIALIZED,
                repeater_id: 0,
                repeat_count: 0,
            }),
        }
    }

    pub fn read(&self) -> Result<parking_lot::RwLockReadGuard<'_, InstanceState>, DseError> {
        self.state.try_read_for(INSTANCE_LOCK_TIMEOUT).ok_or(DseError::LockTimeout(INSTANCE_LOCK_TIMEOUT))
    }

    pub fn write(&self) -> Result<parking_lot::RwLockWriteGuard<'_, InstanceState>, DseError> {
        self.state
            .try_write_for(INSTANCE_LOCK_TIMEOUT)
            .ok_or(DseError::LockTimeout(INSTANCE_LOCK_TIMEOUT))
    }

    /// Apply a script-source update. Validates: a
    /// non-empty expression for `Expression` inputs, an existing file for
    /// `ScriptFile`/`Module` inputs. Validation failures set
    /// `PropertyError`/`FileLoadError` flags rather than returning `Err` —
    /// only a lock timeout does that, matching "do not raise".
    pub fn apply_source(
        &self,
        input_type: InputType,
        source: String,
        file: String,
    ) -> Result<StateFlags, DseError> {
        let mut guard = self.write()?;
        guard.flags = guard.flags.clear(StateFlags::PROPERTY_ERROR).clear(StateFlags::FILE_LOAD_ERROR);

        match input_type {
            InputType::Expression => {
                if source.trim().is_empty() {
                    guard.flags = guard.flags.set(StateFlags::PROPERTY_ERROR);
                }
            }
            InputType::ScriptFile | InputType::Module => {
                if file.is_empty() || !Path::new(&file).exists() {
                    guard.flags = guard.flags.set(StateFlags::FILE_LOAD_ERROR);
                }
            }
        }

        guard.data.input_type = input_type;
        guard.data.source = source;
        guard.data.file = file;
        guard.flags = guard.flags.clear(StateFlags::UNINITIALIZED);
        Ok(guard.flags)
    }

    pub fn is_critical(&self) -> Result<bool, DseError> {
        Ok(self.read()?.flags.is_critical())
    }

    /// Bump and return the new repeater id, invalidating any in-flight
    /// timer callback that still carries the old one.
    pub fn next_repeater_id(&self) -> Result<u64, DseError> {
        let mut guard = self.write()?;
        guard.repeater_id += 1;
        guard.repeat_count = 0;
        Ok(guard.repeater_id)
    }

    pub fn to_versioned_json(&self) -> Result<JsonValue, DseError> {
        let guard = self.read()?;
        serde_json::to_value(&guard.data).map_err(|e| DseError::PersistenceError(e.to_string()))
    }
}

#[cfg(test)]
#[path = "instance_tests.rs"]
mod tests;
