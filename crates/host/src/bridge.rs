//! Host Bridge (C7): translates inbound [`crate::messages::HostInput`]
//! messages into registry/scheduler/connector-store operations and
//! produces the [`HostOutput`] messages the wire layer sends back.
//!
//! Per-message effects follow the dispatch table: `info`/`settings` prime
//! process state and emit the initial state lists; `action`/`down`/`up`
//! drive the scheduler; `connectorChange` both feeds the scheduler and
//! publishes a `connectorUpdate`; `shortConnectorIdNotification` patches
//! the matching connector store row's short id; `broadcast` updates the
//! current-page state; `notificationOptionClicked` and `closePlugin` are
//! handled directly here. Plugin-control actions additionally cover
//! `save`/`load`/`deleteSavedInstance` against the settings file.

use crate::action_id::{self, Handler};
use crate::error::HostError;
use crate::messages::{ActionDataItem, HostInput};
use dsep_core::{
    state_id, Activation, Clock, ConnectorRecord, DefaultType, ErrorCounter, Filter, HostOutput,
    InputType, InstanceName, Persistence, Scope, ScriptError, ShortId,
};
use dsep_engine::ScriptValue;
use dsep_registry::{DeleteFilter, InstanceData, ProcessDefaults, Registry};
use dsep_store::ConnectorStore;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Process-wide state the bridge reads and mutates in response to host
/// messages, separate from the registry/connector store so it can be
/// shared with whatever builds the host-API globals for a fresh engine.
pub struct BridgeState {
    pub scripts_base_dir: RwLock<String>,
    pub tp_current_page: RwLock<String>,
    pub errors: ErrorCounter,
    /// Path of the persisted settings file; `None` means `save`/`load`/
    /// `deleteSavedInstance` plugin actions have nothing to act on, which
    /// is the case for every bridge built outside the CLI bootstrap.
    pub settings_path: RwLock<Option<std::path::PathBuf>>,
}

impl Default for BridgeState {
    fn default() -> Self {
        BridgeState {
            scripts_base_dir: RwLock::new(String::new()),
            tp_current_page: RwLock::new(String::new()),
            errors: ErrorCounter::new(),
            settings_path: RwLock::new(None),
        }
    }
}

pub struct HostBridge<C: Clock> {
    registry: Arc<Registry>,
    connectors: ConnectorStore,
    defaults: ProcessDefaults,
    state: Arc<BridgeState>,
    clock: C,
    single_shot_count: AtomicU64,
}

fn folded(data: &[ActionDataItem]) -> HashMap<String, String> {
    action_id::fold_action_data(&data.iter().map(|d| (d.id.clone(), d.value.clone())).collect::<Vec<_>>())
}

fn parse_scope(fields: &HashMap<String, String>) -> Scope {
    fields.get("scope").and_then(|v| Scope::from_name(v)).unwrap_or(Scope::Shared)
}

fn parse_default_type(fields: &HashMap<String, String>) -> DefaultType {
    fields.get("defaultType").and_then(|v| DefaultType::from_name(v)).unwrap_or(DefaultType::None)
}

fn parse_input_type(fields: &HashMap<String, String>) -> InputType {
    fields.get("inputType").and_then(|v| InputType::from_name(v)).unwrap_or(InputType::Expression)
}

impl<C: Clock> HostBridge<C> {
    pub fn new(
        registry: Arc<Registry>,
        connectors: ConnectorStore,
        defaults: ProcessDefaults,
        state: Arc<BridgeState>,
        clock: C,
    ) -> Self {
        HostBridge { registry, connectors, defaults, state, clock, single_shot_count: AtomicU64::new(0) }
    }

    /// Dispatch one inbound message, returning every outbound message it
    /// produces (zero, one, or many — `info`/`settings` reply with the
    /// whole initial state list).
    pub async fn handle(&self, msg: HostInput) -> Result<Vec<HostOutput>, HostError> {
        match msg {
            HostInput::Info { .. } => Ok(self.initial_state_burst()),
            HostInput::Settings { values } => {
                for entry in &values {
                    if entry.name.starts_with("Script Files") {
                        let mut dir = entry.value.replace('\\', "/");
                        if !dir.ends_with('/') {
                            dir.push('/');
                        }
                        *self.state.scripts_base_dir.write() = dir;
                    }
                }
                Ok(self.initial_state_burst())
            }
            HostInput::Action { action_id, data } => self.dispatch_action(&action_id, &data).await,
            HostInput::Down { action_id, data } => self.dispatch_button(&action_id, &data, true).await,
            HostInput::Up { action_id, data } => self.dispatch_button(&action_id, &data, false).await,
            HostInput::ConnectorChange { connector_id, short_id, value, data } => {
                self.handle_connector_change(connector_id, short_id, value, &data).await
            }
            HostInput::ShortConnectorIdNotification { connector_id, short_id } => {
                self.handle_short_connector_notification(&connector_id, short_id);
                Ok(vec![])
            }
            HostInput::ListChange { .. } => {
                // Forwarded to a script-registered listener in the original
                // plugin; no callable-registration path exists at the
                // engine layer here, so this is a deliberate no-op.
                Ok(vec![])
            }
            HostInput::Broadcast { page_name, .. } => {
                *self.state.tp_current_page.write() = page_name;
                Ok(vec![])
            }
            HostInput::NotificationOptionClicked { notification_id, option_id } => {
                tracing::warn!(notification_id, option_id, "no callback registered for notification option");
                Ok(vec![])
            }
            HostInput::ClosePlugin {} => {
                self.registry.delete(DeleteFilter::All);
                Ok(vec![])
            }
        }
    }

    fn initial_state_burst(&self) -> Vec<HostOutput> {
        self.registry
            .instance_names()
            .into_iter()
            .filter_map(|name| {
                let inst = self.registry.get(&name)?;
                let guard = inst.read().ok()?;
                if !guard.data.create_state {
                    return None;
                }
                Some(HostOutput::CreateState {
                    id: state_id(name.as_str()),
                    parent_group: "Dynamic Values".to_string(),
                    desc: name.as_str().to_string(),
                    default_value: guard.data.default_value.clone(),
                })
            })
            .collect()
    }

    async fn dispatch_action(&self, action_id: &str, data: &[ActionDataItem]) -> Result<Vec<HostOutput>, HostError> {
        let parsed = match action_id::parse(action_id) {
            Ok(p) => p,
            Err(err) => {
                tracing::warn!(action_id, error = %err, "malformed action id");
                return Ok(vec![]);
            }
        };
        let fields = folded(data);
        match parsed.handler {
            Handler::Script => self.script_action(&parsed.operation, &fields).await,
            Handler::Plugin => self.plugin_action(&parsed.operation, &fields).await,
        }
    }

    async fn script_action(
        &self,
        operation: &str,
        fields: &HashMap<String, String>,
    ) -> Result<Vec<HostOutput>, HostError> {
        let single_shot = operation == "oneshot";
        let name = if single_shot {
            format!("ANON_{}", self.single_shot_count.fetch_add(1, Ordering::Relaxed) + 1)
        } else {
            match fields.get("name") {
                Some(n) if !n.trim().is_empty() => n.clone(),
                _ => return Ok(vec![self.validation_error("", "script state name missing")]),
            }
        };
        let instance_name = match InstanceName::new(&name) {
            Ok(n) => n,
            Err(_) => return Ok(vec![self.validation_error(&name, "empty instance name")]),
        };

        if operation == "update" {
            let expr = fields.get("expr").cloned().unwrap_or_default();
            if self.registry.get(&instance_name).is_none() {
                return Ok(vec![self.validation_error(&name, "instance not found for update")]);
            }
            let outcome = self.registry.update(&instance_name, expr).await?;
            return Ok(self.outcome_to_output(&name, outcome.evaluated, outcome.error));
        }

        let scope = parse_scope(fields);
        let input_type = match operation {
            "load" => InputType::ScriptFile,
            "import" => InputType::Module,
            "oneshot" => parse_input_type(fields),
            _ => InputType::Expression,
        };
        let source = fields.get("expr").cloned().unwrap_or_default();
        let file = fields.get("file").cloned().unwrap_or_default();
        let alias = fields.get("alias").cloned().unwrap_or_default();
        let default_type = if single_shot { DefaultType::None } else { parse_default_type(fields) };
        let default_value = fields.get("default").cloned().unwrap_or_default();
        let activation = fields.get("activation").map(|v| Activation::parse(v)).unwrap_or(Activation::ON_PRESS);
        let repeat_delay = fields.get("repeatDelay").and_then(|v| v.parse::<i64>().ok()).unwrap_or(-1);
        let repeat_rate = fields.get("repeatRate").and_then(|v| v.parse::<i64>().ok()).unwrap_or(-1);
        let max_repeat_count = fields.get("maxRepeatCount").and_then(|v| v.parse::<i64>().ok()).unwrap_or(-1);

        let data = InstanceData {
            scope,
            input_type,
            source,
            file: self.resolve_path(&file),
            module_alias: if alias.is_empty() { dsep_core::DEFAULT_MODULE_ALIAS.to_string() } else { alias },
            default_value,
            default_type,
            engine_name: if scope == Scope::Shared { dsep_core::SHARED_ENGINE_NAME.to_string() } else { name.clone() },
            persistence: if single_shot { Persistence::Temporary } else { Persistence::Session },
            activation,
            repeat_delay,
            repeat_rate,
            max_repeat_count,
            ..InstanceData::default()
        };

        let instance = self.registry.get_or_create(instance_name.clone(), data).await?;
        let (input_type, source, file) = {
            let guard = instance.read()?;
            (guard.data.input_type, guard.data.source.clone(), guard.data.file.clone())
        };
        let flags = instance.apply_source(input_type, source, file)?;
        if flags.is_critical() {
            let msg = if flags.contains(dsep_core::StateFlags::FILE_LOAD_ERROR) {
                "file load failed"
            } else {
                "empty expression"
            };
            return Ok(vec![self.validation_error(&name, msg)]);
        }

        let mut out = vec![];
        if !single_shot && instance.read()?.data.create_state {
            out.push(HostOutput::CreateState {
                id: state_id(&name),
                parent_group: "Dynamic Values".to_string(),
                desc: name.clone(),
                default_value: instance.read()?.data.default_value.clone(),
            });
        }
        let outcome = self.registry.press(&instance_name).await?;
        out.extend(self.outcome_to_output(&name, outcome.evaluated, outcome.error));
        Ok(out)
    }

    async fn plugin_action(
        &self,
        operation: &str,
        fields: &HashMap<String, String>,
    ) -> Result<Vec<HostOutput>, HostError> {
        let mut out = vec![];
        match operation {
            "deleteScript" => {
                self.registry.delete(self.resolve_scope_filter(fields));
            }
            "deleteEngine" | "reset" => {
                self.registry.reset(self.resolve_scope_filter(fields)).await?;
            }
            "setRepeatRate" => {
                if let Some(v) = fields.get("value").and_then(|v| v.parse::<i64>().ok()) {
                    self.defaults.set_repeat_rate_ms(v);
                }
            }
            "incRepeatRate" => {
                let delta = fields.get("value").and_then(|v| v.parse::<i64>().ok()).unwrap_or(0);
                self.defaults.increment_repeat_rate_ms(delta);
            }
            "decRepeatRate" => {
                let delta = fields.get("value").and_then(|v| v.parse::<i64>().ok()).unwrap_or(0);
                self.defaults.decrement_repeat_rate_ms(delta);
            }
            "setRepeatDelay" => {
                if let Some(v) = fields.get("value").and_then(|v| v.parse::<i64>().ok()) {
                    self.defaults.set_repeat_delay_ms(v);
                }
            }
            "incRepeatDelay" => {
                let delta = fields.get("value").and_then(|v| v.parse::<i64>().ok()).unwrap_or(0);
                self.defaults.increment_repeat_delay_ms(delta);
            }
            "decRepeatDelay" => {
                let delta = fields.get("value").and_then(|v| v.parse::<i64>().ok()).unwrap_or(0);
                self.defaults.decrement_repeat_delay_ms(delta);
            }
            "save" => self.save_all()?,
            "load" => {
                if let Some(name) = fields.get("name") {
                    out.extend(self.load_saved_instance(name).await?);
                } else {
                    out.push(self.validation_error("", "load requires a name"));
                }
            }
            "deleteSavedInstance" => {
                if let Some(name) = fields.get("name") {
                    self.delete_saved_instance(name)?;
                }
            }
            _ => tracing::warn!(operation, "unknown plugin action"),
        }
        Ok(out)
    }

    /// Writes every `Saved`-persistence instance plus the process defaults
    /// and scripts base dir to the configured settings file. A no-op
    /// (logged) when no path has been configured.
    fn save_all(&self) -> Result<(), HostError> {
        let Some(path) = self.state.settings_path.read().clone() else {
            tracing::warn!("no settings path configured, skipping save");
            return Ok(());
        };
        let mut persisted = crate::settings::load(&path).map_err(|e| HostError::Settings(e.to_string()))?;
        persisted.plugin.default_repeat_rate_ms = self.defaults.repeat_rate_ms();
        persisted.plugin.default_repeat_delay_ms = self.defaults.repeat_delay_ms();
        persisted.plugin.scripts_base_dir = self.state.scripts_base_dir.read().clone();
        persisted.dynamic_states.clear();
        for name in self.registry.instance_names() {
            let Some(inst) = self.registry.get(&name) else { continue };
            let is_saved = matches!(inst.read(), Ok(guard) if guard.data.persistence == Persistence::Saved);
            if is_saved {
                if let Ok(json) = inst.to_versioned_json() {
                    persisted.dynamic_states.insert(name.as_str().to_string(), json);
                }
            }
        }
        crate::settings::save(&path, &persisted).map_err(|e| HostError::Settings(e.to_string()))
    }

    /// Restores one instance from the settings file's `DynamicStates`
    /// group into the registry and presses it once.
    async fn load_saved_instance(&self, name: &str) -> Result<Vec<HostOutput>, HostError> {
        let Some(path) = self.state.settings_path.read().clone() else {
            return Ok(vec![self.validation_error(name, "no settings path configured")]);
        };
        let persisted = crate::settings::load(&path).map_err(|e| HostError::Settings(e.to_string()))?;
        let Some(raw) = persisted.dynamic_states.get(name) else {
            return Ok(vec![self.validation_error(name, "no saved instance by that name")]);
        };
        let Some(data) = crate::settings::load_instance_record(name, raw) else {
            return Ok(vec![self.validation_error(name, "saved instance record is corrupt")]);
        };
        let instance_name = InstanceName::from(name);
        self.registry.get_or_create(instance_name.clone(), data).await?;
        let outcome = self.registry.press(&instance_name).await?;
        Ok(self.outcome_to_output(name, outcome.evaluated, outcome.error))
    }

    fn delete_saved_instance(&self, name: &str) -> Result<(), HostError> {
        let Some(path) = self.state.settings_path.read().clone() else {
            return Ok(());
        };
        let mut persisted = crate::settings::load(&path).map_err(|e| HostError::Settings(e.to_string()))?;
        persisted.dynamic_states.remove(name);
        crate::settings::save(&path, &persisted).map_err(|e| HostError::Settings(e.to_string()))
    }

    fn resolve_scope_filter(&self, fields: &HashMap<String, String>) -> DeleteFilter {
        match fields.get("name") {
            Some(n) if n != "All" => DeleteFilter::Named(InstanceName::from(n.as_str())),
            _ => match fields.get("scope").and_then(|v| Scope::from_name(v)) {
                Some(Scope::Shared) => DeleteFilter::AllShared,
                Some(Scope::Private) => DeleteFilter::AllPrivate,
                None => DeleteFilter::All,
            },
        }
    }

    async fn dispatch_button(
        &self,
        action_id: &str,
        data: &[ActionDataItem],
        is_down: bool,
    ) -> Result<Vec<HostOutput>, HostError> {
        let fields = folded(data);
        let Some(name) = fields.get("name") else {
            tracing::warn!(action_id, "button action missing instance name");
            return Ok(vec![]);
        };
        let instance_name = InstanceName::from(name.as_str());
        if self.registry.get(&instance_name).is_none() {
            return Ok(vec![]);
        }
        let outcome = if is_down {
            self.registry.press(&instance_name).await?
        } else {
            self.registry.release(&instance_name).await?
        };
        Ok(self.outcome_to_output(name, outcome.evaluated, outcome.error))
    }

    async fn handle_connector_change(
        &self,
        connector_id: String,
        short_id: Option<String>,
        value: u8,
        data: &[ActionDataItem],
    ) -> Result<Vec<HostOutput>, HostError> {
        let fields = folded(data);
        let mut out = vec![];
        if let Some(name) = fields.get("name") {
            let instance_name = InstanceName::from(name.as_str());
            if self.registry.get(&instance_name).is_some() {
                let outcome = self.registry.press(&instance_name).await?;
                out.extend(self.outcome_to_output(name, outcome.evaluated, outcome.error));
            }
        }
        out.push(HostOutput::ConnectorUpdate { short_id, connector_id: Some(connector_id), value });
        Ok(out)
    }

    /// A short id confirmation doesn't carry the connector's full binding —
    /// it patches whichever existing row this connector id already names.
    fn handle_short_connector_notification(&self, connector_id: &str, short_id: String) {
        let filter = Filter { connector_id: Some(connector_id.to_string()), ..Filter::new() };
        let now_ms = self.clock.epoch_ms();
        for mut record in self.connectors.query(&filter) {
            record.short_id = ShortId::from(short_id.as_str());
            self.connectors.upsert(record, now_ms);
        }
    }

    /// Looks up connector records matching `filter`, a direct pass-through
    /// for scripts calling `TP.queryConnectors`/`TP.getConnectorByShortId`.
    pub fn query_connectors(&self, filter: &Filter) -> Vec<ConnectorRecord> {
        self.connectors.query(filter)
    }

    fn resolve_path(&self, file: &str) -> String {
        if file.is_empty() || file.starts_with('/') {
            return file.to_string();
        }
        format!("{}{}", self.state.scripts_base_dir.read(), file)
    }

    fn validation_error(&self, instance: &str, message: &str) -> HostOutput {
        let epoch_ms = self.clock.epoch_ms();
        let text = self.state.errors.record(instance, message, epoch_ms);
        HostOutput::SettingUpdate { name: "lastError".to_string(), value: text }
    }

    fn outcome_to_output(
        &self,
        name: &str,
        evaluated: Option<ScriptValue>,
        error: Option<ScriptError>,
    ) -> Vec<HostOutput> {
        let mut out = vec![];
        if let Some(value) = evaluated {
            out.push(HostOutput::StateUpdate { id: state_id(name), value: value.to_state_string() });
        }
        if let Some(err) = error {
            out.push(self.validation_error(name, &err.to_string()));
        }
        out
    }
}

#[cfg(test)]
#[path = "bridge_tests.rs"]
mod tests;
