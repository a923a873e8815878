//! Outbound host messages.
//!
//! This is the abstract shape the registry/scheduler/engine layers emit;
//! `dsep_host` owns the concrete wire codec that serializes these to the
//! host's newline-delimited JSON protocol. Keeping the enum here (rather
//! than in `dsep_host`) lets lower layers produce outputs without depending
//! on the wire crate, the same way a shared effect enum can live below
//! the layer that actually executes it.

use serde::{Deserialize, Serialize};

/// Prefix for every published instance state id: `"dsep." + instance_name`.
pub const STATE_ID_PREFIX: &str = "dsep.";

/// Build the state id for an instance name.
pub fn state_id(instance_name: &str) -> String {
    format!("{STATE_ID_PREFIX}{instance_name}")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationOption {
    pub id: String,
    pub title: String,
}

/// A message this core emits toward the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum HostOutput {
    #[serde(rename = "stateUpdate")]
    StateUpdate { id: String, value: String },

    #[serde(rename = "createState")]
    CreateState { id: String, parent_group: String, desc: String, default_value: String },

    #[serde(rename = "removeState")]
    RemoveState { id: String },

    #[serde(rename = "choiceUpdate")]
    ChoiceUpdate { id: String, instance_id: Option<String>, value: Vec<String> },

    #[serde(rename = "connectorUpdate")]
    ConnectorUpdate {
        short_id: Option<String>,
        connector_id: Option<String>,
        /// 0-100 slider position.
        value: u8,
    },

    #[serde(rename = "showNotification")]
    ShowNotification {
        notification_id: String,
        title: String,
        msg: String,
        options: Vec<NotificationOption>,
    },

    #[serde(rename = "settingUpdate")]
    SettingUpdate { name: String, value: String },

    #[serde(rename = "pair")]
    Pair { id: String },
}

#[cfg(test)]
#[path = "hostmsg_tests.rs"]
mod tests;
