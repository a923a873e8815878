//! Inbound host messages: the deserialization shapes for every message kind
//! the host wire protocol sends, tagged on `"type"`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDataItem {
    pub id: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingEntry {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostInput {
    #[serde(rename_all = "camelCase")]
    Info { sdk_version: u32, tp_version: String, plugin_version: String },

    #[serde(rename_all = "camelCase")]
    Settings { values: Vec<SettingEntry> },

    #[serde(rename_all = "camelCase")]
    Action { action_id: String, data: Vec<ActionDataItem> },

    #[serde(rename_all = "camelCase")]
    Down { action_id: String, data: Vec<ActionDataItem> },

    #[serde(rename_all = "camelCase")]
    Up { action_id: String, data: Vec<ActionDataItem> },

    #[serde(rename_all = "camelCase")]
    ConnectorChange {
        connector_id: String,
        #[serde(default)]
        short_id: Option<String>,
        value: u8,
        data: Vec<ActionDataItem>,
    },

    #[serde(rename_all = "camelCase")]
    ShortConnectorIdNotification { connector_id: String, short_id: String },

    #[serde(rename_all = "camelCase")]
    ListChange {
        action_id: String,
        list_id: String,
        #[serde(default)]
        instance_id: Option<String>,
        value: String,
    },

    #[serde(rename_all = "camelCase")]
    Broadcast { event: String, page_name: String, #[serde(default)] previous_page_name: Option<String> },

    #[serde(rename_all = "camelCase")]
    NotificationOptionClicked { notification_id: String, option_id: String },

    ClosePlugin {},
}

impl HostInput {
    /// The `{id, value}` pairs carried by message kinds that address a
    /// script instance, `None` for kinds that never carry action data.
    pub fn action_data(&self) -> Option<&[ActionDataItem]> {
        match self {
            HostInput::Action { data, .. }
            | HostInput::Down { data, .. }
            | HostInput::Up { data, .. }
            | HostInput::ConnectorChange { data, .. } => Some(data),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "messages_tests.rs"]
mod tests;
