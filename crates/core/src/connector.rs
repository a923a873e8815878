//! Connector record: a host-reported slider/connector binding.
//!
//! Field layout confirmed against `ConnectorData.h` in the original plugin
//! source.

use crate::enums::{DefaultType, InputType, Scope};
use crate::names::InstanceName;
use serde::{Deserialize, Serialize};

/// Host-assigned identifier for one connector (slider) widget placement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortId(pub String);

impl ShortId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ShortId {
    fn from(s: &str) -> Self {
        ShortId(s.to_string())
    }
}

/// One row in the Connector Store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorRecord {
    pub instance_name: InstanceName,
    pub action_type: String,
    pub input_type: InputType,
    pub expression: String,
    pub file: String,
    pub alias: String,
    pub instance_scope: Scope,
    pub default_type: DefaultType,
    pub default_value: String,
    pub connector_id: String,
    pub short_id: ShortId,
    pub timestamp_ms: u64,
}

impl ConnectorRecord {
    /// The composite key used for upsert-by-replace semantics.
    pub fn composite_key(&self) -> CompositeKey<'_> {
        CompositeKey {
            instance_name: self.instance_name.as_str(),
            action_type: &self.action_type,
            input_type: self.input_type,
            expression: &self.expression,
            file: &self.file,
            alias: &self.alias,
            instance_scope: self.instance_scope,
            default_type: self.default_type,
            default_value: &self.default_value,
        }
    }
}

/// Borrowed view of the fields that make up a connector record's primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompositeKey<'a> {
    pub instance_name: &'a str,
    pub action_type: &'a str,
    pub input_type: InputType,
    pub expression: &'a str,
    pub file: &'a str,
    pub alias: &'a str,
    pub instance_scope: Scope,
    pub default_type: DefaultType,
    pub default_value: &'a str,
}

impl CompositeKey<'_> {
    /// Owned form, usable as a `HashMap` key.
    pub fn to_owned_key(self) -> OwnedCompositeKey {
        OwnedCompositeKey {
            instance_name: self.instance_name.to_string(),
            action_type: self.action_type.to_string(),
            input_type: self.input_type,
            expression: self.expression.to_string(),
            file: self.file.to_string(),
            alias: self.alias.to_string(),
            instance_scope: self.instance_scope,
            default_type: self.default_type,
            default_value: self.default_value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OwnedCompositeKey {
    pub instance_name: String,
    pub action_type: String,
    pub input_type: InputType,
    pub expression: String,
    pub file: String,
    pub alias: String,
    pub instance_scope: Scope,
    pub default_type: DefaultType,
    pub default_value: String,
}

/// Sort order for [`crate::connector::Filter`] queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderBy {
    #[default]
    TimestampDesc,
    TimestampAsc,
}

/// Query filter: enum fields match by exact (case-sensitive) name, string
/// fields are glob patterns.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub instance_name: Option<String>,
    pub action_type: Option<String>,
    pub input_type: Option<InputType>,
    pub expression: Option<String>,
    pub file: Option<String>,
    pub alias: Option<String>,
    pub instance_scope: Option<Scope>,
    pub default_value: Option<String>,
    pub default_type: Option<DefaultType>,
    pub connector_id: Option<String>,
    pub short_id: Option<String>,
    pub order_by: OrderBy,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    crate::setters! {
        option {
            instance_name: String,
            action_type: String,
            expression: String,
            file: String,
            alias: String,
            default_value: String,
            connector_id: String,
            short_id: String,
            input_type: InputType,
            default_type: DefaultType,
            instance_scope: Scope,
        }
        set {
            order_by: OrderBy,
        }
    }
}

#[cfg(test)]
#[path = "connector_tests.rs"]
mod tests;
