//! Test builders and fixtures shared by other crates' test suites, gated
//! behind `test-support` the way `oj-core::test_support` is.

use crate::connector::{ConnectorRecord, ShortId};
use crate::enums::{DefaultType, InputType, Scope};
use crate::names::InstanceName;

/// Builder for [`ConnectorRecord`] test fixtures.
///
/// Hand-written rather than generated by [`crate::builder!`]: the macro
/// assumes builder field names match the target struct's field names
/// one-for-one, which doesn't fit ergonomic `&str` setters for the
/// newtype-wrapped `instance_name`/`short_id` fields here.
pub struct ConnectorRecordBuilder {
    instance_name: String,
    action_type: String,
    input_type: InputType,
    expression: String,
    file: String,
    alias: String,
    instance_scope: Scope,
    default_type: DefaultType,
    default_value: String,
    connector_id: String,
    short_id: String,
    timestamp_ms: u64,
}

impl Default for ConnectorRecordBuilder {
    fn default() -> Self {
        Self {
            instance_name: "X".to_string(),
            action_type: "slider".to_string(),
            input_type: InputType::Expression,
            expression: String::new(),
            file: String::new(),
            alias: String::new(),
            instance_scope: Scope::Shared,
            default_type: DefaultType::None,
            default_value: String::new(),
            connector_id: "c1".to_string(),
            short_id: "s1".to_string(),
            timestamp_ms: 0,
        }
    }
}

impl ConnectorRecordBuilder {
    crate::setters! {
        into {
            instance_name: String,
            action_type: String,
            expression: String,
            file: String,
            alias: String,
            default_value: String,
            connector_id: String,
            short_id: String,
        }
        set {
            input_type: InputType,
            instance_scope: Scope,
            default_type: DefaultType,
            timestamp_ms: u64,
        }
    }

    pub fn build(self) -> ConnectorRecord {
        ConnectorRecord {
            instance_name: InstanceName::new(self.instance_name)
                .expect("test builder instance name must be non-empty"),
            action_type: self.action_type,
            input_type: self.input_type,
            expression: self.expression,
            file: self.file,
            alias: self.alias,
            instance_scope: self.instance_scope,
            default_type: self.default_type,
            default_value: self.default_value,
            connector_id: self.connector_id,
            short_id: ShortId::from(self.short_id.as_str()),
            timestamp_ms: self.timestamp_ms,
        }
    }
}

impl ConnectorRecord {
    pub fn builder() -> ConnectorRecordBuilder {
        ConnectorRecordBuilder::default()
    }
}
