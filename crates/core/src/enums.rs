//! Small enums shared across the instance/engine/connector data model.
//!
//! Each derives its name↔value and legacy-numbering tables via
//! [`crate::enum_table!`] instead of reflecting on a meta-object system, per
//! the "Runtime reflection on enums" design note.

use serde::{Deserialize, Serialize};

/// How an instance's script source is provided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputType {
    Expression,
    ScriptFile,
    Module,
}

crate::enum_table! {
    pub enum InputType {
        // Version-1 persisted records used Unknown=0, Expression=1, Script=2, Module=3.
        Expression = 0 (legacy 1),
        ScriptFile = 1 (legacy 2),
        Module = 2 (legacy 3),
    }
}

crate::simple_display! {
    InputType {
        Expression => "Expression",
        ScriptFile => "ScriptFile",
        Module => "Module",
    }
}

impl Default for InputType {
    fn default() -> Self {
        InputType::Expression
    }
}

/// Which engine pool an instance is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    Shared,
    Private,
}

crate::enum_table! {
    pub enum Scope {
        Shared = 0,
        Private = 1,
    }
}

crate::simple_display! {
    Scope {
        Shared => "Shared",
        Private => "Private",
    }
}

impl Default for Scope {
    fn default() -> Self {
        Scope::Shared
    }
}

/// On-disk persistence mode for an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Persistence {
    Session,
    Temporary,
    Saved,
}

crate::enum_table! {
    pub enum Persistence {
        Session = 0,
        Temporary = 1,
        Saved = 2,
    }
}

crate::simple_display! {
    Persistence {
        Session => "Session",
        Temporary => "Temporary",
        Saved => "Saved",
    }
}

impl Default for Persistence {
    fn default() -> Self {
        Persistence::Session
    }
}

/// How a default value is recovered for an instance at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DefaultType {
    None,
    FixedValue,
    CustomExpression,
    MainExpression,
}

crate::enum_table! {
    pub enum DefaultType {
        None = 0,
        FixedValue = 1,
        CustomExpression = 2,
        MainExpression = 3,
    }
}

crate::simple_display! {
    DefaultType {
        None => "None",
        FixedValue => "FixedValue",
        CustomExpression => "CustomExpression",
        MainExpression => "MainExpression",
    }
}

impl Default for DefaultType {
    fn default() -> Self {
        DefaultType::None
    }
}

#[cfg(test)]
#[path = "enums_tests.rs"]
mod tests;
