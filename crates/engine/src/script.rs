//! The abstract JS runtime boundary.
//!
//! Embedding a concrete JS engine (V8, QuickJS, ...) is out of scope here;
//! `ScriptEngine` is the seam a real binding would implement. `MockEngine`
//! (test-support only) is a minimal arithmetic-and-echo evaluator standing
//! in for it so the registry/scheduler/timer layers above can be exercised
//! without one.

use dsep_core::ScriptError;
use serde_json::Value as JsonValue;
use std::fmt;

/// A value produced by evaluating an expression, script file, or module.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptValue {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    /// Anything the concrete engine can represent but that doesn't map onto
    /// the variants above folds into JSON, same as the wire encoding.
    Json(JsonValue),
}

impl ScriptValue {
    /// Whether this is the "null-record" result the scheduler treats as
    /// "nothing to publish" ("result present & non-null").
    pub fn is_null_ish(&self) -> bool {
        matches!(self, ScriptValue::Undefined | ScriptValue::Null)
    }

    pub fn to_state_string(&self) -> String {
        match self {
            ScriptValue::Undefined | ScriptValue::Null => String::new(),
            ScriptValue::Bool(b) => b.to_string(),
            ScriptValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            ScriptValue::String(s) => s.clone(),
            ScriptValue::Json(v) => v.to_string(),
        }
    }
}

impl fmt::Display for ScriptValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_state_string())
    }
}

/// Opaque handle to a callable stored inside the engine (a JS function
/// value, or a `[callable, this]` pair). The timer
/// manager and host-API callback tables pass these around without knowing
/// anything about the concrete engine's representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallableHandle(pub u64);

/// What a script timer or notification-click callback was registered with.
#[derive(Debug, Clone)]
pub enum Callable {
    Handle(CallableHandle),
    HandleWithThis(CallableHandle, CallableHandle),
    Source(String),
}

/// The seam a concrete JS runtime implements. One instance per engine
/// worker thread; never `Send`-shared — only ever touched from that
/// thread, so the JS runtime is never entered concurrently.
pub trait ScriptEngine {
    fn evaluate_expression(
        &mut self,
        source: &str,
        instance_name: &str,
    ) -> Result<ScriptValue, ScriptError>;

    fn evaluate_script_file(
        &mut self,
        path: &str,
        trailing_expr: &str,
        instance_name: &str,
    ) -> Result<ScriptValue, ScriptError>;

    /// Imports `path` once per path, binding the module under `alias` in
    /// the engine global. An empty `trailing_expr` returns `Undefined`
    /// rather than re-running anything.
    fn evaluate_module(
        &mut self,
        path: &str,
        alias: &str,
        trailing_expr: &str,
        instance_name: &str,
    ) -> Result<ScriptValue, ScriptError>;

    /// Invoke a stored callable (timer tick, notification click, ...).
    fn invoke(
        &mut self,
        callable: &Callable,
        args: Vec<ScriptValue>,
        instance_name: &str,
    ) -> Result<ScriptValue, ScriptError>;

    /// Re-initialize the runtime: clears globals, modules, and any
    /// engine-owned callable table. Engine identity and thread survive.
    fn reset(&mut self);
}

#[cfg(any(test, feature = "test-support"))]
pub use crate::mock_engine::MockEngine;
