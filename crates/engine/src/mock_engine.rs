//! Test double for [`crate::script::ScriptEngine`].
//!
//! Understands plain integer arithmetic (`"1+1"`, `"40 + 2"`) and a small
//! set of magic sources used to exercise error handling and module/file
//! loading without a real filesystem or JS runtime: `"throw <msg>"` raises,
//! `"undefined"` returns `ScriptValue::Undefined`, anything else echoes
//! back as a string.

use crate::script::{Callable, ScriptEngine, ScriptValue};
use dsep_core::ScriptError;
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct MockEngine {
    pub imported_modules: HashSet<String>,
    pub reset_count: u32,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn eval_source(&self, source: &str, instance_name: &str) -> Result<ScriptValue, ScriptError> {
        let source = source.trim();
        if source.is_empty() {
            return Ok(ScriptValue::Undefined);
        }
        if let Some(msg) = source.strip_prefix("throw ") {
            return Err(ScriptError::new(msg.to_string()).at(instance_name, 1));
        }
        if source == "undefined" {
            return Ok(ScriptValue::Undefined);
        }
        if let Some(sum) = try_eval_sum(source) {
            return Ok(ScriptValue::Number(sum));
        }
        Ok(ScriptValue::String(source.to_string()))
    }
}

fn try_eval_sum(source: &str) -> Option<f64> {
    let mut total = 0.0;
    let mut sign = 1.0;
    let mut any = false;
    for token in source.split('+') {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        let n: f64 = token.parse().ok()?;
        total += sign * n;
        sign = 1.0;
        any = true;
    }
    any.then_some(total)
}

impl ScriptEngine for MockEngine {
    fn evaluate_expression(
        &mut self,
        source: &str,
        instance_name: &str,
    ) -> Result<ScriptValue, ScriptError> {
        self.eval_source(source, instance_name)
    }

    fn evaluate_script_file(
        &mut self,
        path: &str,
        trailing_expr: &str,
        instance_name: &str,
    ) -> Result<ScriptValue, ScriptError> {
        if path.is_empty() {
            return Err(ScriptError::new("no such file").at(path, 0));
        }
        self.eval_source(trailing_expr, instance_name)
    }

    fn evaluate_module(
        &mut self,
        path: &str,
        alias: &str,
        trailing_expr: &str,
        instance_name: &str,
    ) -> Result<ScriptValue, ScriptError> {
        if path.is_empty() {
            return Err(ScriptError::new("no such module").at(path, 0));
        }
        self.imported_modules.insert(path.to_string());
        let _ = alias;
        if trailing_expr.trim().is_empty() {
            return Ok(ScriptValue::Undefined);
        }
        self.eval_source(trailing_expr, instance_name)
    }

    fn invoke(
        &mut self,
        callable: &Callable,
        args: Vec<ScriptValue>,
        instance_name: &str,
    ) -> Result<ScriptValue, ScriptError> {
        match callable {
            Callable::Source(src) => self.eval_source(src, instance_name),
            Callable::Handle(_) | Callable::HandleWithThis(_, _) => {
                Ok(args.into_iter().next().unwrap_or(ScriptValue::Undefined))
            }
        }
    }

    fn reset(&mut self) {
        self.imported_modules.clear();
        self.reset_count += 1;
    }
}

#[cfg(test)]
#[path = "mock_engine_tests.rs"]
mod tests;
