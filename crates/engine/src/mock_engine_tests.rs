use super::*;

#[test]
fn evaluates_simple_sums() {
    let mut engine = MockEngine::new();
    let v = engine.evaluate_expression("1+1", "X").unwrap();
    assert_eq!(v, ScriptValue::Number(2.0));
}

#[test]
fn throw_prefix_raises_script_error() {
    let mut engine = MockEngine::new();
    let err = engine.evaluate_expression("throw boom", "X").unwrap_err();
    assert_eq!(err.message, "boom");
}

#[test]
fn empty_trailing_expr_on_module_returns_undefined() {
    let mut engine = MockEngine::new();
    let v = engine.evaluate_module("lib.js", "M", "", "X").unwrap();
    assert_eq!(v, ScriptValue::Undefined);
    assert!(engine.imported_modules.contains("lib.js"));
}

#[test]
fn reset_clears_imported_modules() {
    let mut engine = MockEngine::new();
    engine.evaluate_module("lib.js", "M", "", "X").unwrap();
    engine.reset();
    assert!(engine.imported_modules.is_empty());
    assert_eq!(engine.reset_count, 1);
}
