use super::*;

#[test]
fn cause_chain_walks_to_root() {
    let root = ScriptError::new("disk full");
    let mid = ScriptError::new("write failed").with_cause(root);
    let top = ScriptError::new("save() threw").with_cause(mid);
    let chain = top.cause_chain();
    assert_eq!(chain.len(), 3);
    assert_eq!(chain.last().unwrap().message, "disk full");
}

#[test]
fn error_counter_increments_and_formats_sequence() {
    let counter = ErrorCounter::new();
    let first = counter.record("X", "boom", 1_000);
    let second = counter.record("Y", "bang", 1_001);
    assert!(first.starts_with("[001]"));
    assert!(second.starts_with("[002]"));
    assert_eq!(counter.count(), 2);
}

#[test]
fn lock_timeout_display_includes_duration() {
    let e = DseError::LockTimeout(std::time::Duration::from_millis(250));
    assert!(e.to_string().contains("250"));
}
