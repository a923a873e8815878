use super::*;
use std::io::Write as _;

#[test]
fn read_lines_forward_respects_from_line() {
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    writeln!(tmp, "a\nb\nc").unwrap();
    let file = FileNamespace;
    let lines = file.read_lines(tmp.path().to_str().unwrap(), ReadDirection::Forward, 1, false).unwrap();
    assert_eq!(lines, vec!["b", "c"]);
}

#[test]
fn read_lines_backward_reverses_order() {
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    writeln!(tmp, "a\nb\nc").unwrap();
    let file = FileNamespace;
    let lines = file.read_lines(tmp.path().to_str().unwrap(), ReadDirection::Backward, 0, false).unwrap();
    assert_eq!(lines, vec!["c", "b", "a"]);
}

#[test]
fn resolve_default_source_picks_branch_by_type() {
    assert_eq!(resolve_default_source(DefaultType::None, "v", "m"), None);
    assert_eq!(resolve_default_source(DefaultType::FixedValue, "v", "m"), Some("v"));
    assert_eq!(resolve_default_source(DefaultType::MainExpression, "v", "m"), Some("m"));
}

#[test]
fn base64_round_trips() {
    let util = UtilNamespace;
    let encoded = util.base64_encode(b"hello world");
    assert_eq!(util.base64_decode(&encoded).unwrap(), b"hello world");
}

#[test]
fn env_put_get_unset_round_trip() {
    let util = UtilNamespace;
    util.env_put("DSEP_TEST_VAR", "1");
    assert_eq!(util.env_get("DSEP_TEST_VAR").as_deref(), Some("1"));
    util.env_unset("DSEP_TEST_VAR");
    assert!(!util.env_is_set("DSEP_TEST_VAR"));
}
