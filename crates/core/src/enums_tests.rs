use super::*;

#[test]
fn input_type_legacy_numbering_migrates() {
    assert_eq!(InputType::from_legacy_u8(1), Some(InputType::Expression));
    assert_eq!(InputType::from_legacy_u8(2), Some(InputType::ScriptFile));
    assert_eq!(InputType::from_legacy_u8(3), Some(InputType::Module));
    assert_eq!(InputType::from_legacy_u8(0), None); // legacy Unknown has no current counterpart
}

#[test]
fn input_type_current_numbering_round_trips() {
    for v in [InputType::Expression, InputType::ScriptFile, InputType::Module] {
        assert_eq!(InputType::from_u8(v.to_u8()), Some(v));
    }
}

#[test]
fn name_lookup_is_case_sensitive() {
    assert_eq!(Scope::from_name("Shared"), Some(Scope::Shared));
    assert_eq!(Scope::from_name("shared"), None);
}

#[test]
fn display_matches_enum_name() {
    assert_eq!(Persistence::Saved.to_string(), "Saved");
    assert_eq!(DefaultType::CustomExpression.to_string(), "CustomExpression");
}
