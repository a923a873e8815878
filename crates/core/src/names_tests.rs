use super::*;

#[test]
fn collapses_internal_and_trims_outer_whitespace() {
    assert_eq!(collapse_whitespace("  My   Instance  ").as_str(), "My Instance");
}

#[test]
fn empty_after_trim_is_rejected() {
    assert!(InstanceName::new("   ").is_err());
    assert!(InstanceName::new("").is_err());
}

#[test]
fn equal_after_normalization_compare_equal() {
    let a = InstanceName::new("Foo  Bar").unwrap();
    let b = InstanceName::new(" Foo Bar ").unwrap();
    assert_eq!(a, b);
}

#[test]
fn shared_engine_name_is_recognized() {
    let e = EngineName::shared();
    assert!(e.is_shared());
    assert_eq!(e.as_str(), "Shared");
    assert!(!EngineName::from("E1").is_shared());
}
