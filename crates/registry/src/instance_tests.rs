use super::*;
use dsep_core::InstanceName;

fn instance() -> Instance {
    Instance::new(InstanceName::new("X").unwrap(), InstanceData::default())
}

#[test]
fn fresh_instance_is_uninitialized() {
    let inst = instance();
    assert!(inst.read().unwrap().flags.contains(StateFlags::UNINITIALIZED));
}

#[test]
fn apply_source_clears_uninitialized_on_valid_expression() {
    let inst = instance();
    inst.apply_source(InputType::Expression, "1+1".to_string(), String::new()).unwrap();
    let flags = inst.read().unwrap().flags;
    assert!(!flags.contains(StateFlags::UNINITIALIZED));
    assert!(!flags.contains(StateFlags::PROPERTY_ERROR));
}

#[test]
fn apply_source_sets_property_error_on_empty_expression() {
    let inst = instance();
    let flags = inst.apply_source(InputType::Expression, "   ".to_string(), String::new()).unwrap();
    assert!(flags.contains(StateFlags::PROPERTY_ERROR));
}

#[test]
fn apply_source_sets_file_load_error_on_missing_file() {
    let inst = instance();
    let flags =
        inst.apply_source(InputType::ScriptFile, String::new(), "/no/such/file.js".to_string()).unwrap();
    assert!(flags.contains(StateFlags::FILE_LOAD_ERROR));
}

#[test]
fn repeater_id_is_monotonic() {
    let inst = instance();
    let a = inst.next_repeater_id().unwrap();
    let b = inst.next_repeater_id().unwrap();
    assert!(b > a);
}

#[test]
fn migrate_instance_data_maps_legacy_input_type_numbering() {
    let legacy = serde_json::json!({
        "version": 1,
        "scope": "Shared",
        "input_type": 2,
        "source": "",
        "file": "a.js",
        "module_alias": "M",
        "default_value": "",
        "default_type": "None",
        "create_state": true,
        "repeat_delay": -1,
        "repeat_rate": -1,
        "engine_name": "Shared",
        "state_category": "",
        "state_name": "",
        "persistence": "Session",
        "activation": 1,
        "stored_data": null,
    });
    let migrated = migrate_instance_data(legacy).unwrap();
    assert_eq!(migrated.input_type, InputType::ScriptFile);
    assert_eq!(migrated.version, SAVED_PROPERTIES_VERSION);
}

#[test]
fn round_trip_versioned_json() {
    let inst = instance();
    inst.apply_source(InputType::Expression, "1+1".to_string(), String::new()).unwrap();
    let json = inst.to_versioned_json().unwrap();
    let data: InstanceData = serde_json::from_value(json).unwrap();
    assert_eq!(data.source, "1+1");
}
