use super::*;

#[test]
fn state_id_uses_dsep_prefix() {
    assert_eq!(state_id("X"), "dsep.X");
}

#[test]
fn state_update_serializes_with_tag() {
    let msg = HostOutput::StateUpdate { id: "dsep.X".into(), value: "3".into() };
    let json = serde_json::to_value(&msg).unwrap();
    assert_eq!(json["type"], "stateUpdate");
    assert_eq!(json["value"], "3");
}

#[test]
fn create_state_serializes_fields_as_camel_case() {
    let msg = HostOutput::CreateState {
        id: "dsep.X".into(),
        parent_group: "Dynamic Values".into(),
        desc: "X".into(),
        default_value: "0".into(),
    };
    let json = serde_json::to_value(&msg).unwrap();
    assert_eq!(json["parentGroup"], "Dynamic Values");
    assert_eq!(json["defaultValue"], "0");
    assert!(json.get("parent_group").is_none());
}
