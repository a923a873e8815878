use super::*;
use crate::messages::{ActionDataItem, SettingEntry};
use dsep_core::FakeClock;
use dsep_engine::MockEngine;
use dsep_registry::EngineFactory;

fn mock_factory() -> EngineFactory {
    Arc::new(|| Box::new(MockEngine::new()) as Box<dyn dsep_engine::ScriptEngine>)
}

fn bridge() -> HostBridge<FakeClock> {
    let defaults = ProcessDefaults::new();
    let registry = Arc::new(Registry::new(mock_factory(), defaults.clone()));
    HostBridge::new(registry, ConnectorStore::new(), defaults, Arc::new(BridgeState::default()), FakeClock::new())
}

fn bridge_with_settings_path(path: std::path::PathBuf) -> HostBridge<FakeClock> {
    let defaults = ProcessDefaults::new();
    let registry = Arc::new(Registry::new(mock_factory(), defaults.clone()));
    let state = BridgeState::default();
    *state.settings_path.write() = Some(path);
    HostBridge::new(registry, ConnectorStore::new(), defaults, Arc::new(state), FakeClock::new())
}

fn data(pairs: &[(&str, &str)]) -> Vec<ActionDataItem> {
    pairs.iter().map(|(id, value)| ActionDataItem { id: id.to_string(), value: value.to_string() }).collect()
}

fn action_id(operation: &str, handler: &str) -> String {
    format!("a.b.c.d.e.f.{handler}.{operation}")
}

#[tokio::test]
async fn script_eval_creates_an_instance_and_presses_it() {
    let b = bridge();
    let msg = HostInput::Action {
        action_id: action_id("eval", "script"),
        data: data(&[("x.name", "Counter"), ("x.expr", "2+3")]),
    };

    let out = b.handle(msg).await.unwrap();

    assert!(out.iter().any(|o| matches!(o, HostOutput::CreateState { id, .. } if id == "dsep.Counter")));
    assert!(out.iter().any(|o| matches!(o, HostOutput::StateUpdate { id, value } if id == "dsep.Counter" && value == "5")));
}

#[tokio::test]
async fn script_eval_with_empty_expression_reports_a_setting_update_error() {
    let b = bridge();
    let msg = HostInput::Action {
        action_id: action_id("eval", "script"),
        data: data(&[("x.name", "Bad"), ("x.expr", "")]),
    };

    let out = b.handle(msg).await.unwrap();

    assert!(matches!(&out[..], [HostOutput::SettingUpdate { name, .. }] if name == "lastError"));
}

#[tokio::test]
async fn script_update_replaces_the_source_of_an_existing_instance() {
    let b = bridge();
    b.handle(HostInput::Action {
        action_id: action_id("eval", "script"),
        data: data(&[("x.name", "Counter"), ("x.expr", "1+1")]),
    })
    .await
    .unwrap();

    let out = b
        .handle(HostInput::Action {
            action_id: action_id("update", "script"),
            data: data(&[("x.name", "Counter"), ("x.expr", "10+10")]),
        })
        .await
        .unwrap();

    assert!(out.iter().any(|o| matches!(o, HostOutput::StateUpdate { value, .. } if value == "20")));
}

#[tokio::test]
async fn down_then_up_presses_and_releases_the_named_instance() {
    let b = bridge();
    b.handle(HostInput::Action {
        action_id: action_id("eval", "script"),
        data: data(&[("x.name", "Btn"), ("x.expr", "1+1")]),
    })
    .await
    .unwrap();

    let down = b.handle(HostInput::Down { action_id: action_id("eval", "script"), data: data(&[("x.name", "Btn")]) }).await.unwrap();
    assert!(down.iter().any(|o| matches!(o, HostOutput::StateUpdate { .. })));

    let up = b.handle(HostInput::Up { action_id: action_id("eval", "script"), data: data(&[("x.name", "Btn")]) }).await.unwrap();
    assert!(up.is_empty());
}

#[tokio::test]
async fn plugin_delete_script_removes_a_named_instance() {
    let b = bridge();
    b.handle(HostInput::Action {
        action_id: action_id("eval", "script"),
        data: data(&[("x.name", "Gone"), ("x.expr", "1+1")]),
    })
    .await
    .unwrap();

    b.handle(HostInput::Action {
        action_id: action_id("deleteScript", "plugin"),
        data: data(&[("x.name", "Gone")]),
    })
    .await
    .unwrap();

    assert!(b.registry.get(&InstanceName::from("Gone")).is_none());
}

#[tokio::test]
async fn plugin_inc_repeat_rate_adjusts_the_process_default() {
    let b = bridge();
    b.handle(HostInput::Action {
        action_id: action_id("setRepeatRate", "plugin"),
        data: data(&[("x.value", "200")]),
    })
    .await
    .unwrap();
    b.handle(HostInput::Action {
        action_id: action_id("incRepeatRate", "plugin"),
        data: data(&[("x.value", "50")]),
    })
    .await
    .unwrap();

    assert_eq!(b.defaults.repeat_rate_ms(), 250);
}

#[tokio::test]
async fn settings_records_the_scripts_base_dir() {
    let b = bridge();
    let out = b
        .handle(HostInput::Settings { values: vec![SettingEntry { name: "Script Files".to_string(), value: "C:\\scripts".to_string() }] })
        .await
        .unwrap();

    assert!(out.is_empty());
    assert_eq!(*b.state.scripts_base_dir.read(), "C:/scripts/");
}

#[tokio::test]
async fn broadcast_updates_the_current_page() {
    let b = bridge();
    b.handle(HostInput::Broadcast {
        event: "pageChange".to_string(),
        page_name: "Main".to_string(),
        previous_page_name: None,
    })
    .await
    .unwrap();

    assert_eq!(*b.state.tp_current_page.read(), "Main");
}

#[tokio::test]
async fn short_connector_id_notification_patches_a_matching_record() {
    let b = bridge();
    b.connectors.upsert(
        ConnectorRecord {
            instance_name: InstanceName::from("Slider"),
            action_type: "slider".to_string(),
            input_type: InputType::Expression,
            expression: "value".to_string(),
            file: String::new(),
            alias: String::new(),
            instance_scope: Scope::Shared,
            default_type: DefaultType::None,
            default_value: String::new(),
            connector_id: "conn1".to_string(),
            short_id: ShortId::from("old"),
            timestamp_ms: 0,
        },
        0,
    );

    b.handle(HostInput::ShortConnectorIdNotification { connector_id: "conn1".to_string(), short_id: "abc123".to_string() })
        .await
        .unwrap();

    let found = b.query_connectors(&Filter { connector_id: Some("conn1".to_string()), ..Filter::new() });
    assert_eq!(found[0].short_id.as_str(), "abc123");
}

#[tokio::test]
async fn close_plugin_clears_the_registry() {
    let b = bridge();
    b.handle(HostInput::Action {
        action_id: action_id("eval", "script"),
        data: data(&[("x.name", "Any"), ("x.expr", "1+1")]),
    })
    .await
    .unwrap();

    b.handle(HostInput::ClosePlugin {}).await.unwrap();

    assert!(b.registry.instance_names().is_empty());
}

#[tokio::test]
async fn plugin_save_writes_only_saved_persistence_instances() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let b = bridge_with_settings_path(path.clone());

    b.handle(HostInput::Action {
        action_id: action_id("eval", "script"),
        data: data(&[("x.name", "Kept"), ("x.expr", "1+1"), ("x.scope", "Shared")]),
    })
    .await
    .unwrap();
    {
        let instance = b.registry.get(&InstanceName::from("Kept")).unwrap();
        instance.write().unwrap().data.persistence = Persistence::Saved;
    }

    b.handle(HostInput::Action {
        action_id: action_id("eval", "script"),
        data: data(&[("x.name", "NotKept"), ("x.expr", "2+2")]),
    })
    .await
    .unwrap();

    b.handle(HostInput::Action { action_id: action_id("save", "plugin"), data: vec![] }).await.unwrap();

    let persisted = crate::settings::load(&path).unwrap();
    assert!(persisted.dynamic_states.contains_key("Kept"));
    assert!(!persisted.dynamic_states.contains_key("NotKept"));
}

#[tokio::test]
async fn plugin_load_restores_a_saved_instance_and_presses_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");

    let writer = bridge_with_settings_path(path.clone());
    writer
        .handle(HostInput::Action {
            action_id: action_id("eval", "script"),
            data: data(&[("x.name", "Restored"), ("x.expr", "3+4")]),
        })
        .await
        .unwrap();
    {
        let instance = writer.registry.get(&InstanceName::from("Restored")).unwrap();
        instance.write().unwrap().data.persistence = Persistence::Saved;
    }
    writer.handle(HostInput::Action { action_id: action_id("save", "plugin"), data: vec![] }).await.unwrap();

    let reader = bridge_with_settings_path(path);
    let out = reader
        .handle(HostInput::Action { action_id: action_id("load", "plugin"), data: data(&[("x.name", "Restored")]) })
        .await
        .unwrap();

    assert!(out.iter().any(|o| matches!(o, HostOutput::StateUpdate { id, value } if id == "dsep.Restored" && value == "7")));
    assert!(reader.registry.get(&InstanceName::from("Restored")).is_some());
}

#[tokio::test]
async fn plugin_delete_saved_instance_removes_it_from_the_settings_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let b = bridge_with_settings_path(path.clone());

    b.handle(HostInput::Action {
        action_id: action_id("eval", "script"),
        data: data(&[("x.name", "Gone"), ("x.expr", "1+1")]),
    })
    .await
    .unwrap();
    {
        let instance = b.registry.get(&InstanceName::from("Gone")).unwrap();
        instance.write().unwrap().data.persistence = Persistence::Saved;
    }
    b.handle(HostInput::Action { action_id: action_id("save", "plugin"), data: vec![] }).await.unwrap();

    b.handle(HostInput::Action {
        action_id: action_id("deleteSavedInstance", "plugin"),
        data: data(&[("x.name", "Gone")]),
    })
    .await
    .unwrap();

    let persisted = crate::settings::load(&path).unwrap();
    assert!(!persisted.dynamic_states.contains_key("Gone"));
}
