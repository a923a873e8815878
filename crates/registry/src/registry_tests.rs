use super::*;
use crate::instance::InstanceData;
use dsep_core::{Activation, InputType};
use dsep_engine::{MockEngine, ScriptValue};

fn mock_factory() -> EngineFactory {
    Arc::new(|| Box::new(MockEngine::new()) as Box<dyn dsep_engine::ScriptEngine>)
}

fn registry() -> Registry {
    Registry::new(mock_factory(), ProcessDefaults::new())
}

fn shared_data(source: &str) -> InstanceData {
    InstanceData { activation: Activation::ON_PRESS, source: source.to_string(), ..InstanceData::default() }
}

fn private_data(source: &str, engine_name: &str) -> InstanceData {
    InstanceData {
        scope: Scope::Private,
        engine_name: engine_name.to_string(),
        activation: Activation::ON_PRESS,
        source: source.to_string(),
        ..InstanceData::default()
    }
}

#[tokio::test]
async fn get_or_create_binds_to_shared_engine_and_is_idempotent() {
    let reg = registry();
    let name = InstanceName::new("A").unwrap();
    let first = reg.get_or_create(name.clone(), shared_data("1+1")).await.unwrap();
    let second = reg.get_or_create(name.clone(), shared_data("9+9")).await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(reg.engine_names().len(), 1);
}

#[tokio::test]
async fn get_or_create_spawns_a_private_engine_on_demand() {
    let reg = registry();
    let name = InstanceName::new("B").unwrap();
    reg.get_or_create(name, private_data("1+1", "Gfx")).await.unwrap();
    let names = reg.engine_names();
    assert!(names.iter().any(|n| n.as_str() == "Gfx"));
    assert_eq!(names.len(), 2);
}

#[tokio::test]
async fn press_evaluates_through_the_routed_engine() {
    let reg = registry();
    let name = InstanceName::new("C").unwrap();
    let instance = reg.get_or_create(name.clone(), shared_data("2+3")).await.unwrap();
    instance.apply_source(InputType::Expression, "2+3".to_string(), String::new()).unwrap();

    let outcome = reg.press(&name).await.unwrap();

    assert_eq!(outcome.evaluated, Some(ScriptValue::Number(5.0)));
}

#[tokio::test]
async fn delete_named_removes_only_that_instance() {
    let reg = registry();
    let a = InstanceName::new("A").unwrap();
    let b = InstanceName::new("B").unwrap();
    reg.get_or_create(a.clone(), shared_data("1")).await.unwrap();
    reg.get_or_create(b.clone(), shared_data("2")).await.unwrap();

    let removed = reg.delete(DeleteFilter::Named(a.clone()));

    assert_eq!(removed, vec![a.clone()]);
    assert!(reg.get(&a).is_none());
    assert!(reg.get(&b).is_some());
}

#[tokio::test]
async fn delete_all_private_prunes_the_now_idle_private_engine() {
    let reg = registry();
    let name = InstanceName::new("D").unwrap();
    reg.get_or_create(name.clone(), private_data("1", "Gfx")).await.unwrap();
    assert_eq!(reg.engine_names().len(), 2);

    reg.delete(DeleteFilter::AllPrivate);

    assert_eq!(reg.engine_names().len(), 1);
    assert!(reg.get(&name).is_none());
}

#[tokio::test]
async fn rebind_moves_instance_to_a_new_private_engine() {
    let reg = registry();
    let name = InstanceName::new("E").unwrap();
    reg.get_or_create(name.clone(), shared_data("1")).await.unwrap();

    reg.rebind(&name, Scope::Private, "Gfx").await.unwrap();

    let instance = reg.get(&name).unwrap();
    let guard = instance.read().unwrap();
    assert_eq!(guard.data.scope, Scope::Private);
    assert_eq!(guard.data.engine_name, "Gfx");
    assert!(reg.engine_names().iter().any(|n| n.as_str() == "Gfx"));
}

#[tokio::test]
async fn release_removes_a_finished_temporary_instance() {
    let reg = registry();
    let name = InstanceName::new("G").unwrap();
    let data = InstanceData { persistence: dsep_core::Persistence::Temporary, ..shared_data("1") };
    reg.get_or_create(name.clone(), data).await.unwrap();

    reg.press(&name).await.unwrap();
    let outcome = reg.release(&name).await.unwrap();

    assert!(outcome.finished);
    assert!(reg.get(&name).is_none());
}

#[tokio::test]
async fn reset_marks_matching_instances_uninitialized() {
    let reg = registry();
    let name = InstanceName::new("F").unwrap();
    let instance = reg.get_or_create(name.clone(), shared_data("1+1")).await.unwrap();
    instance.apply_source(InputType::Expression, "1+1".to_string(), String::new()).unwrap();
    assert!(!instance.read().unwrap().flags.contains(dsep_core::StateFlags::UNINITIALIZED));

    reg.reset(DeleteFilter::Named(name.clone())).await.unwrap();

    assert!(instance.read().unwrap().flags.contains(dsep_core::StateFlags::UNINITIALIZED));
}
