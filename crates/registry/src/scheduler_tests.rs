use super::*;
use crate::instance::InstanceData;
use dsep_core::InstanceName;
use dsep_engine::{Engine, MockEngine};

fn instance(activation: Activation, repeat_rate: i64, repeat_delay: i64, source: &str) -> Instance {
    let data = InstanceData { activation, repeat_rate, repeat_delay, source: source.to_string(), ..InstanceData::default() };
    let inst = Instance::new(InstanceName::new("X").unwrap(), data);
    inst.apply_source(InputType::Expression, source.to_string(), String::new()).unwrap();
    inst
}

fn instance_with_cap(activation: Activation, repeat_rate: i64, repeat_delay: i64, max_repeat_count: i64, source: &str) -> Instance {
    let data = InstanceData {
        activation,
        repeat_rate,
        repeat_delay,
        max_repeat_count,
        source: source.to_string(),
        ..InstanceData::default()
    };
    let inst = Instance::new(InstanceName::new("X").unwrap(), data);
    inst.apply_source(InputType::Expression, source.to_string(), String::new()).unwrap();
    inst
}

fn mock_engine() -> Engine {
    Engine::spawn("Shared".to_string(), || Box::new(MockEngine::new()), |_err| {})
}

#[tokio::test]
async fn press_on_press_evaluates_immediately() {
    let inst = instance(Activation::ON_PRESS, -1, -1, "1 + 2");
    let engine = mock_engine();
    let scheduler = Scheduler::new(ProcessDefaults::new());

    let outcome = scheduler.press(&inst, &engine).await.unwrap();

    assert_eq!(outcome.evaluated, Some(ScriptValue::Number(3.0)));
    assert!(inst.read().unwrap().flags.contains(StateFlags::PRESSED));
    engine.shutdown();
}

#[tokio::test]
async fn press_repeat_on_hold_starts_repeat_without_evaluating() {
    let inst = instance(Activation::REPEAT_ON_HOLD, -1, -1, "1 + 2");
    let engine = mock_engine();
    let scheduler = Scheduler::new(ProcessDefaults::new());

    let outcome = scheduler.press(&inst, &engine).await.unwrap();

    assert!(outcome.evaluated.is_none());
    let start = outcome.start_repeat.expect("repeat should start");
    assert!(inst.read().unwrap().flags.contains(StateFlags::REPEATING));
    assert_eq!(start.repeater_id, inst.read().unwrap().repeater_id);
    engine.shutdown();
}

#[tokio::test]
async fn press_with_on_press_and_repeat_on_hold_does_both() {
    let activation = Activation::ON_PRESS.set(Activation::REPEAT_ON_HOLD);
    let inst = instance(activation, 100, 200, "1 + 2");
    let engine = mock_engine();
    let scheduler = Scheduler::new(ProcessDefaults::new());

    let outcome = scheduler.press(&inst, &engine).await.unwrap();

    assert_eq!(outcome.evaluated, Some(ScriptValue::Number(3.0)));
    let start = outcome.start_repeat.expect("repeat should also start");
    assert_eq!(start.delay_ms, 200);
    assert!(inst.read().unwrap().flags.contains(StateFlags::REPEATING));
    engine.shutdown();
}

#[tokio::test]
async fn tick_stops_once_max_repeat_count_is_reached() {
    let inst = instance_with_cap(Activation::REPEAT_ON_HOLD, 100, -1, 2, "1 + 1");
    let engine = mock_engine();
    let scheduler = Scheduler::new(ProcessDefaults::new());
    let press_outcome = scheduler.press(&inst, &engine).await.unwrap();
    let repeater_id = press_outcome.start_repeat.unwrap().repeater_id;

    let (first, first_tick) = scheduler.tick(&inst, &engine, repeater_id).await.unwrap();
    assert!(first.evaluated.is_some());
    assert!(first_tick.continue_repeating);

    let (second, second_tick) = scheduler.tick(&inst, &engine, repeater_id).await.unwrap();
    assert!(second.evaluated.is_some());
    assert!(second_tick.continue_repeating);

    let (third, third_tick) = scheduler.tick(&inst, &engine, repeater_id).await.unwrap();
    assert!(third.evaluated.is_none());
    assert!(!third_tick.continue_repeating);
    engine.shutdown();
}

#[tokio::test]
async fn press_is_noop_when_critical() {
    let inst = instance(Activation::ON_PRESS, -1, -1, "1 + 2");
    inst.write().unwrap().flags = inst.read().unwrap().flags.set(StateFlags::CRITICAL);
    let engine = mock_engine();
    let scheduler = Scheduler::new(ProcessDefaults::new());

    let outcome = scheduler.press(&inst, &engine).await.unwrap();

    assert!(outcome.evaluated.is_none());
    assert!(!inst.read().unwrap().flags.contains(StateFlags::PRESSED));
    engine.shutdown();
}

#[tokio::test]
async fn tick_with_stale_repeater_id_does_not_evaluate() {
    let inst = instance(Activation::REPEAT_ON_HOLD, -1, -1, "1 + 2");
    let engine = mock_engine();
    let scheduler = Scheduler::new(ProcessDefaults::new());
    let press_outcome = scheduler.press(&inst, &engine).await.unwrap();
    let start = press_outcome.start_repeat.unwrap();

    let (outcome, tick_outcome) = scheduler.tick(&inst, &engine, start.repeater_id + 1).await.unwrap();

    assert!(outcome.evaluated.is_none());
    assert!(!tick_outcome.continue_repeating);
    engine.shutdown();
}

#[tokio::test]
async fn tick_with_valid_id_evaluates_and_continues() {
    let inst = instance(Activation::REPEAT_ON_HOLD, 200, -1, "2 + 2");
    let engine = mock_engine();
    let scheduler = Scheduler::new(ProcessDefaults::new());
    let press_outcome = scheduler.press(&inst, &engine).await.unwrap();
    let start = press_outcome.start_repeat.unwrap();

    let (outcome, tick_outcome) = scheduler.tick(&inst, &engine, start.repeater_id).await.unwrap();

    assert_eq!(outcome.evaluated, Some(ScriptValue::Number(4.0)));
    assert!(tick_outcome.continue_repeating);
    assert_eq!(tick_outcome.next_delay_ms, 200);
    engine.shutdown();
}

#[tokio::test]
async fn release_clears_flags_and_finishes_without_on_release() {
    let inst = instance(Activation::ON_PRESS, -1, -1, "1 + 2");
    let engine = mock_engine();
    let scheduler = Scheduler::new(ProcessDefaults::new());
    scheduler.press(&inst, &engine).await.unwrap();

    let outcome = scheduler.release(&inst, &engine).await.unwrap();

    assert!(outcome.finished);
    assert!(!inst.read().unwrap().flags.contains(StateFlags::PRESSED));
    assert!(!inst.read().unwrap().flags.contains(StateFlags::REPEATING));
    engine.shutdown();
}

#[tokio::test]
async fn release_evaluates_on_release_activation() {
    let inst = instance(Activation::ON_RELEASE, -1, -1, "5 + 5");
    let engine = mock_engine();
    let scheduler = Scheduler::new(ProcessDefaults::new());
    scheduler.press(&inst, &engine).await.unwrap();

    let outcome = scheduler.release(&inst, &engine).await.unwrap();

    assert!(!outcome.finished);
    assert_eq!(outcome.evaluated, Some(ScriptValue::Number(10.0)));
    assert!(!inst.read().unwrap().flags.contains(StateFlags::HOLD_RELEASED));
    engine.shutdown();
}

#[tokio::test]
async fn update_replaces_source_and_evaluates_once() {
    let inst = instance(Activation::ON_PRESS, -1, -1, "1 + 1");
    let engine = mock_engine();
    let scheduler = Scheduler::new(ProcessDefaults::new());

    let outcome = scheduler.update(&inst, &engine, "3 + 4".to_string()).await.unwrap();

    assert_eq!(outcome.evaluated, Some(ScriptValue::Number(7.0)));
    assert_eq!(inst.read().unwrap().data.source, "3 + 4");
    engine.shutdown();
}

#[tokio::test]
async fn update_is_noop_when_critical() {
    let inst = instance(Activation::ON_PRESS, -1, -1, "1 + 1");
    inst.write().unwrap().flags = inst.read().unwrap().flags.set(StateFlags::CRITICAL);
    let engine = mock_engine();
    let scheduler = Scheduler::new(ProcessDefaults::new());

    let outcome = scheduler.update(&inst, &engine, "9 + 9".to_string()).await.unwrap();

    assert!(outcome.evaluated.is_none());
    assert_eq!(inst.read().unwrap().data.source, "1 + 1");
    engine.shutdown();
}
