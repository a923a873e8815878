use super::*;
use crate::mock_engine::MockEngine;
use std::sync::{Arc, Mutex};

fn spawn_worker() -> (mpsc::Sender<EngineRequest>, Arc<Mutex<Vec<DseError>>>) {
    let (tx, rx) = mpsc::channel(32);
    let errors = Arc::new(Mutex::new(Vec::new()));
    let errors_clone = errors.clone();
    tokio::spawn(run("T".to_string(), Box::new(MockEngine::new()), rx, move |e| {
        errors_clone.lock().unwrap().push(e);
    }));
    (tx, errors)
}

#[tokio::test]
async fn evaluate_expression_round_trips() {
    let (tx, _errors) = spawn_worker();
    let (reply, rx) = oneshot::channel();
    tx.send(EngineRequest::EvaluateExpression {
        source: "1+1".to_string(),
        instance_name: "X".to_string(),
        reply,
    })
    .await
    .unwrap();
    let value = rx.await.unwrap().unwrap();
    assert_eq!(value, ScriptValue::Number(2.0));
}

#[tokio::test]
async fn set_timeout_fires_and_clear_prevents_it() {
    let (tx, _errors) = spawn_worker();
    let (reply, rx) = oneshot::channel();
    tx.send(EngineRequest::SetTimeout {
        callable: Callable::Source("throw boom".to_string()),
        args: vec![],
        delay: Duration::from_millis(5),
        instance_name: "X".to_string(),
        reply,
    })
    .await
    .unwrap();
    let id = rx.await.unwrap();

    let (reply, rx) = oneshot::channel();
    tx.send(EngineRequest::ClearTimer { id, reply }).await.unwrap();
    assert!(rx.await.unwrap());

    // give the worker a chance to process any stray firing; nothing should
    // land in the error sink because the timer was cleared first.
    tokio::time::sleep(Duration::from_millis(20)).await;
    let (reply, rx) = oneshot::channel();
    tx.send(EngineRequest::ClearAllTimers { reply }).await.unwrap();
    let _ = rx.await.unwrap();
}

#[tokio::test]
async fn reset_clears_timers_and_engine_state() {
    let (tx, _errors) = spawn_worker();
    let (reply, rx) = oneshot::channel();
    tx.send(EngineRequest::SetInterval {
        callable: Callable::Source("1".to_string()),
        args: vec![],
        interval: Duration::from_secs(60),
        instance_name: "X".to_string(),
        reply,
    })
    .await
    .unwrap();
    let _id = rx.await.unwrap();

    let (reply, rx) = oneshot::channel();
    tx.send(EngineRequest::Reset { reply }).await.unwrap();
    rx.await.unwrap();
}
