//! The engine worker thread body.
//!
//! Each engine gets a dedicated OS thread running a single-threaded
//! ("current-thread") tokio runtime, so the `Box<dyn ScriptEngine>` living
//! on it never has to be `Send`. Requests arrive over an mpsc channel;
//! timer wakeups are tracked as a `JoinSet` of sleeps tagged with their
//! timer id, multiplexed against the request channel in one `select!` loop
//! — this is what "timers post into the owning engine's queue" means in
//! practice.

use crate::script::{Callable, ScriptEngine, ScriptValue};
use crate::timer::TimerManager;
use dsep_core::{DseError, ScriptError, ScriptErrorBoxed};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;

pub type EngineResult = Result<ScriptValue, ScriptError>;

pub enum EngineRequest {
    EvaluateExpression { source: String, instance_name: String, reply: oneshot::Sender<EngineResult> },
    EvaluateScriptFile {
        path: String,
        trailing_expr: String,
        instance_name: String,
        reply: oneshot::Sender<EngineResult>,
    },
    EvaluateModule {
        path: String,
        alias: String,
        trailing_expr: String,
        instance_name: String,
        reply: oneshot::Sender<EngineResult>,
    },
    Reset { reply: oneshot::Sender<()> },
    BindInstance { instance_name: String, reply: oneshot::Sender<()> },
    UnbindInstance { instance_name: String, reply: oneshot::Sender<()> },
    ClearInstanceData { instance_name: String, reply: oneshot::Sender<()> },
    SetTimeout {
        callable: Callable,
        args: Vec<ScriptValue>,
        delay: Duration,
        instance_name: String,
        reply: oneshot::Sender<u64>,
    },
    SetInterval {
        callable: Callable,
        args: Vec<ScriptValue>,
        interval: Duration,
        instance_name: String,
        reply: oneshot::Sender<u64>,
    },
    ClearTimer { id: u64, reply: oneshot::Sender<bool> },
    ClearAllTimers { reply: oneshot::Sender<usize> },
    Shutdown,
}

/// Run the worker loop on the calling (engine-owned) thread until
/// `Shutdown` is received or the channel closes. `on_engine_error` is
/// called for every error surfaced by a timer-fired invocation (timers
/// have no direct caller to reply to, so these go straight to the
/// engine-error channel).
pub async fn run(
    engine_name: String,
    mut engine: Box<dyn ScriptEngine>,
    mut requests: mpsc::Receiver<EngineRequest>,
    mut on_engine_error: impl FnMut(DseError),
) {
    let mut timers = TimerManager::new();
    let mut pending: JoinSet<u64> = JoinSet::new();

    loop {
        tokio::select! {
            req = requests.recv() => {
                match req {
                    Some(req) => {
                        if !handle_request(req, &mut engine, &mut timers, &mut pending) {
                            break;
                        }
                    }
                    None => break,
                }
            }
            Some(fired) = pending.join_next(), if !pending.is_empty() => {
                let Ok(id) = fired else { continue };
                fire_timer(
                    &engine_name,
                    id,
                    &mut engine,
                    &mut timers,
                    &mut pending,
                    &mut on_engine_error,
                );
            }
        }
    }
}

fn schedule(pending: &mut JoinSet<u64>, id: u64, delay: Duration) {
    pending.spawn(async move {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        } else {
            tokio::task::yield_now().await;
        }
        id
    });
}

fn fire_timer(
    engine_name: &str,
    id: u64,
    engine: &mut Box<dyn ScriptEngine>,
    timers: &mut TimerManager,
    pending: &mut JoinSet<u64>,
    on_engine_error: &mut impl FnMut(DseError),
) {
    let Some(entry) = timers.get(id).cloned() else {
        // Cleared before it fired; nothing to do.
        return;
    };

    let result = engine.invoke(&entry.callable, entry.args.clone(), &entry.instance_name);
    if let Err(err) = result {
        on_engine_error(DseError::EngineError {
            engine: engine_name.to_string(),
            source: ScriptErrorBoxed::from(err),
        });
    }

    // Re-schedule only if the entry is still present now that the callback
    // has run (`clear` must be observable mid-fire).
    if entry.repeating && timers.is_present(id) {
        schedule(pending, id, entry.interval);
    }
}

fn handle_request(
    req: EngineRequest,
    engine: &mut Box<dyn ScriptEngine>,
    timers: &mut TimerManager,
    pending: &mut JoinSet<u64>,
) -> bool {
    match req {
        EngineRequest::EvaluateExpression { source, instance_name, reply } => {
            let _ = reply.send(engine.evaluate_expression(&source, &instance_name));
        }
        EngineRequest::EvaluateScriptFile { path, trailing_expr, instance_name, reply } => {
            let _ = reply.send(engine.evaluate_script_file(&path, &trailing_expr, &instance_name));
        }
        EngineRequest::EvaluateModule { path, alias, trailing_expr, instance_name, reply } => {
            let _ =
                reply.send(engine.evaluate_module(&path, &alias, &trailing_expr, &instance_name));
        }
        EngineRequest::Reset { reply } => {
            timers.clear_all();
            engine.reset();
            let _ = reply.send(());
        }
        EngineRequest::BindInstance { reply, .. } | EngineRequest::UnbindInstance { reply, .. } => {
            // Host-API callback (re)binding is a property of the concrete
            // `ScriptEngine` binding; this crate's responsibility ends at
            // forwarding the request and acknowledging it.
            let _ = reply.send(());
        }
        EngineRequest::ClearInstanceData { instance_name, reply } => {
            timers.clear_for_instance(&instance_name);
            let _ = reply.send(());
        }
        EngineRequest::SetTimeout { callable, args, delay, instance_name, reply } => {
            let (id, delay) = timers.set_timeout(callable, args, delay, &instance_name);
            schedule(pending, id, delay);
            let _ = reply.send(id);
        }
        EngineRequest::SetInterval { callable, args, interval, instance_name, reply } => {
            let (id, delay) = timers.set_interval(callable, args, interval, &instance_name);
            schedule(pending, id, delay);
            let _ = reply.send(id);
        }
        EngineRequest::ClearTimer { id, reply } => {
            let _ = reply.send(timers.clear(id));
        }
        EngineRequest::ClearAllTimers { reply } => {
            let _ = reply.send(timers.clear_all());
        }
        EngineRequest::Shutdown => return false,
    }
    true
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
