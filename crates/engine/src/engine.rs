//! Public engine handle. Owns the worker thread and
//! exposes request/response methods that block the caller until the
//! worker processes them — the same "callers may block for the reply"
//! contract an agent-process executor might use for subprocess I/O.

use crate::error::EngineError;
use crate::script::{Callable, ScriptEngine, ScriptValue};
use crate::worker::{self, EngineRequest};
use dsep_core::{DseError, ScriptError};
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// Per-engine request queue depth. Press/Release/Update are expected to be
/// serialized by the scheduler before they ever reach here, so this only
/// needs to absorb bursts, not sustained concurrency.
const REQUEST_QUEUE_DEPTH: usize = 256;

pub struct Engine {
    name: String,
    tx: mpsc::Sender<EngineRequest>,
    thread: Option<JoinHandle<()>>,
}

impl Engine {
    /// Spawn a new engine: a dedicated OS thread running a current-thread
    /// tokio runtime, hosting `make_engine()`'s `ScriptEngine`.
    ///
    /// `on_engine_error` receives errors raised by timer callbacks, which
    /// have no direct caller to reply to.
    pub fn spawn(
        name: impl Into<String>,
        make_engine: impl FnOnce() -> Box<dyn ScriptEngine> + Send + 'static,
        on_engine_error: impl FnMut(DseError) + Send + 'static,
    ) -> Self {
        let name = name.into();
        let (tx, rx) = mpsc::channel(REQUEST_QUEUE_DEPTH);
        let thread_name = name.clone();
        let thread = std::thread::Builder::new()
            .name(format!("dsep-engine-{thread_name}"))
            .spawn(move || {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .expect("current-thread runtime for engine worker");
                runtime.block_on(worker::run(thread_name, make_engine(), rx, on_engine_error));
            })
            .expect("spawn engine worker thread");

        Self { name, tx, thread: Some(thread) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    async fn call<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> EngineRequest,
    ) -> Result<T, EngineError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| EngineError::WorkerGone(self.name.clone()))?;
        rx.await.map_err(|_| EngineError::NoReply(self.name.clone()))
    }

    fn wrap_script_result(&self, result: ScriptResult) -> Result<ScriptValue, EngineError> {
        result.map_err(|source| EngineError::Script {
            engine: self.name.clone(),
            source: source.into(),
        })
    }

    pub async fn evaluate_expression(
        &self,
        source: impl Into<String>,
        instance_name: impl Into<String>,
    ) -> Result<ScriptValue, EngineError> {
        let (source, instance_name) = (source.into(), instance_name.into());
        let result = self
            .call(|reply| EngineRequest::EvaluateExpression { source, instance_name, reply })
            .await?;
        self.wrap_script_result(result)
    }

    pub async fn evaluate_script_file(
        &self,
        path: impl Into<String>,
        trailing_expr: impl Into<String>,
        instance_name: impl Into<String>,
    ) -> Result<ScriptValue, EngineError> {
        let (path, trailing_expr, instance_name) =
            (path.into(), trailing_expr.into(), instance_name.into());
        let result = self
            .call(|reply| EngineRequest::EvaluateScriptFile {
                path,
                trailing_expr,
                instance_name,
                reply,
            })
            .await?;
        self.wrap_script_result(result)
    }

    pub async fn evaluate_module(
        &self,
        path: impl Into<String>,
        alias: impl Into<String>,
        trailing_expr: impl Into<String>,
        instance_name: impl Into<String>,
    ) -> Result<ScriptValue, EngineError> {
        let (path, alias, trailing_expr, instance_name) =
            (path.into(), alias.into(), trailing_expr.into(), instance_name.into());
        let result = self
            .call(|reply| EngineRequest::EvaluateModule {
                path,
                alias,
                trailing_expr,
                instance_name,
                reply,
            })
            .await?;
        self.wrap_script_result(result)
    }

    pub async fn reset(&self) -> Result<(), EngineError> {
        self.call(|reply| EngineRequest::Reset { reply }).await
    }

    pub async fn bind_instance(&self, instance_name: impl Into<String>) -> Result<(), EngineError> {
        let instance_name = instance_name.into();
        self.call(|reply| EngineRequest::BindInstance { instance_name, reply }).await
    }

    pub async fn unbind_instance(
        &self,
        instance_name: impl Into<String>,
    ) -> Result<(), EngineError> {
        let instance_name = instance_name.into();
        self.call(|reply| EngineRequest::UnbindInstance { instance_name, reply }).await
    }

    pub async fn clear_instance_data(
        &self,
        instance_name: impl Into<String>,
    ) -> Result<(), EngineError> {
        let instance_name = instance_name.into();
        self.call(|reply| EngineRequest::ClearInstanceData { instance_name, reply }).await
    }

    pub async fn set_timeout(
        &self,
        callable: Callable,
        args: Vec<ScriptValue>,
        delay: Duration,
        instance_name: impl Into<String>,
    ) -> Result<u64, EngineError> {
        let instance_name = instance_name.into();
        self.call(|reply| EngineRequest::SetTimeout {
            callable,
            args,
            delay,
            instance_name,
            reply,
        })
        .await
    }

    pub async fn set_interval(
        &self,
        callable: Callable,
        args: Vec<ScriptValue>,
        interval: Duration,
        instance_name: impl Into<String>,
    ) -> Result<u64, EngineError> {
        let instance_name = instance_name.into();
        self.call(|reply| EngineRequest::SetInterval {
            callable,
            args,
            interval,
            instance_name,
            reply,
        })
        .await
    }

    pub async fn clear_timer(&self, id: u64) -> Result<bool, EngineError> {
        self.call(|reply| EngineRequest::ClearTimer { id, reply }).await
    }

    pub async fn clear_all_timers(&self) -> Result<usize, EngineError> {
        self.call(|reply| EngineRequest::ClearAllTimers { reply }).await
    }

    /// Shut down the worker thread and join it. Does not drain pending
    /// requests first; callers that need a drained shutdown should await
    /// `reset()` before this.
    pub fn shutdown(mut self) {
        let _ = self.tx.try_send(EngineRequest::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

type ScriptResult = Result<ScriptValue, ScriptError>;

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
