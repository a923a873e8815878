//! Engine worker and its script timer manager:
//! a dedicated worker thread per engine running a single-threaded JS
//! runtime behind a request/response boundary, plus the host-API surface
//! injected into that runtime's globals.

pub mod engine;
pub mod error;
pub mod host_api;
#[cfg(any(test, feature = "test-support"))]
pub mod mock_engine;
pub mod script;
pub mod timer;
pub mod worker;

pub use engine::Engine;
pub use error::EngineError;
#[cfg(any(test, feature = "test-support"))]
pub use mock_engine::MockEngine;
pub use script::{Callable, CallableHandle, ScriptEngine, ScriptValue};
pub use timer::TimerManager;
