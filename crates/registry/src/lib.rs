//! Instance records, the evaluation scheduler, process-wide repeat
//! defaults, and the registry/router tying instances to engines.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod instance;
pub mod process_defaults;
pub mod registry;
pub mod scheduler;

pub use instance::{
    migrate_instance_data, Instance, InstanceData, InstanceState, INSTANCE_LOCK_TIMEOUT,
    SAVED_PROPERTIES_VERSION,
};
pub use process_defaults::{effective_interval_ms, DefaultChanged, ProcessDefaults, MIN_REPEAT_MS};
pub use registry::{DeleteFilter, EngineFactory, Registry};
pub use scheduler::{RepeatStart, Scheduler, SchedulerOutcome, TickOutcome};
