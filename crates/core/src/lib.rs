//! Shared types and taxonomy for the plugin core: ids, enums, error
//! vocabulary, outbound host messages, and the clock abstraction used for
//! deterministic tests throughout the workspace.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod clock;
pub mod connector;
pub mod enums;
pub mod error;
pub mod flags;
pub mod hostmsg;
pub mod id;
pub mod macros;
pub mod names;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use connector::{CompositeKey, ConnectorRecord, Filter, OrderBy, OwnedCompositeKey, ShortId};
pub use enums::{DefaultType, InputType, Persistence, Scope};
pub use error::{DseError, ErrorCounter, ScriptError, ScriptErrorBoxed};
pub use flags::{Activation, StateFlags};
pub use hostmsg::{state_id, HostOutput, NotificationOption, STATE_ID_PREFIX};
pub use id::IdBuf;
pub use names::{EngineName, InstanceName, DEFAULT_MODULE_ALIAS, SHARED_ENGINE_NAME};
