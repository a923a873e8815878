//! Host-facing half of the plugin: wire framing, the inbound/outbound
//! message shapes, the action-id dispatch table, persisted settings, the
//! Host Bridge translating messages into registry operations, and the
//! TCP connection that pumps it all to and from the host process.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod action_id;
pub mod bridge;
pub mod connection;
pub mod error;
pub mod logging;
pub mod messages;
pub mod settings;
pub mod single_instance;
pub mod wire;

pub use action_id::{ActionId, ActionIdError, Handler};
pub use bridge::{BridgeState, HostBridge};
pub use connection::{ConnectionConfig, DEFAULT_HOST, DEFAULT_PORT};
pub use error::HostError;
pub use logging::{init as init_logging, level_from_u8, LogLevel, LoggingGuards, JS_LOG_TARGET};
pub use messages::{ActionDataItem, HostInput, SettingEntry};
pub use settings::{
    load as load_settings, load_instance_record, save as save_settings, PersistedSettings,
    PluginSettings, SettingsError, SETTINGS_VERSION,
};
pub use single_instance::{SingleInstanceError, SingleInstanceGuard};
pub use wire::ProtocolError;
