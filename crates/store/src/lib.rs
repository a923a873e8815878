//! Connector store: the in-memory indexed table of
//! host-reported connector (slider) bindings.

pub mod error;
pub mod store;

pub use error::StoreError;
pub use store::{ConnectorChanged, ConnectorStore};
