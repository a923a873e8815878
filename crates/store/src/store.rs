//! In-memory indexed connector table.
//!
//! A lock-guarded map behind small accessor methods, using
//! `parking_lot::RwLock` rather than `Mutex` since reads (engine workers
//! doing `get_by_short_id`/`query`)
//! greatly outnumber writes (the host-message ingester's `upsert`).

use dsep_core::connector::OwnedCompositeKey;
use dsep_core::{ConnectorRecord, Filter, OrderBy};
use glob::Pattern;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Published whenever `upsert` replaces or inserts a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorChanged {
    pub instance_name: String,
    pub short_id: String,
}

/// Shared connector table. Cloning gives a new reader handle over the same
/// backing map; there is no separate read-only type since every handle can
/// call `upsert` (the host-message ingester is simply the only caller that
/// does, matching a "primary handle" / "reader handle" split).
#[derive(Clone)]
pub struct ConnectorStore {
    records: Arc<RwLock<HashMap<OwnedCompositeKey, ConnectorRecord>>>,
    changes: broadcast::Sender<ConnectorChanged>,
}

impl Default for ConnectorStore {
    fn default() -> Self {
        let (changes, _rx) = broadcast::channel(256);
        Self { records: Arc::new(RwLock::new(HashMap::new())), changes }
    }
}

impl ConnectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to `(instance_name, short_id)` notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<ConnectorChanged> {
        self.changes.subscribe()
    }

    /// Replace on composite-key collision, stamping `timestamp_ms` with
    /// `now_ms`, then publish a change notification.
    pub fn upsert(&self, mut record: ConnectorRecord, now_ms: u64) {
        record.timestamp_ms = now_ms;
        let key = record.composite_key().to_owned_key();
        let notice = ConnectorChanged {
            instance_name: record.instance_name.as_str().to_string(),
            short_id: record.short_id.as_str().to_string(),
        };
        self.records.write().insert(key, record);
        let _ = self.changes.send(notice);
    }

    /// Glob-match `short_id`, returning the most recent match by
    /// `timestamp_ms` descending. `None` signals the "null-record" case
    /// callers set `is_null = true` on the host-facing
    /// projection rather than treating this as an error.
    pub fn get_by_short_id(&self, pattern: &str) -> Option<ConnectorRecord> {
        let glob = Pattern::new(pattern).ok()?;
        self.records
            .read()
            .values()
            .filter(|r| glob.matches(r.short_id.as_str()))
            .max_by_key(|r| r.timestamp_ms)
            .cloned()
    }

    /// Filtered, ordered projection over the table. Never raises: an
    /// unparsable glob pattern simply excludes that field's matches rather
    /// than erroring, per the "query-compilation failures return an empty
    /// result" failure policy — a malformed pattern is not the same as "the
    /// whole query fails", so only records that fail the bad pattern are
    /// dropped.
    pub fn query(&self, filter: &Filter) -> Vec<ConnectorRecord> {
        let records = self.records.read();
        let mut matched: Vec<ConnectorRecord> =
            records.values().filter(|r| matches_filter(r, filter)).cloned().collect();
        match filter.order_by {
            OrderBy::TimestampDesc => matched.sort_by(|a, b| b.timestamp_ms.cmp(&a.timestamp_ms)),
            OrderBy::TimestampAsc => matched.sort_by(|a, b| a.timestamp_ms.cmp(&b.timestamp_ms)),
        }
        matched
    }

    /// Projection of `query` onto `short_id` values.
    pub fn short_ids(&self, filter: &Filter) -> Vec<String> {
        self.query(filter).into_iter().map(|r| r.short_id.as_str().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

fn glob_field(pattern: &Option<String>, value: &str) -> bool {
    match pattern {
        None => true,
        Some(p) => Pattern::new(p).map(|g| g.matches(value)).unwrap_or(false),
    }
}

fn matches_filter(record: &ConnectorRecord, filter: &Filter) -> bool {
    glob_field(&filter.instance_name, record.instance_name.as_str())
        && glob_field(&filter.action_type, &record.action_type)
        && glob_field(&filter.expression, &record.expression)
        && glob_field(&filter.file, &record.file)
        && glob_field(&filter.alias, &record.alias)
        && glob_field(&filter.default_value, &record.default_value)
        && glob_field(&filter.connector_id, &record.connector_id)
        && glob_field(&filter.short_id, record.short_id.as_str())
        && filter.input_type.map(|t| t == record.input_type).unwrap_or(true)
        && filter.default_type.map(|t| t == record.default_type).unwrap_or(true)
        && filter.instance_scope.map(|s| s == record.instance_scope).unwrap_or(true)
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
