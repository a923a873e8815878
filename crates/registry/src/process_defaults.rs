//! Process-global repeat rate/delay defaults, broadcast to
//! every instance that delegates to them (`repeat_rate`/`repeat_delay` of
//! `-1`, see `InstanceData::default`).

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Floor enforced at both the setter and the scheduler.
pub const MIN_REPEAT_MS: i64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultChanged {
    RepeatRate(i64),
    RepeatDelay(i64),
}

#[derive(Clone)]
pub struct ProcessDefaults {
    repeat_rate_ms: Arc<AtomicI64>,
    repeat_delay_ms: Arc<AtomicI64>,
    changes: broadcast::Sender<DefaultChanged>,
}

impl Default for ProcessDefaults {
    fn default() -> Self {
        let (changes, _rx) = broadcast::channel(64);
        Self {
            repeat_rate_ms: Arc::new(AtomicI64::new(MIN_REPEAT_MS)),
            repeat_delay_ms: Arc::new(AtomicI64::new(MIN_REPEAT_MS)),
            changes,
        }
    }
}

impl ProcessDefaults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DefaultChanged> {
        self.changes.subscribe()
    }

    pub fn repeat_rate_ms(&self) -> i64 {
        self.repeat_rate_ms.load(Ordering::Relaxed)
    }

    pub fn repeat_delay_ms(&self) -> i64 {
        self.repeat_delay_ms.load(Ordering::Relaxed)
    }

    pub fn set_repeat_rate_ms(&self, v: i64) {
        let floored = v.max(MIN_REPEAT_MS);
        self.repeat_rate_ms.store(floored, Ordering::Relaxed);
        let _ = self.changes.send(DefaultChanged::RepeatRate(floored));
    }

    pub fn set_repeat_delay_ms(&self, v: i64) {
        let floored = v.max(MIN_REPEAT_MS);
        self.repeat_delay_ms.store(floored, Ordering::Relaxed);
        let _ = self.changes.send(DefaultChanged::RepeatDelay(floored));
    }

    pub fn increment_repeat_rate_ms(&self, delta: i64) {
        self.set_repeat_rate_ms(self.repeat_rate_ms() + delta);
    }

    pub fn decrement_repeat_rate_ms(&self, delta: i64) {
        self.set_repeat_rate_ms(self.repeat_rate_ms() - delta);
    }

    pub fn increment_repeat_delay_ms(&self, delta: i64) {
        self.set_repeat_delay_ms(self.repeat_delay_ms() + delta);
    }

    pub fn decrement_repeat_delay_ms(&self, delta: i64) {
        self.set_repeat_delay_ms(self.repeat_delay_ms() - delta);
    }
}

/// Resolve an instance's effective repeat interval: its own value if
/// non-negative, otherwise the process default; floored to
/// [`MIN_REPEAT_MS`] either way.
pub fn effective_interval_ms(instance_value: i64, process_default_ms: i64) -> i64 {
    let raw = if instance_value >= 0 { instance_value } else { process_default_ms };
    raw.max(MIN_REPEAT_MS)
}

#[cfg(test)]
#[path = "process_defaults_tests.rs"]
mod tests;
