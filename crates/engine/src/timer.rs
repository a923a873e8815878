//! Script timer manager. One instance per engine, owned
//! exclusively by that engine's worker thread — never shared, so it needs
//! no lock of its own (the engine's single-threaded cooperative model
//! already serializes every access).

use crate::script::{Callable, ScriptValue};
use std::collections::HashMap;
use std::time::Duration;

/// Minimum delay enforced the same way the scheduler floors repeat rate
/// and delay; a zero or negative delay still dispatches
/// asynchronously rather than re-entering the caller.
pub const MIN_TICK: Duration = Duration::from_millis(0);

#[derive(Debug, Clone)]
pub struct TimerEntry {
    pub instance_name: String,
    pub callable: Callable,
    pub args: Vec<ScriptValue>,
    pub repeating: bool,
    pub interval: Duration,
}

#[derive(Debug, Default)]
pub struct TimerManager {
    next_id: u64,
    entries: HashMap<u64, TimerEntry>,
}

impl TimerManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Register a one-shot timer. Returns the new id and the delay the
    /// caller should schedule the wakeup after (zero-or-negative input
    /// delays still go through the async enqueue, never inline).
    pub fn set_timeout(
        &mut self,
        callable: Callable,
        args: Vec<ScriptValue>,
        delay: Duration,
        instance_name: &str,
    ) -> (u64, Duration) {
        let id = self.alloc_id();
        self.entries.insert(
            id,
            TimerEntry {
                instance_name: instance_name.to_string(),
                callable,
                args,
                repeating: false,
                interval: delay,
            },
        );
        (id, delay.max(MIN_TICK))
    }

    pub fn set_interval(
        &mut self,
        callable: Callable,
        args: Vec<ScriptValue>,
        interval: Duration,
        instance_name: &str,
    ) -> (u64, Duration) {
        let id = self.alloc_id();
        self.entries.insert(
            id,
            TimerEntry {
                instance_name: instance_name.to_string(),
                callable,
                args,
                repeating: true,
                interval,
            },
        );
        (id, interval.max(MIN_TICK))
    }

    /// Remove a timer by id. Returns whether it was present.
    pub fn clear(&mut self, id: u64) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// Remove every timer owned by `instance_name`. Returns how many were
    /// removed.
    pub fn clear_for_instance(&mut self, instance_name: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.instance_name != instance_name);
        before - self.entries.len()
    }

    pub fn clear_all(&mut self) -> usize {
        let n = self.entries.len();
        self.entries.clear();
        n
    }

    /// Whether `id` is still present — the check a firing callback makes
    /// before invoking, since `clear` must be observable mid-fire.
    pub fn is_present(&self, id: u64) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn get(&self, id: u64) -> Option<&TimerEntry> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;
