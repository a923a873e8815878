use super::*;
use crate::script::Callable;

fn source(s: &str) -> Callable {
    Callable::Source(s.to_string())
}

#[test]
fn set_timeout_allocates_monotonic_ids() {
    let mut mgr = TimerManager::new();
    let (a, _) = mgr.set_timeout(source("1"), vec![], Duration::from_millis(10), "X");
    let (b, _) = mgr.set_timeout(source("2"), vec![], Duration::from_millis(10), "X");
    assert!(b > a);
}

#[test]
fn clear_removes_entry_and_is_observable() {
    let mut mgr = TimerManager::new();
    let (id, _) = mgr.set_timeout(source("1"), vec![], Duration::from_millis(10), "X");
    assert!(mgr.is_present(id));
    assert!(mgr.clear(id));
    assert!(!mgr.is_present(id));
    assert!(!mgr.clear(id));
}

#[test]
fn clear_for_instance_removes_only_that_instances_timers() {
    let mut mgr = TimerManager::new();
    let (a, _) = mgr.set_timeout(source("1"), vec![], Duration::from_millis(10), "X");
    let (b, _) = mgr.set_timeout(source("2"), vec![], Duration::from_millis(10), "Y");
    assert_eq!(mgr.clear_for_instance("X"), 1);
    assert!(!mgr.is_present(a));
    assert!(mgr.is_present(b));
}

#[test]
fn clear_all_empties_table() {
    let mut mgr = TimerManager::new();
    mgr.set_timeout(source("1"), vec![], Duration::from_millis(10), "X");
    mgr.set_interval(source("2"), vec![], Duration::from_millis(10), "Y");
    assert_eq!(mgr.clear_all(), 2);
    assert!(mgr.is_empty());
}

#[test]
fn zero_delay_still_floors_to_async_dispatch() {
    let mut mgr = TimerManager::new();
    let (_, delay) = mgr.set_timeout(source("1"), vec![], Duration::from_millis(0), "X");
    assert_eq!(delay, Duration::from_millis(0));
}

#[test]
fn interval_entry_marked_repeating() {
    let mut mgr = TimerManager::new();
    let (id, _) = mgr.set_interval(source("1"), vec![], Duration::from_millis(50), "X");
    assert!(mgr.get(id).unwrap().repeating);
}
