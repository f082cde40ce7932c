//! Global lock behaviour around native calls
//!
//! A `Release` routine must let other scripting threads run while it
//! computes; a `Hold` routine must not.

use extest::binding::NativeEntry;
use extest::{measure, DispatchTable, LockPolicy, RoutineDescriptor, Runtime, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

const PATIENCE: Duration = Duration::from_secs(5);

static RELEASED_PEER_RAN: AtomicBool = AtomicBool::new(false);
static HELD_PEER_RAN: AtomicBool = AtomicBool::new(false);

/// Spin until `flag` is set or patience runs out; 1 if it was seen
fn wait_for(flag: &AtomicBool, patience: Duration) -> i64 {
    let deadline = Instant::now() + patience;
    while Instant::now() < deadline {
        if flag.load(Ordering::SeqCst) {
            return 1;
        }
        thread::yield_now();
    }
    0
}

fn wait_released_peer(_: i64) -> i64 {
    wait_for(&RELEASED_PEER_RAN, PATIENCE)
}

fn wait_held_peer(_: i64) -> i64 {
    wait_for(&HELD_PEER_RAN, Duration::from_millis(200))
}

fn nap(ms: i64) -> i64 {
    thread::sleep(Duration::from_millis(ms as u64));
    ms
}

#[test]
fn test_release_lets_peer_progress() {
    let table = DispatchTable::builder()
        .routine(RoutineDescriptor::new("waiter", LockPolicy::Release, NativeEntry::LongToLong(wait_released_peer)))
        .build()
        .unwrap();

    let rt = Runtime::new();
    let mut gil = rt.acquire();
    let peer = rt.spawn(|_gil| RELEASED_PEER_RAN.store(true, Ordering::SeqCst));

    let seen = table.call(&mut gil, "waiter", &[Value::Int(0)]).unwrap();
    assert_eq!(seen, Value::Int(1));

    drop(gil);
    peer.join().unwrap();
}

#[test]
fn test_hold_keeps_peer_waiting() {
    let table = DispatchTable::builder()
        .routine(RoutineDescriptor::new("waiter", LockPolicy::Hold, NativeEntry::LongToLong(wait_held_peer)))
        .build()
        .unwrap();

    let rt = Runtime::new();
    let mut gil = rt.acquire();
    let peer = rt.spawn(|_gil| HELD_PEER_RAN.store(true, Ordering::SeqCst));

    let seen = table.call(&mut gil, "waiter", &[Value::Int(0)]).unwrap();
    assert_eq!(seen, Value::Int(0));
    assert!(!HELD_PEER_RAN.load(Ordering::SeqCst));

    drop(gil);
    peer.join().unwrap();
    assert!(HELD_PEER_RAN.load(Ordering::SeqCst));
}

#[test]
fn test_lock_is_held_again_after_release() {
    let table = DispatchTable::extest().unwrap();
    let rt = Runtime::new();
    let mut gil = rt.acquire();

    table.call(&mut gil, "fib2", &[Value::Int(15)]).unwrap();
    assert!(rt.is_locked());
    assert!(rt.try_acquire().is_none());
}

#[test]
fn test_ticks_seen_only_for_release() {
    let table = DispatchTable::builder()
        .routine(RoutineDescriptor::new("nap_held", LockPolicy::Hold, NativeEntry::LongToLong(nap)))
        .routine(RoutineDescriptor::new("nap_released", LockPolicy::Release, NativeEntry::LongToLong(nap)))
        .build()
        .unwrap();
    let rt = Runtime::new();

    let held = measure(&rt, &table, "nap_held", &[Value::Int(100)]).unwrap();
    assert_eq!(held.ticks_during_call, 0);
    assert_eq!(held.result, Value::Int(100));

    let released = measure(&rt, &table, "nap_released", &[Value::Int(300)]).unwrap();
    assert!(released.others_progressed(), "{}", released);
    assert_eq!(released.policy, LockPolicy::Release);
}

#[test]
fn test_standard_fib2_counts_one_release() {
    let rt = Runtime::new();
    let table = DispatchTable::extest().unwrap();
    let report = measure(&rt, &table, "fib2", &[Value::Int(20)]).unwrap();
    assert_eq!(report.result, Value::Int(10946));
    assert_eq!(table.stats().lock_releases, 1);
    assert!(!rt.is_locked());
}

#[test]
fn test_standard_fib2_lets_others_progress_at_depth() {
    let rt = Runtime::new();
    let table = DispatchTable::extest().unwrap();

    let held = measure(&rt, &table, "fib", &[Value::Int(30)]).unwrap();
    assert_eq!(held.result, Value::Int(1346269));
    assert_eq!(held.ticks_during_call, 0, "{}", held);

    let released = measure(&rt, &table, "fib2", &[Value::Int(30)]).unwrap();
    assert_eq!(released.result, held.result);
    assert!(released.others_progressed(), "{}", released);
}
