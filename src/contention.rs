//! Contention measurement - does other scripting work progress during a call?
//!
//! A background scripting thread holds the global lock and bumps a tick
//! counter, yielding the lock between ticks. The caller then invokes a
//! routine while holding the lock. A tick can only be recorded by a thread
//! holding the lock, so any tick seen during the call means the routine
//! gave the lock up.

use crate::binding::{DispatchError, DispatchTable, LockPolicy};
use crate::runtime::{Runtime, Value};
use crossbeam::channel::{self, TryRecvError};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Outcome of one measured call
#[derive(Debug, Clone)]
pub struct ProgressReport {
    pub routine: String,
    pub policy: LockPolicy,
    pub result: Value,
    /// Ticks recorded by the background thread while the call was in flight
    pub ticks_during_call: u64,
    pub elapsed: Duration,
}

impl ProgressReport {
    pub fn others_progressed(&self) -> bool {
        self.ticks_during_call > 0
    }
}

impl fmt::Display for ProgressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<10} policy={:<7} result={} elapsed={:.3?} background_ticks={}",
            self.routine, self.policy, self.result, self.elapsed, self.ticks_during_call
        )
    }
}

/// Invoke `name` from `table` while a background scripting thread competes
/// for the global lock.
pub fn measure(
    runtime: &Runtime,
    table: &DispatchTable,
    name: &str,
    record: &[Value],
) -> Result<ProgressReport, DispatchError> {
    let routine = table
        .get(name)
        .ok_or_else(|| DispatchError::UnknownRoutine(name.to_string()))?;

    let ticks = Arc::new(AtomicU64::new(0));
    let (stop_tx, stop_rx) = channel::bounded::<()>(1);

    let ticker = {
        let ticks = Arc::clone(&ticks);
        runtime.spawn(move |gil| loop {
            match stop_rx.try_recv() {
                Err(TryRecvError::Empty) => {}
                _ => break,
            }
            ticks.fetch_add(1, Ordering::SeqCst);
            gil.yield_now();
        })
    };

    let mut gil = runtime.acquire();
    let start_ticks = ticks.load(Ordering::SeqCst);
    let started = Instant::now();
    let result = table.call(&mut gil, name, record);
    let elapsed = started.elapsed();
    let ticks_during_call = ticks.load(Ordering::SeqCst) - start_ticks;

    // Stop is signalled while still holding the lock so the ticker sees it on
    // its next turn.
    if stop_tx.send(()).is_err() {
        warn!("contention ticker exited early");
    }
    drop(gil);
    if ticker.join().is_err() {
        warn!("contention ticker panicked");
    }

    let result = result?;
    debug!(routine = name, ticks_during_call, ?elapsed, "contention measurement finished");

    Ok(ProgressReport {
        routine: routine.name().to_string(),
        policy: routine.policy(),
        result,
        ticks_during_call,
        elapsed,
    })
}
