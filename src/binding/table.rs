//! Dispatch table - routine name → descriptor, built once and then read-only

use super::errors::{BuildError, DispatchError};
use super::routine::{NativeEntry, RoutineDescriptor};
use super::types::LockPolicy;
use crate::native;
use crate::runtime::{HostLock, Value};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info_span, warn};

static EXTEST: Lazy<DispatchTable> = Lazy::new(|| {
    DispatchTable::extest().expect("standard routine table is well-formed")
});

/// The process-wide standard table
pub fn dispatch_table() -> &'static DispatchTable {
    &EXTEST
}

/// Call counters for one table
#[derive(Debug, Default)]
struct CallCounters {
    calls_made: AtomicU64,
    rejected_calls: AtomicU64,
    lock_releases: AtomicU64,
}

/// Snapshot of a table's call statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteropStats {
    pub calls_made: u64,
    pub rejected_calls: u64,
    pub lock_releases: u64,
}

/// Immutable mapping from routine name to its descriptor
#[derive(Debug)]
pub struct DispatchTable {
    routines: Vec<RoutineDescriptor>,
    index: HashMap<&'static str, usize>,
    counters: CallCounters,
}

impl DispatchTable {
    pub fn builder() -> DispatchTableBuilder {
        DispatchTableBuilder::default()
    }

    /// The `Extest` routine set
    pub fn extest() -> Result<Self, BuildError> {
        Self::builder()
            .routine(RoutineDescriptor::new("fac", LockPolicy::Hold, NativeEntry::LongToLong(native::factorial)))
            .routine(RoutineDescriptor::new("fib", LockPolicy::Hold, NativeEntry::LongToLong(native::fibonacci)))
            .routine(RoutineDescriptor::new("fib2", LockPolicy::Release, NativeEntry::LongToLong(native::fibonacci)))
            .routine(RoutineDescriptor::new("doppel", LockPolicy::Hold, NativeEntry::StrToPair(doppel)))
            .routine(RoutineDescriptor::new("countdown", LockPolicy::Hold, NativeEntry::IntToUnit(native::countdown)))
            .routine(RoutineDescriptor::new("test", LockPolicy::Hold, NativeEntry::Nullary(print_demo)))
            .build()
    }

    pub fn get(&self, name: &str) -> Option<&RoutineDescriptor> {
        self.index.get(name).map(|&i| &self.routines[i])
    }

    /// Routine names in registration order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.routines.iter().map(RoutineDescriptor::name)
    }

    pub fn routines(&self) -> &[RoutineDescriptor] {
        &self.routines
    }

    pub fn len(&self) -> usize {
        self.routines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routines.is_empty()
    }

    /// Look up `name` and invoke it with `record`
    pub fn call<L: HostLock>(&self, lock: &mut L, name: &str, record: &[Value]) -> Result<Value, DispatchError> {
        let routine = self
            .get(name)
            .ok_or_else(|| DispatchError::UnknownRoutine(name.to_string()))?;

        let span = info_span!("call", routine = routine.name(), policy = %routine.policy());
        let _enter = span.enter();

        self.counters.calls_made.fetch_add(1, Ordering::Relaxed);
        let prepared = match routine.validate(record) {
            Ok(prepared) => prepared,
            Err(err) => {
                self.counters.rejected_calls.fetch_add(1, Ordering::Relaxed);
                return Err(err.into());
            }
        };

        // Counted before running: the lock is given up even if the routine unwinds.
        if routine.policy() == LockPolicy::Release {
            self.counters.lock_releases.fetch_add(1, Ordering::Relaxed);
        }
        Ok(routine.execute(lock, prepared))
    }

    pub fn stats(&self) -> InteropStats {
        InteropStats {
            calls_made: self.counters.calls_made.load(Ordering::Relaxed),
            rejected_calls: self.counters.rejected_calls.load(Ordering::Relaxed),
            lock_releases: self.counters.lock_releases.load(Ordering::Relaxed),
        }
    }
}

/// Collects descriptors and checks them once at build time
#[derive(Debug, Default)]
pub struct DispatchTableBuilder {
    routines: Vec<RoutineDescriptor>,
}

impl DispatchTableBuilder {
    pub fn routine(mut self, routine: RoutineDescriptor) -> Self {
        self.routines.push(routine);
        self
    }

    pub fn build(self) -> Result<DispatchTable, BuildError> {
        let mut index = HashMap::with_capacity(self.routines.len());

        for (i, routine) in self.routines.iter().enumerate() {
            if index.insert(routine.name(), i).is_some() {
                return Err(BuildError::DuplicateRoutine(routine.name()));
            }
        }

        Ok(DispatchTable {
            routines: self.routines,
            index,
            counters: CallCounters::default(),
        })
    }
}

/// Return the original alongside a reversed duplicate; the input is only read
fn doppel(orig: &str) -> (String, String) {
    (orig.to_string(), native::reversed(orig))
}

/// The demonstration text, as the `test` routine prints it
pub(super) fn demo_text() -> String {
    let mut buf = Vec::new();
    if let Err(e) = native::demo(&mut buf) {
        warn!(error = %e, "failed to render demonstration output");
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn print_demo() {
    print!("{}", demo_text());
}
