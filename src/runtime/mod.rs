//! Host runtime abstraction
//!
//! Design: one global execution lock serializes all scripting-level work.
//! Native code may give it up for the duration of a blocking computation
//! through [`HostLock::release_during`], which always takes it back.

mod value;

pub use value::{CallRecord, Value};

use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Anything that owns a host's global execution lock.
///
/// The binding layer is generic over this so the same dispatch code runs
/// against [`Gil`] and, with the `python` feature, the CPython GIL.
pub trait HostLock {
    /// Run `f` with the lock released, reacquiring it afterwards on every
    /// exit path.
    fn release_during<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send;
}

/// Scripting host with a single global execution lock
#[derive(Clone, Default)]
pub struct Runtime {
    lock: Arc<Mutex<()>>,
}

impl Runtime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until the global lock is held
    pub fn acquire(&self) -> Gil<'_> {
        Gil {
            guard: self.lock.lock(),
        }
    }

    /// Try to take the global lock without blocking
    pub fn try_acquire(&self) -> Option<Gil<'_>> {
        self.lock.try_lock().map(|guard| Gil { guard })
    }

    /// Whether some thread currently holds the global lock
    pub fn is_locked(&self) -> bool {
        self.lock.is_locked()
    }

    /// Start a scripting-level thread; `f` runs with the global lock held
    pub fn spawn<F, R>(&self, f: F) -> JoinHandle<R>
    where
        F: FnOnce(&mut Gil<'_>) -> R + Send + 'static,
        R: Send + 'static,
    {
        let runtime = self.clone();
        thread::spawn(move || {
            let mut gil = runtime.acquire();
            f(&mut gil)
        })
    }
}

/// Proof that the current thread holds the global execution lock
pub struct Gil<'rt> {
    guard: MutexGuard<'rt, ()>,
}

impl Gil<'_> {
    /// Release the lock while `f` runs
    pub fn allow_threads<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        MutexGuard::unlocked(&mut self.guard, f)
    }

    /// Hand the lock to a waiting thread, if any, then take it back
    pub fn yield_now(&mut self) {
        MutexGuard::bump(&mut self.guard);
    }
}

impl HostLock for Gil<'_> {
    fn release_during<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        self.allow_threads(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};

    #[test]
    fn test_acquire_excludes_others() {
        let rt = Runtime::new();
        let gil = rt.acquire();
        assert!(rt.is_locked());
        assert!(rt.try_acquire().is_none());
        drop(gil);
        assert!(!rt.is_locked());
    }

    #[test]
    fn test_allow_threads_releases_and_reacquires() {
        let rt = Runtime::new();
        let mut gil = rt.acquire();
        let seen_unlocked = gil.allow_threads(|| !rt.is_locked());
        assert!(seen_unlocked);
        assert!(rt.is_locked());
    }

    #[test]
    fn test_allow_threads_reacquires_on_unwind() {
        let rt = Runtime::new();
        let mut gil = rt.acquire();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            gil.allow_threads(|| panic!("native failure"));
        }));
        assert!(result.is_err());
        assert!(rt.is_locked());
        assert!(rt.try_acquire().is_none());
    }

    #[test]
    fn test_spawn_runs_under_lock() {
        let rt = Runtime::new();
        let observer = rt.clone();
        let held = rt.spawn(move |_gil| observer.is_locked()).join().unwrap();
        assert!(held);
    }
}
