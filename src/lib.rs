//! Extest - native numeric and string routines exposed to a scripting host
//!
//! The binding adapter validates host arguments, calls a native routine, and
//! optionally gives up the host's global execution lock while it runs. The
//! same dispatch table serves the in-process [`Runtime`] and, with the
//! `python` feature, a CPython extension module.

// Core modules
pub mod native;
pub mod runtime;
pub mod binding;
pub mod mathlib;
pub mod contention;
pub mod infrastructure;

#[cfg(feature = "python")]
pub mod python;

// Re-export commonly used items
pub use binding::{
    dispatch_table, ArgType, ArgumentMismatch, DispatchError, DispatchTable, InteropStats,
    LockPolicy, RoutineDescriptor,
};
pub use contention::{measure, ProgressReport};
pub use infrastructure::{
    init_dev_logging, init_logging, init_prod_logging, Config, LogConfig, LogFormat, LogOutput,
};
pub use runtime::{CallRecord, Gil, HostLock, Runtime, Value};
