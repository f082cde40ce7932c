//! Binding adapter - expose native routines to a scripting host by name
//!
//! Architecture:
//! - `types.rs` - argument/return descriptors, lock policy, call phases
//! - `marshal.rs` - host value ↔ native argument conversions
//! - `routine.rs` - routine descriptors and the per-call contract
//! - `table.rs` - the dispatch table and its call statistics
//! - `errors.rs` - `ArgumentMismatch` and friends

mod errors;
mod marshal;
mod routine;
mod table;
mod types;

pub use errors::{ArgumentMismatch, BuildError, DispatchError, MismatchReason};
pub use marshal::{from_native, marshal_args, to_native, NativeArgs};
pub use routine::{NativeEntry, RoutineDescriptor};
pub use table::{dispatch_table, DispatchTable, DispatchTableBuilder, InteropStats};
pub use types::{ArgType, CallPhase, LockPolicy, NativeArg, NativeReturn, ReturnType};
