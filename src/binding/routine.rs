//! Routine descriptors and the per-call contract
//!
//! A call moves `Idle → ValidatingArgs → Rejected` or, when the record fits,
//! through `[LockReleased →] NativeExecuting [→ LockReacquired] → ResultReady`.
//! The bracketed steps only happen for [`LockPolicy::Release`].

use super::errors::{ArgumentMismatch, BuildError};
use super::marshal::{from_native, marshal_args};
use super::types::{ArgType, CallPhase, LockPolicy, NativeArg, NativeReturn, ReturnType};
use crate::runtime::{HostLock, Value};
use std::fmt;
use tracing::{debug, trace};

/// Native entry point, tagged by calling shape
#[derive(Clone, Copy)]
pub enum NativeEntry {
    LongToLong(fn(i64) -> i64),
    IntToUnit(fn(i32)),
    StrToPair(fn(&str) -> (String, String)),
    Nullary(fn()),
}

impl NativeEntry {
    /// Argument types this entry point actually takes
    pub const fn signature(&self) -> &'static [ArgType] {
        match self {
            Self::LongToLong(_) => &[ArgType::Long],
            Self::IntToUnit(_) => &[ArgType::Int],
            Self::StrToPair(_) => &[ArgType::Str],
            Self::Nullary(_) => &[],
        }
    }

    pub const fn returns(&self) -> ReturnType {
        match self {
            Self::LongToLong(_) => ReturnType::Long,
            Self::StrToPair(_) => ReturnType::Pair,
            Self::IntToUnit(_) | Self::Nullary(_) => ReturnType::Unit,
        }
    }

    /// Pair the entry with unpacked arguments; `None` if they don't fit
    fn prepare<'a>(self, args: &[NativeArg<'a>]) -> Option<PreparedCall<'a>> {
        match (self, args) {
            (Self::LongToLong(f), [NativeArg::Long(n)]) => Some(PreparedCall::LongToLong(f, *n)),
            (Self::IntToUnit(f), [NativeArg::Int(n)]) => Some(PreparedCall::IntToUnit(f, *n)),
            (Self::StrToPair(f), [NativeArg::Str(s)]) => Some(PreparedCall::StrToPair(f, *s)),
            (Self::Nullary(f), []) => Some(PreparedCall::Nullary(f)),
            _ => None,
        }
    }
}

impl fmt::Debug for NativeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = match self {
            Self::LongToLong(_) => "LongToLong",
            Self::IntToUnit(_) => "IntToUnit",
            Self::StrToPair(_) => "StrToPair",
            Self::Nullary(_) => "Nullary",
        };
        write!(f, "NativeEntry::{}", shape)
    }
}

/// A native call with its arguments bound, ready to run off-lock
pub(super) enum PreparedCall<'a> {
    LongToLong(fn(i64) -> i64, i64),
    IntToUnit(fn(i32), i32),
    StrToPair(fn(&str) -> (String, String), &'a str),
    Nullary(fn()),
}

impl PreparedCall<'_> {
    fn run(self) -> NativeReturn {
        match self {
            Self::LongToLong(f, n) => NativeReturn::Long(f(n)),
            Self::IntToUnit(f, n) => {
                f(n);
                NativeReturn::Unit
            }
            Self::StrToPair(f, s) => {
                let (original, transformed) = f(s);
                NativeReturn::Pair(original, transformed)
            }
            Self::Nullary(f) => {
                f();
                NativeReturn::Unit
            }
        }
    }
}

/// Everything the adapter knows about one exposed routine.
///
/// Immutable once built. The declared shape always matches the entry point:
/// [`RoutineDescriptor::new`] takes it from the entry and
/// [`RoutineDescriptor::declared`] refuses a shape that disagrees.
#[derive(Debug, Clone)]
pub struct RoutineDescriptor {
    name: &'static str,
    signature: &'static [ArgType],
    returns: ReturnType,
    policy: LockPolicy,
    entry: NativeEntry,
}

impl RoutineDescriptor {
    /// Descriptor whose declared shape is taken from the entry point
    pub const fn new(name: &'static str, policy: LockPolicy, entry: NativeEntry) -> Self {
        Self {
            name,
            signature: entry.signature(),
            returns: entry.returns(),
            policy,
            entry,
        }
    }

    /// Descriptor with an explicitly declared shape, checked against `entry`
    pub fn declared(
        name: &'static str,
        signature: &'static [ArgType],
        returns: ReturnType,
        policy: LockPolicy,
        entry: NativeEntry,
    ) -> Result<Self, BuildError> {
        if signature != entry.signature() || returns != entry.returns() {
            return Err(BuildError::ShapeMismatch(name));
        }
        Ok(Self { name, signature, returns, policy, entry })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn signature(&self) -> &'static [ArgType] {
        self.signature
    }

    pub fn returns(&self) -> ReturnType {
        self.returns
    }

    pub fn policy(&self) -> LockPolicy {
        self.policy
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.signature.len()
    }

    /// Validate `record`, run the native routine under this routine's lock
    /// policy, and wrap the result.
    ///
    /// Mismatches are reported before the lock is touched or native code runs.
    pub fn invoke<L: HostLock>(&self, lock: &mut L, record: &[Value]) -> Result<Value, ArgumentMismatch> {
        let prepared = self.validate(record)?;
        Ok(self.execute(lock, prepared))
    }

    /// Check `record` against the signature and bind it to the entry point
    pub(super) fn validate<'a>(&self, record: &'a [Value]) -> Result<PreparedCall<'a>, ArgumentMismatch> {
        trace!(phase = %CallPhase::ValidatingArgs);
        let args = match marshal_args(self.name, record, self.signature) {
            Ok(args) => args,
            Err(err) => {
                debug!(phase = %CallPhase::Rejected, error = %err, "call rejected");
                return Err(err);
            }
        };

        match self.entry.prepare(&args) {
            Some(prepared) => Ok(prepared),
            // Construction guarantees signature == entry.signature(), and
            // marshal_args produced exactly that shape.
            None => unreachable!("descriptor '{}' disagrees with its entry point", self.name),
        }
    }

    /// Run a validated call under this routine's lock policy
    pub(super) fn execute<L: HostLock>(&self, lock: &mut L, prepared: PreparedCall<'_>) -> Value {
        let ret = match self.policy {
            LockPolicy::Release => {
                let ret = lock.release_during(move || {
                    trace!(phase = %CallPhase::LockReleased);
                    trace!(phase = %CallPhase::NativeExecuting);
                    prepared.run()
                });
                trace!(phase = %CallPhase::LockReacquired);
                ret
            }
            LockPolicy::Hold => {
                trace!(phase = %CallPhase::NativeExecuting);
                prepared.run()
            }
        };

        trace!(phase = %CallPhase::ResultReady);
        from_native(ret)
    }
}
