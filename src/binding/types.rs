//! Type descriptors for the native side of a binding

use std::fmt;

/// Declared type of one native argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    /// 64-bit signed integer
    Long,
    /// 32-bit signed integer; wider host ints are rejected
    Int,
    /// Borrowed text
    Str,
}

impl ArgType {
    /// Host type name expected for this argument (for error messages)
    pub const fn host_name(self) -> &'static str {
        match self {
            Self::Long | Self::Int => "int",
            Self::Str => "str",
        }
    }

    #[inline]
    pub const fn is_integral(self) -> bool {
        matches!(self, Self::Long | Self::Int)
    }
}

/// Declared native return type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnType {
    Long,
    /// (original, transformed) string pair
    Pair,
    Unit,
}

/// An unpacked, validated native argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeArg<'a> {
    Long(i64),
    Int(i32),
    Str(&'a str),
}

impl NativeArg<'_> {
    pub const fn ty(&self) -> ArgType {
        match self {
            Self::Long(_) => ArgType::Long,
            Self::Int(_) => ArgType::Int,
            Self::Str(_) => ArgType::Str,
        }
    }
}

/// Value produced by a native routine, before wrapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeReturn {
    Long(i64),
    Pair(String, String),
    Unit,
}

impl NativeReturn {
    pub const fn ty(&self) -> ReturnType {
        match self {
            Self::Long(_) => ReturnType::Long,
            Self::Pair(..) => ReturnType::Pair,
            Self::Unit => ReturnType::Unit,
        }
    }
}

/// Whether a routine gives up the global lock while it runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockPolicy {
    Release,
    Hold,
}

impl fmt::Display for LockPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Release => write!(f, "release"),
            Self::Hold => write!(f, "hold"),
        }
    }
}

/// Stage of a single call, logged as the call moves through the adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPhase {
    Idle,
    ValidatingArgs,
    Rejected,
    LockReleased,
    NativeExecuting,
    LockReacquired,
    ResultReady,
}

impl fmt::Display for CallPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::ValidatingArgs => "validating_args",
            Self::Rejected => "rejected",
            Self::LockReleased => "lock_released",
            Self::NativeExecuting => "native_executing",
            Self::LockReacquired => "lock_reacquired",
            Self::ResultReady => "result_ready",
        };
        f.write_str(name)
    }
}
