use std::fmt;

/// Why a call record did not fit a routine's signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MismatchReason {
    Arity { expected: usize, found: usize },
    Type { index: usize, expected: &'static str, found: String },
    Range { index: usize, value: i64 },
}

/// The adapter's only error: a call record that does not match the routine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentMismatch {
    pub routine: &'static str,
    pub reason: MismatchReason,
}

impl ArgumentMismatch {
    pub fn arity(routine: &'static str, expected: usize, found: usize) -> Self {
        Self {
            routine,
            reason: MismatchReason::Arity { expected, found },
        }
    }

    pub fn wrong_type(routine: &'static str, index: usize, expected: &'static str, found: &str) -> Self {
        Self {
            routine,
            reason: MismatchReason::Type {
                index,
                expected,
                found: found.to_string(),
            },
        }
    }

    pub fn out_of_range(routine: &'static str, index: usize, value: i64) -> Self {
        Self {
            routine,
            reason: MismatchReason::Range { index, value },
        }
    }
}

impl fmt::Display for ArgumentMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            MismatchReason::Arity { expected: 0, found } => {
                write!(f, "{}() takes no arguments ({} given)", self.routine, found)
            }
            MismatchReason::Arity { expected, found } => {
                let noun = if *expected == 1 { "argument" } else { "arguments" };
                write!(
                    f,
                    "{}() takes exactly {} {} ({} given)",
                    self.routine, expected, noun, found
                )
            }
            MismatchReason::Type { index, expected, found } => {
                write!(
                    f,
                    "{}() argument {} must be {}, not {}",
                    self.routine,
                    index + 1,
                    expected,
                    found
                )
            }
            MismatchReason::Range { index, value } => {
                write!(
                    f,
                    "{}() argument {} out of range for a 32-bit int: {}",
                    self.routine,
                    index + 1,
                    value
                )
            }
        }
    }
}

impl std::error::Error for ArgumentMismatch {}

/// Failure to route a call through a dispatch table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    UnknownRoutine(String),
    Argument(ArgumentMismatch),
    /// The routine returned a kind of value its caller cannot use
    UnexpectedReturn { routine: String, found: String },
}

impl From<ArgumentMismatch> for DispatchError {
    fn from(err: ArgumentMismatch) -> Self {
        Self::Argument(err)
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownRoutine(name) => write!(f, "no routine named '{}'", name),
            Self::Argument(err) => write!(f, "{}", err),
            Self::UnexpectedReturn { routine, found } => {
                write!(f, "{}() returned {}, expected int", routine, found)
            }
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Argument(err) => Some(err),
            Self::UnknownRoutine(_) | Self::UnexpectedReturn { .. } => None,
        }
    }
}

/// Rejected dispatch table definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    DuplicateRoutine(&'static str),
    /// Declared signature or return type disagrees with the native entry
    ShapeMismatch(&'static str),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateRoutine(name) => write!(f, "routine '{}' registered twice", name),
            Self::ShapeMismatch(name) => {
                write!(f, "routine '{}' declares a shape its entry point does not have", name)
            }
        }
    }
}

impl std::error::Error for BuildError {}
