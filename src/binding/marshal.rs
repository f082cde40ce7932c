//! Type marshaling - host values ↔ native arguments
//!
//! Design: validate the whole call record before anything native runs.
//! Strings are borrowed straight out of the record, never copied here.

use super::errors::ArgumentMismatch;
use super::types::{ArgType, NativeArg, NativeReturn};
use crate::runtime::Value;
use smallvec::SmallVec;

/// Unpacked arguments for one call
pub type NativeArgs<'a> = SmallVec<[NativeArg<'a>; 4]>;

/// Convert one host value to the declared native type
pub fn to_native<'a>(
    routine: &'static str,
    index: usize,
    value: &'a Value,
    ty: ArgType,
) -> Result<NativeArg<'a>, ArgumentMismatch> {
    let mismatch = || ArgumentMismatch::wrong_type(routine, index, ty.host_name(), value.type_name());

    match ty {
        ArgType::Long => integral(value).map(NativeArg::Long).ok_or_else(mismatch),
        ArgType::Int => {
            let wide = integral(value).ok_or_else(mismatch)?;
            i32::try_from(wide)
                .map(NativeArg::Int)
                .map_err(|_| ArgumentMismatch::out_of_range(routine, index, wide))
        }
        ArgType::Str => value.as_str().map(NativeArg::Str).ok_or_else(mismatch),
    }
}

// Booleans are integers to the host.
#[inline]
fn integral(value: &Value) -> Option<i64> {
    match value {
        Value::Int(i) => Some(*i),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

/// Check arity, then convert every element of the record
pub fn marshal_args<'a>(
    routine: &'static str,
    record: &'a [Value],
    signature: &[ArgType],
) -> Result<NativeArgs<'a>, ArgumentMismatch> {
    if record.len() != signature.len() {
        return Err(ArgumentMismatch::arity(routine, signature.len(), record.len()));
    }

    record
        .iter()
        .zip(signature)
        .enumerate()
        .map(|(i, (value, &ty))| to_native(routine, i, value, ty))
        .collect()
}

/// Wrap a native result in the host's value representation
pub fn from_native(ret: NativeReturn) -> Value {
    match ret {
        NativeReturn::Long(v) => Value::Int(v),
        NativeReturn::Pair(original, transformed) => {
            Value::Tuple(vec![Value::Str(original), Value::Str(transformed)])
        }
        NativeReturn::Unit => Value::None,
    }
}
