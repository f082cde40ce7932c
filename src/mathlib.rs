//! Host-side helpers over the `Extest` routines

use crate::binding::{dispatch_table, DispatchError, DispatchTable};
use crate::runtime::{HostLock, Value};

fn call_long<L: HostLock>(table: &DispatchTable, lock: &mut L, name: &str, x: i64) -> Result<i64, DispatchError> {
    match table.call(lock, name, &[Value::Int(x)])? {
        Value::Int(n) => Ok(n),
        other => Err(DispatchError::UnexpectedReturn {
            routine: name.to_string(),
            found: other.type_name().to_string(),
        }),
    }
}

/// Factorial; small inputs are answered without crossing the binding
pub fn fac<L: HostLock>(lock: &mut L, x: i64) -> Result<i64, DispatchError> {
    if x < 2 {
        return Ok(1);
    }
    call_long(dispatch_table(), lock, "fac", x)
}

pub fn fib<L: HostLock>(lock: &mut L, x: i64) -> Result<i64, DispatchError> {
    call_long(dispatch_table(), lock, "fib", x)
}

/// Fibonacci with the global lock released during the computation
pub fn fib2<L: HostLock>(lock: &mut L, x: i64) -> Result<i64, DispatchError> {
    call_long(dispatch_table(), lock, "fib2", x)
}

/// Sum of `fib(i)` for `i` in `0..value`
pub fn fib_multi<L: HostLock>(lock: &mut L, value: i64) -> Result<i64, DispatchError> {
    (0..value).try_fold(0i64, |acc, i| Ok(acc.wrapping_add(fib(lock, i)?)))
}

/// Sum of `fib2(i)` for `i` in `0..value`; each term releases the lock
pub fn fib2_multi<L: HostLock>(lock: &mut L, value: i64) -> Result<i64, DispatchError> {
    (0..value).try_fold(0i64, |acc, i| Ok(acc.wrapping_add(fib2(lock, i)?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{LockPolicy, NativeEntry, RoutineDescriptor};
    use crate::native;
    use crate::runtime::Runtime;

    #[test]
    fn test_fac_shortcut_and_dispatch() {
        let rt = Runtime::new();
        let mut gil = rt.acquire();
        assert_eq!(fac(&mut gil, -1).unwrap(), 1);
        assert_eq!(fac(&mut gil, 1).unwrap(), 1);
        assert_eq!(fac(&mut gil, 5).unwrap(), 120);
    }

    #[test]
    fn test_multi_sums_agree() {
        let rt = Runtime::new();
        let mut gil = rt.acquire();
        let expected: i64 = (0..12).map(native::fibonacci).sum();
        assert_eq!(fib_multi(&mut gil, 12).unwrap(), expected);
        assert_eq!(fib2_multi(&mut gil, 12).unwrap(), expected);
        assert_eq!(fib_multi(&mut gil, 0).unwrap(), 0);
    }

    #[test]
    fn test_non_int_result_is_an_error() {
        let table = DispatchTable::builder()
            .routine(RoutineDescriptor::new("fac", LockPolicy::Hold, NativeEntry::IntToUnit(native::countdown)))
            .build()
            .unwrap();
        let rt = Runtime::new();
        let mut gil = rt.acquire();

        let err = call_long(&table, &mut gil, "fac", 3).unwrap_err();
        assert_eq!(
            err,
            DispatchError::UnexpectedReturn { routine: "fac".into(), found: "NoneType".into() }
        );
        assert_eq!(err.to_string(), "fac() returned NoneType, expected int");
    }
}
