//! Dispatch contract of the standard `Extest` routine table

use extest::binding::MismatchReason;
use extest::{dispatch_table, DispatchError, DispatchTable, Runtime, Value};

fn call(name: &str, args: &[Value]) -> Result<Value, DispatchError> {
    let rt = Runtime::new();
    let mut gil = rt.acquire();
    dispatch_table().call(&mut gil, name, args)
}

fn mismatch(result: Result<Value, DispatchError>) -> MismatchReason {
    match result {
        Err(DispatchError::Argument(err)) => err.reason,
        other => panic!("expected ArgumentMismatch, got {:?}", other),
    }
}

#[test]
fn test_fac_values() {
    for (n, expected) in [(0, 1), (1, 1), (4, 24), (8, 40320), (12, 479001600)] {
        assert_eq!(call("fac", &[Value::Int(n)]).unwrap(), Value::Int(expected));
    }
}

#[test]
fn test_fib_and_fib2_agree() {
    for n in 0..20 {
        let held = call("fib", &[Value::Int(n)]).unwrap();
        let released = call("fib2", &[Value::Int(n)]).unwrap();
        assert_eq!(held, released, "fib({})", n);
    }
    assert_eq!(call("fib", &[Value::Int(0)]).unwrap(), Value::Int(1));
    assert_eq!(call("fib", &[Value::Int(1)]).unwrap(), Value::Int(1));
}

#[test]
fn test_doppel_returns_original_and_reversed() {
    let arg = Value::from("abcdef");
    let record = [arg.clone()];
    let result = call("doppel", &record).unwrap();

    assert_eq!(
        result,
        Value::Tuple(vec![Value::from("abcdef"), Value::from("fedcba")])
    );
    assert_eq!(record[0], arg);
}

#[test]
fn test_doppel_edge_strings() {
    let pair = |s: &str| call("doppel", &[Value::from(s)]).unwrap();
    assert_eq!(pair(""), Value::Tuple(vec![Value::from(""), Value::from("")]));
    assert_eq!(pair("madam"), Value::Tuple(vec![Value::from("madam"), Value::from("madam")]));
}

#[test]
fn test_countdown_returns_none() {
    assert_eq!(call("countdown", &[Value::Int(100_000)]).unwrap(), Value::None);
    assert_eq!(call("countdown", &[Value::Int(0)]).unwrap(), Value::None);
}

#[test]
fn test_countdown_rejects_wide_ints() {
    let reason = mismatch(call("countdown", &[Value::Int(1 << 40)]));
    assert_eq!(reason, MismatchReason::Range { index: 0, value: 1 << 40 });
}

#[test]
fn test_test_routine_returns_none() {
    assert_eq!(call("test", &[]).unwrap(), Value::None);
}

#[test]
fn test_wrong_arity_is_rejected() {
    assert_eq!(
        mismatch(call("fac", &[])),
        MismatchReason::Arity { expected: 1, found: 0 }
    );
    assert_eq!(
        mismatch(call("fib2", &[Value::Int(1), Value::Int(2)])),
        MismatchReason::Arity { expected: 1, found: 2 }
    );
    assert_eq!(
        mismatch(call("test", &[Value::Int(1)])),
        MismatchReason::Arity { expected: 0, found: 1 }
    );
}

#[test]
fn test_wrong_type_is_rejected() {
    let reason = mismatch(call("fib", &[Value::from("ten")]));
    assert_eq!(
        reason,
        MismatchReason::Type { index: 0, expected: "int", found: "str".to_string() }
    );

    let reason = mismatch(call("doppel", &[Value::Tuple(vec![])]));
    assert_eq!(
        reason,
        MismatchReason::Type { index: 0, expected: "str", found: "tuple".to_string() }
    );

    assert!(matches!(
        call("fac", &[Value::Float(3.0)]),
        Err(DispatchError::Argument(_))
    ));
}

#[test]
fn test_bool_is_accepted_as_int() {
    assert_eq!(call("fac", &[Value::Bool(true)]).unwrap(), Value::Int(1));
}

#[test]
fn test_fresh_tables_are_independent() {
    let rt = Runtime::new();
    let mut gil = rt.acquire();
    let table = DispatchTable::extest().unwrap();
    table.call(&mut gil, "fib2", &[Value::Int(3)]).unwrap();
    assert_eq!(table.stats().lock_releases, 1);
    assert_eq!(DispatchTable::extest().unwrap().stats().calls_made, 0);
}
