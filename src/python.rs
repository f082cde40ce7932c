//! CPython extension module `Extest`
//!
//! Every exported function accepts `*args` and goes through the shared
//! dispatch table, so argument checking and lock policy are identical to the
//! in-process runtime. The GIL is the global lock here.

use crate::binding::{dispatch_table, DispatchError};
use crate::runtime::{CallRecord, HostLock, Value};
use pyo3::exceptions::{PyAttributeError, PyRuntimeError, PyTypeError};
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyFloat, PyLong, PyString, PyTuple};

/// The CPython GIL, held for `'py`
pub struct PyLock<'py>(pub Python<'py>);

impl HostLock for PyLock<'_> {
    fn release_during<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        self.0.allow_threads(f)
    }
}

/// Convert a Python object to a host value.
///
/// Ints wider than 64 bits raise `OverflowError` here, before dispatch.
fn to_value(obj: &PyAny) -> PyResult<Value> {
    if obj.is_none() {
        return Ok(Value::None);
    }
    if let Ok(b) = obj.downcast::<PyBool>() {
        return Ok(Value::Bool(b.is_true()));
    }
    if obj.is_instance_of::<PyLong>() {
        return Ok(Value::Int(obj.extract::<i64>()?));
    }
    if let Ok(f) = obj.downcast::<PyFloat>() {
        return Ok(Value::Float(f.value()));
    }
    if let Ok(s) = obj.downcast::<PyString>() {
        return Ok(Value::Str(s.to_str()?.to_owned()));
    }
    if let Ok(t) = obj.downcast::<PyTuple>() {
        return t.iter().map(to_value).collect::<PyResult<Vec<_>>>().map(Value::Tuple);
    }
    Ok(Value::Opaque(obj.get_type().name()?.to_owned()))
}

fn to_object(py: Python<'_>, value: &Value) -> PyObject {
    match value {
        Value::None | Value::Opaque(_) => py.None(),
        Value::Bool(b) => (*b).into_py(py),
        Value::Int(i) => (*i).into_py(py),
        Value::Float(x) => (*x).into_py(py),
        Value::Str(s) => s.as_str().into_py(py),
        Value::Tuple(items) => PyTuple::new(py, items.iter().map(|v| to_object(py, v))).into_py(py),
    }
}

fn dispatch(py: Python<'_>, name: &str, args: &PyTuple) -> PyResult<PyObject> {
    let record = args.iter().map(to_value).collect::<PyResult<CallRecord>>()?;

    let value = dispatch_table()
        .call(&mut PyLock(py), name, &record)
        .map_err(|e| match e {
            DispatchError::Argument(err) => PyTypeError::new_err(err.to_string()),
            DispatchError::UnknownRoutine(_) => PyAttributeError::new_err(e.to_string()),
            DispatchError::UnexpectedReturn { .. } => PyRuntimeError::new_err(e.to_string()),
        })?;

    Ok(to_object(py, &value))
}

#[pyfunction]
#[pyo3(signature = (*args))]
fn fac(py: Python<'_>, args: &PyTuple) -> PyResult<PyObject> {
    dispatch(py, "fac", args)
}

#[pyfunction]
#[pyo3(signature = (*args))]
fn fib(py: Python<'_>, args: &PyTuple) -> PyResult<PyObject> {
    dispatch(py, "fib", args)
}

/// Like `fib`, but the GIL is released while it computes
#[pyfunction]
#[pyo3(signature = (*args))]
fn fib2(py: Python<'_>, args: &PyTuple) -> PyResult<PyObject> {
    dispatch(py, "fib2", args)
}

#[pyfunction]
#[pyo3(signature = (*args))]
fn doppel(py: Python<'_>, args: &PyTuple) -> PyResult<PyObject> {
    dispatch(py, "doppel", args)
}

#[pyfunction]
#[pyo3(signature = (*args))]
fn countdown(py: Python<'_>, args: &PyTuple) -> PyResult<PyObject> {
    dispatch(py, "countdown", args)
}

#[pyfunction]
#[pyo3(name = "test", signature = (*args))]
fn run_test(py: Python<'_>, args: &PyTuple) -> PyResult<PyObject> {
    dispatch(py, "test", args)
}

#[pymodule]
#[pyo3(name = "Extest")]
fn extest_module(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(fac, m)?)?;
    m.add_function(wrap_pyfunction!(fib, m)?)?;
    m.add_function(wrap_pyfunction!(fib2, m)?)?;
    m.add_function(wrap_pyfunction!(doppel, m)?)?;
    m.add_function(wrap_pyfunction!(countdown, m)?)?;
    m.add_function(wrap_pyfunction!(run_test, m)?)?;
    Ok(())
}
