//! Host values as seen by the binding layer

use serde::Serialize;
use smallvec::SmallVec;
use std::fmt;

/// A dynamically typed host value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Tuple(Vec<Value>),
    /// A host object with no native counterpart, kept only by type name
    Opaque(String),
}

/// Arguments supplied by the host for one invocation
pub type CallRecord = SmallVec<[Value; 4]>;

impl Value {
    /// Host-level type name, used in error messages
    pub fn type_name(&self) -> &str {
        match self {
            Self::None => "NoneType",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::Tuple(_) => "tuple",
            Self::Opaque(name) => name,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Bool(true) => write!(f, "True"),
            Self::Bool(false) => write!(f, "False"),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{:?}", x),
            Self::Str(s) => write!(f, "'{}'", s),
            Self::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            Self::Opaque(name) => write!(f, "<{} object>", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_host_repr() {
        let pair = Value::Tuple(vec!["abc".into(), "cba".into()]);
        assert_eq!(pair.to_string(), "('abc', 'cba')");
        assert_eq!(Value::Tuple(vec![Value::Int(1)]).to_string(), "(1,)");
        assert_eq!(Value::None.to_string(), "None");
        assert_eq!(Value::Bool(true).to_string(), "True");
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Int(1).type_name(), "int");
        assert_eq!(Value::Float(1.0).type_name(), "float");
        assert_eq!(Value::Opaque("list".into()).type_name(), "list");
    }

    #[test]
    fn test_serializes_untagged() {
        let pair = Value::Tuple(vec!["ab".into(), "ba".into()]);
        assert_eq!(serde_json::to_string(&pair).unwrap(), r#"["ab","ba"]"#);
        assert_eq!(serde_json::to_string(&Value::None).unwrap(), "null");
        assert_eq!(serde_json::to_string(&Value::Int(24)).unwrap(), "24");
    }
}
