// src/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Error;

/// Scalar values bound to statement placeholders and held in stored rows
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
}

/// Column types understood by the statistics tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Type {
    Bool,
    Int,
    Uint,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Coerce the value into the column type, widening integers where lossless
    pub fn coerce(self, type_: Type) -> Result<Value, Error> {
        match (self, type_) {
            (Value::Null, _) => Ok(Value::Null),
            (v @ Value::Bool(_), Type::Bool) => Ok(v),
            (v @ Value::Int(_), Type::Int) => Ok(v),
            (v @ Value::Uint(_), Type::Uint) => Ok(v),
            (Value::Int(i), Type::Bool) if i == 0 || i == 1 => Ok(Value::Bool(i == 1)),
            (Value::Uint(u), Type::Int) => i64::try_from(u)
                .map(Value::Int)
                .map_err(|_| Error::Type(format!("{} overflows a signed column", u))),
            (Value::Int(i), Type::Uint) => u64::try_from(i)
                .map(Value::Uint)
                .map_err(|_| Error::Type(format!("{} is negative for an unsigned column", i))),
            (v, t) => Err(Error::Type(format!(
                "Type mismatch: value {} does not match type {:?}",
                v, t
            ))),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Uint(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Uint(u) => Some(*u),
            Value::Int(i) => u64::try_from(*i).ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Uint(u) => write!(f, "{}", u),
        }
    }
}
