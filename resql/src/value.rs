use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::Display;

/// A scalar property value or predicate literal.
///
/// Equality is numeric across widths (`I32(4) == F64(4.0)`) and NaN equals nothing, itself included,
/// so neither `Value` nor [`Predicate`](crate::Predicate) implements `Eq` or `Hash`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub enum Value {
    Bool(bool),
    I32(i32),
    I64(i64),
    F64(f64),
    String(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    Bool,
    I32,
    I64,
    F64,
    String,
}

impl ValueType {
    pub fn of(v: &Value) -> Self {
        match v {
            Value::Bool(_) => ValueType::Bool,
            Value::I32(_) => ValueType::I32,
            Value::I64(_) => ValueType::I64,
            Value::F64(_) => ValueType::F64,
            Value::String(_) => ValueType::String,
        }
    }

    pub fn is_numeric(&self) -> bool { matches!(self, ValueType::I32 | ValueType::I64 | ValueType::F64) }
}

/// Numeric view of a value at the widest width needed for a comparison
#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
            (Number::Int(a), Number::Float(b)) => (a as f64).partial_cmp(&b),
            (Number::Float(a), Number::Int(b)) => a.partial_cmp(&(b as f64)),
            (Number::Float(a), Number::Float(b)) => a.partial_cmp(&b),
        }
    }
}

impl Value {
    pub fn value_type(&self) -> ValueType { ValueType::of(self) }

    fn as_number(&self) -> Option<Number> {
        match self {
            Value::I32(i) => Some(Number::Int(*i as i64)),
            Value::I64(i) => Some(Number::Int(*i)),
            Value::F64(f) => Some(Number::Float(*f)),
            _ => None,
        }
    }

    /// Parse a string into the numeric width of `like`
    fn parse_number_like(s: &str, like: ValueType) -> Option<Number> {
        let s = s.trim();
        match like {
            ValueType::I32 | ValueType::I64 => match s.parse::<i64>() {
                Ok(i) => Some(Number::Int(i)),
                // "2.5" against an integer literal still compares numerically
                Err(_) => s.parse::<f64>().ok().map(Number::Float),
            },
            ValueType::F64 => s.parse::<f64>().ok().map(Number::Float),
            _ => None,
        }
    }

    /// Compare this (property) value with a predicate literal.
    ///
    /// Numbers compare at the widest width of the two operands. When the kinds differ the
    /// literal decides: a numeric literal parses a string property as a number, a string literal
    /// compares against the textual form of the property, a bool literal parses a string
    /// property as a bool. Returns `None` for incomparable pairs.
    pub fn compare_with(&self, literal: &Value) -> Option<Ordering> {
        if let (Some(a), Some(b)) = (self.as_number(), literal.as_number()) {
            return a.compare(b);
        }
        match (self, literal) {
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::String(s), lit) if lit.value_type().is_numeric() => {
                let a = Self::parse_number_like(s, lit.value_type())?;
                a.compare(lit.as_number()?)
            }
            (Value::String(s), Value::Bool(b)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Some(true.cmp(b)),
                "false" => Some(false.cmp(b)),
                _ => None,
            },
            (property, Value::String(lit)) => Some(property.to_string().as_str().cmp(lit.as_str())),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self.as_number(), other.as_number()) {
            (Some(a), Some(b)) => a.compare(b) == Some(Ordering::Equal),
            (None, None) => match (self, other) {
                (Value::Bool(a), Value::Bool(b)) => a == b,
                (Value::String(a), Value::String(b)) => a == b,
                _ => false,
            },
            _ => false,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::I32(i) => write!(f, "{}", i),
            Value::I64(i) => write!(f, "{}", i),
            Value::F64(float) => write!(f, "{}", float),
            Value::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self { Value::Bool(b) }
}
impl From<i32> for Value {
    fn from(i: i32) -> Self { Value::I32(i) }
}
impl From<i64> for Value {
    fn from(i: i64) -> Self { Value::I64(i) }
}
impl From<u32> for Value {
    fn from(i: u32) -> Self { Value::I64(i as i64) }
}
impl From<f64> for Value {
    fn from(f: f64) -> Self { Value::F64(f) }
}
impl From<&str> for Value {
    fn from(s: &str) -> Self { Value::String(s.to_string()) }
}
impl From<String> for Value {
    fn from(s: String) -> Self { Value::String(s) }
}
impl From<&String> for Value {
    fn from(s: &String) -> Self { Value::String(s.clone()) }
}
