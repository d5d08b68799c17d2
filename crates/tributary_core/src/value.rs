//! The dynamically typed payload carried by ports.

use crate::error::TypeMismatch;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A value held by a [`Port`](crate::Port).
///
/// Conversions out of a `Value` never coerce between variants. Reading an
/// `Int` as an `f64` is a [`TypeMismatch`], not a widening.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub enum Value {
    #[default]
    Nil,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

/// The variant of a [`Value`] without its payload.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Deserialize, Serialize)]
pub enum Kind {
    Nil,
    Int,
    Float,
    Bool,
    Text,
}

/// Types that may be read out of a [`Value`].
pub trait FromValue: Sized {
    /// The kind of value this type is read from.
    const KIND: Kind;
    /// Interpret the value as `Self`.
    fn from_value(value: &Value) -> Result<Self, TypeMismatch>;
}

impl Value {
    /// The kind of this value.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Nil => Kind::Nil,
            Value::Int(_) => Kind::Int,
            Value::Float(_) => Kind::Float,
            Value::Bool(_) => Kind::Bool,
            Value::Text(_) => Kind::Text,
        }
    }

    /// Whether or not this is `Value::Nil`.
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Read the value as `T`.
    ///
    /// Shorthand for `T::from_value(self)`.
    pub fn get<T: FromValue>(&self) -> Result<T, TypeMismatch> {
        T::from_value(self)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Kind::Nil => "nil",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::Bool => "bool",
            Kind::Text => "text",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

macro_rules! impl_from_value {
    ($Ty:ty, $Kind:ident) => {
        impl FromValue for $Ty {
            const KIND: Kind = Kind::$Kind;
            fn from_value(value: &Value) -> Result<Self, TypeMismatch> {
                match value {
                    Value::$Kind(v) => Ok(v.clone()),
                    other => Err(TypeMismatch::new(Self::KIND, other.kind())),
                }
            }
        }

        impl From<$Ty> for Value {
            fn from(v: $Ty) -> Self {
                Value::$Kind(v)
            }
        }
    };
}

impl_from_value!(i64, Int);
impl_from_value!(f64, Float);
impl_from_value!(bool, Bool);
impl_from_value!(String, Text);

impl FromValue for () {
    const KIND: Kind = Kind::Nil;
    fn from_value(value: &Value) -> Result<Self, TypeMismatch> {
        match value {
            Value::Nil => Ok(()),
            other => Err(TypeMismatch::new(Self::KIND, other.kind())),
        }
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Nil
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_matching_kind() {
        assert_eq!(Value::Int(7).get::<i64>().unwrap(), 7);
        assert_eq!(Value::from(1.5).get::<f64>().unwrap(), 1.5);
        assert!(Value::from(true).get::<bool>().unwrap());
        assert_eq!(Value::from("hi").get::<String>().unwrap(), "hi");
        Value::Nil.get::<()>().unwrap();
    }

    #[test]
    fn test_get_does_not_coerce() {
        let err = Value::Int(3).get::<f64>().unwrap_err();
        assert_eq!(err.expected, Kind::Float);
        assert_eq!(err.found, Kind::Int);

        let err = Value::Nil.get::<i64>().unwrap_err();
        assert_eq!(err.found, Kind::Nil);
    }

    #[test]
    fn test_display() {
        assert!(Value::Nil.is_nil());
        assert_eq!(Value::Nil.to_string(), "nil");
        assert_eq!(Value::from(-4).to_string(), "-4");
        assert_eq!(Value::from("text").to_string(), "text");
        assert_eq!(Kind::Float.to_string(), "float");
    }

    #[test]
    fn test_serde() {
        let json = serde_json::to_string(&Value::Int(3)).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value, Value::Int(3));
    }
}
