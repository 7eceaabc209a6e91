use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::DataTypeKind;

/// A generic wrapper enum to hold any column value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Value {
    Boolean(bool),
    Decimal(Decimal),
    Int64(i64),
    Null,
    Text(String),
    Uint64(u64),
}

// macro rules for implementing From trait for Value enum variants
macro_rules! impl_conv_for_value {
    ($variant:ident, $ty:ty, $name:ident) => {
        impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Value::$variant(value)
            }
        }

        impl Value {
            /// Attempts to extract a reference to the inner value if it matches the variant.
            pub fn $name(&self) -> Option<&$ty> {
                if let Value::$variant(v) = self {
                    Some(v)
                } else {
                    None
                }
            }
        }
    };
}

impl_conv_for_value!(Boolean, bool, as_boolean);
impl_conv_for_value!(Decimal, Decimal, as_decimal);
impl_conv_for_value!(Int64, i64, as_int64);
impl_conv_for_value!(Text, String, as_text);
impl_conv_for_value!(Uint64, u64, as_uint64);

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

impl Value {
    /// Checks if the value is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the [`DataTypeKind`] of the value, or [`None`] for [`Value::Null`].
    pub fn kind(&self) -> Option<DataTypeKind> {
        match self {
            Value::Boolean(_) => Some(DataTypeKind::Boolean),
            Value::Decimal(_) => Some(DataTypeKind::Decimal),
            Value::Int64(_) => Some(DataTypeKind::Int64),
            Value::Null => None,
            Value::Text(_) => Some(DataTypeKind::Text),
            Value::Uint64(_) => Some(DataTypeKind::Uint64),
        }
    }

    /// Returns the type name of the value as a string.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Boolean(_) => "Boolean",
            Value::Decimal(_) => "Decimal",
            Value::Int64(_) => "Int64",
            Value::Null => "Null",
            Value::Text(_) => "Text",
            Value::Uint64(_) => "Uint64",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Decimal(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Null => write!(f, "NULL"),
            Value::Text(v) => write!(f, "{v}"),
            Value::Uint64(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_null() {
        let int_value: Value = 42i64.into();
        assert!(!int_value.is_null());

        let null_value = Value::Null;
        assert!(null_value.is_null());
    }

    #[test]
    fn test_value_conversion_boolean() {
        let value: Value = true.into();
        assert_eq!(value.as_boolean(), Some(&true));
    }

    #[test]
    fn test_value_conversion_decimal() {
        let decimal = Decimal::new(12345, 2); // 123.45
        let value: Value = decimal.into();
        assert_eq!(value.as_decimal(), Some(&decimal));
    }

    #[test]
    fn test_value_conversion_int64() {
        let value: Value = 1234567890i64.into();
        assert_eq!(value.as_int64(), Some(&1234567890));
    }

    #[test]
    fn test_value_conversion_text() {
        let value: Value = "Hello, World!".into();
        assert_eq!(value.as_text().map(String::as_str), Some("Hello, World!"));
    }

    #[test]
    fn test_value_conversion_uint64() {
        let value: Value = 12345678901234u64.into();
        assert_eq!(value.as_uint64(), Some(&12345678901234));
    }

    #[test]
    fn test_value_conversion_option() {
        let value: Value = Some(10i64).into();
        assert_eq!(value.as_int64(), Some(&10));

        let value: Value = Option::<i64>::None.into();
        assert!(value.is_null());
    }

    #[test]
    fn test_value_kind() {
        let int_value: Value = 42i64.into();
        assert_eq!(int_value.kind(), Some(DataTypeKind::Int64));
        assert_eq!(int_value.type_name(), "Int64");

        assert_eq!(Value::Null.kind(), None);
        assert_eq!(Value::Null.type_name(), "Null");
    }
}
