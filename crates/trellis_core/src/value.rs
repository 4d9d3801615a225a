//! Tagged dynamic values exchanged with plugin instances.
//!
//! # Responsibility
//! - Carry property values, method arguments and return values across the
//!   proxy boundary without knowing the concrete instance type.
//! - Hold manifest side-table entries (`Bool` or `String`).
//!
//! # Invariants
//! - `Value::value_type()` always matches the variant.
//! - Coercion never loses information: only identity and `Int -> Double`
//!   widening are accepted.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

// Largest magnitude an `f64` represents exactly for every integer below it.
const MAX_EXACT_DOUBLE_INT: u64 = 1 << 53;

/// Declared type of a property, argument or return slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// No value. Used as the return type of methods without a result.
    Unit,
    Bool,
    Int,
    Double,
    String,
    StringList,
}

impl ValueType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Double => "double",
            Self::String => "string",
            Self::StringList => "string_list",
        }
    }
}

impl Display for ValueType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One dynamically typed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Unit,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    StringList(Vec<String>),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Unit => ValueType::Unit,
            Self::Bool(_) => ValueType::Bool,
            Self::Int(_) => ValueType::Int,
            Self::Double(_) => ValueType::Double,
            Self::String(_) => ValueType::String,
            Self::StringList(_) => ValueType::StringList,
        }
    }

    /// Converts the value to `target`, handing it back unchanged on failure.
    ///
    /// `Int` widens to `Double` only while the integer stays exact.
    ///
    /// A `Unit` target accepts and discards any value, so methods declared
    /// without a result may still return something.
    pub fn coerce_to(self, target: ValueType) -> Result<Value, Value> {
        match (self, target) {
            (_, ValueType::Unit) => Ok(Value::Unit),
            (Value::Int(v), ValueType::Double) if v.unsigned_abs() <= MAX_EXACT_DOUBLE_INT => {
                Ok(Value::Double(v as f64))
            }
            (value, target) if value.value_type() == target => Ok(value),
            (value, _) => Err(value),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Self::Double(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn as_string_list(&self) -> Option<&[String]> {
        match self {
            Self::StringList(v) => Some(v.as_slice()),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Self::StringList(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{Value, ValueType};

    #[test]
    fn identity_coercion_keeps_value() {
        let value = Value::from("hello").coerce_to(ValueType::String);
        assert_eq!(value, Ok(Value::String("hello".to_string())));
    }

    #[test]
    fn int_widens_to_double() {
        assert_eq!(Value::Int(3).coerce_to(ValueType::Double), Ok(Value::Double(3.0)));
    }

    #[test]
    fn narrowing_and_cross_kind_coercions_fail() {
        assert_eq!(
            Value::Double(1.5).coerce_to(ValueType::Int),
            Err(Value::Double(1.5))
        );
        assert_eq!(Value::Bool(true).coerce_to(ValueType::Int), Err(Value::Bool(true)));
        assert!(Value::from("1").coerce_to(ValueType::Int).is_err());
    }

    #[test]
    fn widening_rejects_integers_a_double_cannot_hold() {
        let exact = 1_i64 << 53;
        assert_eq!(
            Value::Int(-exact).coerce_to(ValueType::Double),
            Ok(Value::Double(-(exact as f64)))
        );
        assert_eq!(
            Value::Int(exact + 1).coerce_to(ValueType::Double),
            Err(Value::Int(exact + 1))
        );
        assert_eq!(
            Value::Int(i64::MIN).coerce_to(ValueType::Double),
            Err(Value::Int(i64::MIN))
        );
    }

    #[test]
    fn unit_target_discards_value() {
        assert_eq!(Value::Int(7).coerce_to(ValueType::Unit), Ok(Value::Unit));
    }

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_value(Value::Bool(true)).expect("serialize value");
        assert_eq!(json["type"], "bool");
        assert_eq!(json["value"], true);
    }
}
