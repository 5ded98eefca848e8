use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::Display;

/// A dynamically typed value passed across the reflective surface of a component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Null,
}

/// The runtime kind of a [`Value`], or of the type a member accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Float,
    Str,
    List,
    /// Accepts every kind
    Any,
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Str(_) => ValueKind::Str,
            Value::List(_) => ValueKind::List,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Conversion out of a [`Value`] into a concrete Rust type.
///
/// On failure the rejected value is handed back so the caller can report
/// what it actually received.
pub trait FromValue: Sized {
    /// Kind this type is declared as when used for a member or argument
    const KIND: ValueKind;

    fn from_value(value: Value) -> Result<Self, Value>;
}

impl FromValue for Value {
    const KIND: ValueKind = ValueKind::Any;

    fn from_value(value: Value) -> Result<Self, Value> {
        Ok(value)
    }
}

impl FromValue for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(other),
        }
    }
}

impl FromValue for f64 {
    const KIND: ValueKind = ValueKind::Float;

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Float(x) => Ok(x),
            Value::Int(n) => Ok(n as f64),
            other => Err(other),
        }
    }
}

impl FromValue for f32 {
    const KIND: ValueKind = ValueKind::Float;

    fn from_value(value: Value) -> Result<Self, Value> {
        f64::from_value(value).map(|x| x as f32)
    }
}

impl FromValue for String {
    const KIND: ValueKind = ValueKind::Str;

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Str(s) => Ok(s),
            other => Err(other),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    const KIND: ValueKind = T::KIND;

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    const KIND: ValueKind = ValueKind::List;

    fn from_value(value: Value) -> Result<Self, Value> {
        let Value::List(items) = value else {
            return Err(value);
        };

        items
            .iter()
            .cloned()
            .map(T::from_value)
            .collect::<Result<Vec<T>, Value>>()
            .map_err(|_| Value::List(items))
    }
}

macro_rules! int_from_value {
    ($($t:ty),+ $(,)?) => {
        $(
            impl FromValue for $t {
                const KIND: ValueKind = ValueKind::Int;

                fn from_value(value: Value) -> Result<Self, Value> {
                    match value {
                        Value::Int(n) => <$t>::try_from(n).map_err(|_| Value::Int(n)),
                        other => Err(other),
                    }
                }
            }
        )+
    };
}

int_from_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! int_into_value {
    ($($t:ty),+ $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Value::Int(i64::from(n))
                }
            }
        )+
    };
}

int_into_value!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<f32> for Value {
    fn from(x: f32) -> Self {
        Value::Float(f64::from(x))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_range_is_checked() {
        assert_eq!(u8::from_value(Value::Int(255)), Ok(255));
        assert_eq!(u8::from_value(Value::Int(256)), Err(Value::Int(256)));
        assert_eq!(u32::from_value(Value::Int(-1)), Err(Value::Int(-1)));
    }

    #[test]
    fn test_float_accepts_int() {
        assert_eq!(f64::from_value(Value::Int(3)), Ok(3.0));
        assert_eq!(
            f64::from_value(Value::Str("3".into())),
            Err(Value::Str("3".into()))
        );
    }

    #[test]
    fn test_option_maps_null() {
        assert_eq!(Option::<i64>::from_value(Value::Null), Ok(None));
        assert_eq!(Option::<i64>::from_value(Value::Int(7)), Ok(Some(7)));
        assert_eq!(Value::from(None::<i64>), Value::Null);
    }

    #[test]
    fn test_list_rejection_returns_original() {
        let list = Value::List(vec![Value::Int(1), Value::Str("x".into()), Value::Int(3)]);
        assert_eq!(Vec::<i64>::from_value(list.clone()), Err(list));
    }

    #[test]
    fn test_deserialize_from_toml() {
        #[derive(Deserialize)]
        struct Params {
            values: Vec<Value>,
        }

        let parsed: Params = toml::from_str(r#"values = [42, 1.5, "text", true, [1, 2]]"#)
            .expect("valid toml");
        assert_eq!(
            parsed.values,
            vec![
                Value::Int(42),
                Value::Float(1.5),
                Value::Str("text".into()),
                Value::Bool(true),
                Value::List(vec![Value::Int(1), Value::Int(2)]),
            ]
        );
    }

    #[test]
    fn test_display() {
        let value = Value::List(vec![Value::Int(1), Value::Str("a".into()), Value::Null]);
        assert_eq!(value.to_string(), r#"[1, "a", null]"#);
        assert_eq!(ValueKind::Str.to_string(), "str");
    }
}
