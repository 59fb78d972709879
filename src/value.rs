//! Dynamic value tree for Brack data.
//!
//! This module provides the [`Value`] enum which represents any valid Brack
//! value, and the [`Key`] type used for map keys (maps may be keyed by any
//! scalar, not just strings).
//!
//! ## Core Types
//!
//! - [`Value`]: a closed variant over null, bool, number, string, list, map
//! - [`Number`]: a numeric value that may carry a signed integer, an unsigned
//!   integer, or a double
//! - [`Key`]: the scalar subset of [`Value`], usable as a map key
//!
//! ## Usage Patterns
//!
//! ```rust
//! use brack::{brack, Value};
//!
//! let config = brack!({
//!     "name": "Dennis",
//!     "age": 37,
//!     "old": false
//! });
//!
//! assert_eq!(config.as_map().unwrap().get_str("age").and_then(|v| v.as_i64()), Some(37));
//! ```
//!
//! Numbers compare across representations, so a tree parsed from text (where
//! `37` comes back as an integer) is structurally equal to one built with
//! `37.0`:
//!
//! ```rust
//! use brack::{Number, Value};
//!
//! assert_eq!(Value::from(37), Value::from(37.0));
//! assert_eq!(Number::Int(-1), Number::Float(-1.0));
//! ```

use crate::ValueMap;
use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A dynamically-typed representation of any valid Brack value.
///
/// The tree is acyclic by construction: values own their children outright,
/// so no self-reference is possible. Map keys are restricted to the scalar
/// subset via [`Key`].
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(Vec<Value>),
    Map(ValueMap),
}

/// A numeric value.
///
/// The grammar treats every number as a double, but the in-memory form keeps
/// integer precision where the token allows it. Equality is numeric across
/// variants, so `Int(37)` equals `Float(37.0)`.
#[derive(Clone, Copy, Debug)]
pub enum Number {
    Int(i64),
    UInt(u64),
    Float(f64),
}

impl Number {
    /// Converts to an `i64` when the value is integral and in range.
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Number::Int(i) => Some(i),
            Number::UInt(u) => i64::try_from(u).ok(),
            Number::Float(f) => {
                if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
                    Some(f as i64)
                } else {
                    None
                }
            }
        }
    }

    /// Converts to a `u64` when the value is integral and non-negative.
    #[inline]
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Number::Int(i) => u64::try_from(i).ok(),
            Number::UInt(u) => Some(u),
            Number::Float(f) => {
                if f.fract() == 0.0 && f >= 0.0 && f <= u64::MAX as f64 {
                    Some(f as u64)
                } else {
                    None
                }
            }
        }
    }

    /// Converts to an `f64`. Always succeeds.
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Int(i) => i as f64,
            Number::UInt(u) => u as f64,
            Number::Float(f) => f,
        }
    }

    /// Returns `true` if the value carries no fractional part.
    #[inline]
    #[must_use]
    pub fn is_integral(&self) -> bool {
        match *self {
            Number::Int(_) | Number::UInt(_) => true,
            Number::Float(f) => f.fract() == 0.0,
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        if let (Some(a), Some(b)) = (self.as_i64(), other.as_i64()) {
            return a == b;
        }
        if let (Some(a), Some(b)) = (self.as_u64(), other.as_u64()) {
            return a == b;
        }
        self.as_f64() == other.as_f64()
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::UInt(u) => write!(f, "{}", u),
            Number::Float(fl) => write!(f, "{}", fl),
        }
    }
}

macro_rules! number_from_signed {
    ($($ty:ty),*) => {$(
        impl From<$ty> for Number {
            fn from(value: $ty) -> Self {
                Number::Int(value as i64)
            }
        }
    )*};
}

macro_rules! number_from_unsigned {
    ($($ty:ty),*) => {$(
        impl From<$ty> for Number {
            fn from(value: $ty) -> Self {
                Number::UInt(value as u64)
            }
        }
    )*};
}

number_from_signed!(i8, i16, i32, i64);
number_from_unsigned!(u8, u16, u32, u64);

impl From<f32> for Number {
    fn from(value: f32) -> Self {
        Number::Float(value as f64)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

/// The scalar subset of [`Value`], usable as a map key.
///
/// Keys hash and compare by numeric value, so a map keyed with `Int(1)` can
/// be looked up with `Float(1.0)`. `NaN` keys compare by bit pattern to keep
/// `Eq` total.
#[derive(Clone, Debug)]
pub enum Key {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

impl Key {
    /// Returns the key as a string slice when it is a string key.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::String(s) => Some(s),
            _ => None,
        }
    }

    /// Converts this key back into the equivalent [`Value`].
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Key::Null => Value::Null,
            Key::Bool(b) => Value::Bool(*b),
            Key::Number(n) => Value::Number(*n),
            Key::String(s) => Value::String(s.clone()),
        }
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::Null, Key::Null) => true,
            (Key::Bool(a), Key::Bool(b)) => a == b,
            (Key::String(a), Key::String(b)) => a == b,
            (Key::Number(a), Key::Number(b)) => match (a.as_i64(), b.as_i64()) {
                (Some(x), Some(y)) => x == y,
                (None, None) => match (a.as_u64(), b.as_u64()) {
                    (Some(x), Some(y)) => x == y,
                    // Bit comparison keeps NaN == NaN, which Eq requires.
                    _ => a.as_f64().to_bits() == b.as_f64().to_bits(),
                },
                _ => false,
            },
            _ => false,
        }
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Key::Null => state.write_u8(0),
            Key::Bool(b) => {
                state.write_u8(1);
                b.hash(state);
            }
            Key::Number(n) => {
                if let Some(i) = n.as_i64() {
                    state.write_u8(2);
                    i.hash(state);
                } else if let Some(u) = n.as_u64() {
                    state.write_u8(3);
                    u.hash(state);
                } else {
                    state.write_u8(4);
                    n.as_f64().to_bits().hash(state);
                }
            }
            Key::String(s) => {
                state.write_u8(5);
                s.hash(state);
            }
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Null => write!(f, "#null"),
            Key::Bool(true) => write!(f, "#true"),
            Key::Bool(false) => write!(f, "#false"),
            Key::Number(n) => write!(f, "{}", n),
            Key::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::String(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::String(value)
    }
}

impl From<bool> for Key {
    fn from(value: bool) -> Self {
        Key::Bool(value)
    }
}

macro_rules! key_from_number {
    ($($ty:ty),*) => {$(
        impl From<$ty> for Key {
            fn from(value: $ty) -> Self {
                Key::Number(Number::from(value))
            }
        }
    )*};
}

key_from_number!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

impl TryFrom<Value> for Key {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Null => Ok(Key::Null),
            Value::Bool(b) => Ok(Key::Bool(b)),
            Value::Number(n) => Ok(Key::Number(n)),
            Value::String(s) => Ok(Key::String(s)),
            other => Err(crate::Error::unsupported_value(format!(
                "map key must be a scalar, found {}",
                other.kind()
            ))),
        }
    }
}

impl Value {
    /// Returns a short name for the value's variant, used in diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Returns `true` if the value is null.
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` if the value is neither a list nor a map.
    #[inline]
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        !matches!(self, Value::List(_) | Value::Map(_))
    }

    /// Returns `true` if the value is a list.
    #[inline]
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    /// Returns `true` if the value is a map.
    #[inline]
    #[must_use]
    pub const fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    /// If the value is a boolean, returns it.
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// If the value is a string, returns a reference to it.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// If the value is an integral number in `i64` range, returns it.
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// If the value is an integral non-negative number, returns it.
    #[inline]
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    /// If the value is a number, returns it as an `f64`.
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(n.as_f64()),
            _ => None,
        }
    }

    /// If the value is a list, returns a reference to it.
    #[inline]
    #[must_use]
    pub fn as_list(&self) -> Option<&Vec<Value>> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    /// If the value is a map, returns a reference to it.
    #[inline]
    #[must_use]
    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

macro_rules! value_from_number {
    ($($ty:ty),*) => {$(
        impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Value::Number(Number::from(value))
            }
        }
    )*};
}

value_from_number!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::Number(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<ValueMap> for Value {
    fn from(value: ValueMap) -> Self {
        Value::Map(value)
    }
}

impl From<Key> for Value {
    fn from(value: Key) -> Self {
        value.to_value()
    }
}

impl TryFrom<Value> for i64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        value
            .as_i64()
            .ok_or_else(|| crate::Error::conversion("i64", value.kind()))
    }
}

impl TryFrom<Value> for f64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        value
            .as_f64()
            .ok_or_else(|| crate::Error::conversion("f64", value.kind()))
    }
}

impl TryFrom<Value> for bool {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        value
            .as_bool()
            .ok_or_else(|| crate::Error::conversion("bool", value.kind()))
    }
}

impl TryFrom<Value> for String {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(crate::Error::conversion("string", other.kind())),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(Number::Int(i)) => serializer.serialize_i64(*i),
            Value::Number(Number::UInt(u)) => serializer.serialize_u64(*u),
            Value::Number(Number::Float(f)) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(list) => {
                let mut seq = serializer.serialize_seq(Some(list.len()))?;
                for element in list {
                    seq.serialize_element(element)?;
                }
                seq.end()
            }
            Value::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map.iter() {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
        }
    }
}

impl Serialize for Key {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Key::Null => serializer.serialize_unit(),
            Key::Bool(b) => serializer.serialize_bool(*b),
            Key::Number(Number::Int(i)) => serializer.serialize_i64(*i),
            Key::Number(Number::UInt(u)) => serializer.serialize_u64(*u),
            Key::Number(Number::Float(f)) => serializer.serialize_f64(*f),
            Key::String(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any valid Brack value")
            }

            fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E> {
                Ok(Value::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E> {
                Ok(Value::Number(Number::Int(value)))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E> {
                Ok(Value::Number(Number::UInt(value)))
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E> {
                Ok(Value::Number(Number::Float(value)))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E> {
                Ok(Value::String(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> Result<Self::Value, E> {
                Ok(Value::String(value))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(Value::Null)
            }

            fn visit_none<E>(self) -> Result<Self::Value, E> {
                Ok(Value::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut list = Vec::new();
                while let Some(element) = seq.next_element()? {
                    list.push(element);
                }
                Ok(Value::List(list))
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut map = ValueMap::new();
                while let Some((key, value)) = access.next_entry::<Key, Value>()? {
                    map.insert(key, value);
                }
                Ok(Value::Map(map))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct KeyVisitor;

        impl<'de> Visitor<'de> for KeyVisitor {
            type Value = Key;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a scalar map key")
            }

            fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E> {
                Ok(Key::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E> {
                Ok(Key::Number(Number::Int(value)))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E> {
                Ok(Key::Number(Number::UInt(value)))
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E> {
                Ok(Key::Number(Number::Float(value)))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E> {
                Ok(Key::String(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> Result<Self::Value, E> {
                Ok(Key::String(value))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(Key::Null)
            }
        }

        deserializer.deserialize_any(KeyVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_cross_variant_equality() {
        assert_eq!(Number::Int(42), Number::Float(42.0));
        assert_eq!(Number::Int(42), Number::UInt(42));
        assert_eq!(Number::UInt(42), Number::Float(42.0));
        assert_ne!(Number::Int(42), Number::Float(42.5));
        assert_ne!(Number::Int(-1), Number::UInt(u64::MAX));
    }

    #[test]
    fn test_number_conversions() {
        assert_eq!(Number::Int(42).as_i64(), Some(42));
        assert_eq!(Number::Float(42.0).as_i64(), Some(42));
        assert_eq!(Number::Float(42.5).as_i64(), None);
        assert_eq!(Number::Int(-1).as_u64(), None);
        assert_eq!(Number::UInt(7).as_f64(), 7.0);
    }

    #[test]
    fn test_key_equality_and_lookup() {
        let mut map = ValueMap::new();
        map.insert(Key::from(1i64), Value::from("one"));
        assert_eq!(
            map.get(&Key::from(1.0f64)).and_then(|v| v.as_str()),
            Some("one")
        );
    }

    #[test]
    fn test_value_accessors() {
        let value = Value::from(37);
        assert!(value.is_scalar());
        assert_eq!(value.as_i64(), Some(37));
        assert_eq!(value.as_f64(), Some(37.0));
        assert_eq!(value.as_str(), None);

        let list = Value::from(vec![Value::Null, Value::from(true)]);
        assert!(list.is_list());
        assert!(!list.is_scalar());
        assert_eq!(list.as_list().map(Vec::len), Some(2));
    }

    #[test]
    fn test_tryfrom_value() {
        assert_eq!(i64::try_from(Value::from(5)).unwrap(), 5);
        assert_eq!(f64::try_from(Value::from(2.5)).unwrap(), 2.5);
        assert!(bool::try_from(Value::from(1)).is_err());
        assert!(Key::try_from(Value::List(vec![])).is_err());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Value::Null.kind(), "null");
        assert_eq!(Value::from(1).kind(), "number");
        assert_eq!(Value::Map(ValueMap::new()).kind(), "map");
    }
}
