//! Dynamic value representation for Ziggy data.
//!
//! [`Value`] is the common currency between decoding and encoding. Decoding a document
//! produces a `Value`; encoding converts any `T: Serialize` into a `Value` before it is
//! rendered as text.
//!
//! ## Core Types
//!
//! - [`Value`]: null, bool, number, string, array, map, struct or tagged literal
//! - [`Number`]: a 64-bit integer, an arbitrary-precision integer or a double
//! - [`TaggedLiteral`]: a `@tag("payload")` literal kept as such
//!
//! Quoted and multiline strings both decode to [`Value::String`]; no distinction
//! survives decoding. Unnamed structs decode to [`Value::Map`].
//!
//! ### Creating Values
//!
//! ```rust
//! use serde_ziggy::{ziggy, Value};
//!
//! let text = Value::from("hello");
//! let book = ziggy!({
//!     "title": "Ruy Blas",
//!     "year": 1838
//! });
//! assert!(book.is_map());
//! ```
//!
//! ### Extracting Values
//!
//! ```rust
//! use serde_ziggy::Value;
//!
//! let value = Value::from(42);
//! let num: i64 = i64::try_from(value).unwrap();
//! assert_eq!(num, 42);
//! ```

use crate::ZiggyMap;
use num_bigint::BigInt;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Newtype-struct name under which a [`TaggedLiteral`] travels through serde.
pub(crate) const TAGGED_TOKEN: &str = "$serde_ziggy::private::Tagged";
/// Newtype-struct name under which a named [`Value::Struct`] travels through serde.
pub(crate) const STRUCT_TOKEN: &str = "$serde_ziggy::private::Struct";
/// Newtype-struct name for integers wider than 128 bits.
pub(crate) const BIGINT_TOKEN: &str = "$serde_ziggy::private::BigInt";
/// Tags marking a registered string whose layout is fixed. Never valid in Ziggy text.
pub(crate) const QUOTED_TOKEN: &str = "$serde_ziggy::private::Quoted";
pub(crate) const MULTILINE_TOKEN: &str = "$serde_ziggy::private::Multiline";

/// A dynamically-typed representation of any Ziggy value.
///
/// # Examples
///
/// ```rust
/// use serde_ziggy::{Number, Value};
///
/// let null = Value::Null;
/// let num = Value::Number(Number::Integer(42));
/// let text = Value::String("hello".to_string());
///
/// assert!(null.is_null());
/// assert!(num.is_number());
/// assert!(text.is_string());
/// ```
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    Map(ZiggyMap),
    /// A record with named fields. The name is rendered only when the serializer is
    /// configured to emit type names.
    Struct {
        name: Option<String>,
        fields: ZiggyMap,
    },
    Tagged(TaggedLiteral),
}

/// A numeric value.
///
/// Integers that fit in an `i64` are always held as [`Number::Integer`]; wider integers
/// use [`Number::BigInt`]. Equality between the two integer forms is numeric.
///
/// # Examples
///
/// ```rust
/// use serde_ziggy::Number;
/// use num_bigint::BigInt;
///
/// assert_eq!(Number::from(BigInt::from(7)), Number::Integer(7));
/// assert!(Number::Float(3.5).is_float());
/// assert_eq!(Number::Integer(42).as_f64(), 42.0);
/// ```
#[derive(Clone, Debug)]
pub enum Number {
    Integer(i64),
    BigInt(BigInt),
    Float(f64),
}

impl Number {
    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Number::Integer(_) | Number::BigInt(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Number::Float(_))
    }

    /// Converts this number to an `i64` if it is an integer in range.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_ziggy::Number;
    ///
    /// assert_eq!(Number::Integer(42).as_i64(), Some(42));
    /// assert_eq!(Number::Float(42.0).as_i64(), None);
    /// ```
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Number::Integer(i) => Some(*i),
            Number::BigInt(bi) => i64::try_from(bi).ok(),
            Number::Float(_) => None,
        }
    }

    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Number::Integer(i) => u64::try_from(*i).ok(),
            Number::BigInt(bi) => u64::try_from(bi).ok(),
            Number::Float(_) => None,
        }
    }

    /// Converts this number to an `f64`, rounding wide integers.
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Integer(i) => *i as f64,
            Number::BigInt(bi) => bi.to_string().parse().unwrap_or(f64::NAN),
            Number::Float(f) => *f,
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Integer(a), Number::Integer(b)) => a == b,
            (Number::BigInt(a), Number::BigInt(b)) => a == b,
            (Number::Integer(a), Number::BigInt(b)) | (Number::BigInt(b), Number::Integer(a)) => {
                BigInt::from(*a) == *b
            }
            (Number::Float(a), Number::Float(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{}", i),
            Number::BigInt(bi) => write!(f, "{}", bi),
            // Debug keeps a `.0` or an exponent, so floats never read back as integers.
            Number::Float(fl) => write!(f, "{:?}", fl),
        }
    }
}

impl From<BigInt> for Number {
    fn from(value: BigInt) -> Self {
        match i64::try_from(&value) {
            Ok(i) => Number::Integer(i),
            Err(_) => Number::BigInt(value),
        }
    }
}

macro_rules! number_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Number {
                fn from(value: $ty) -> Self {
                    Number::Integer(i64::from(value))
                }
            }
        )*
    };
}

number_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(i) => Number::Integer(i),
            Err(_) => Number::BigInt(BigInt::from(value)),
        }
    }
}

impl From<i128> for Number {
    fn from(value: i128) -> Self {
        Number::from(BigInt::from(value))
    }
}

impl From<u128> for Number {
    fn from(value: u128) -> Self {
        Number::from(BigInt::from(value))
    }
}

impl From<f32> for Number {
    fn from(value: f32) -> Self {
        Number::Float(f64::from(value))
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

/// A `@tag("payload")` literal.
///
/// Decoding only yields tagged literals for tags registered with
/// [`Parser::preserve_tag`](crate::Parser::preserve_tag); other tags decode to their
/// payload string. Serializing a `TaggedLiteral` with this crate always renders the
/// literal form.
///
/// # Examples
///
/// ```rust
/// use serde_ziggy::{to_string, TaggedLiteral};
///
/// let uuid = TaggedLiteral::new("uuid", "4f1c0d0e");
/// assert_eq!(to_string(&uuid).unwrap(), r#"@uuid("4f1c0d0e")"#);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TaggedLiteral {
    pub tag: String,
    pub payload: String,
}

impl TaggedLiteral {
    pub fn new(tag: impl Into<String>, payload: impl Into<String>) -> Self {
        TaggedLiteral {
            tag: tag.into(),
            payload: payload.into(),
        }
    }
}

impl fmt::Display for TaggedLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}({:?})", self.tag, self.payload)
    }
}

impl Serialize for TaggedLiteral {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_newtype_struct(TAGGED_TOKEN, &(&self.tag, &self.payload))
    }
}

impl Value {
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_struct(&self) -> bool {
        matches!(self, Value::Struct { .. })
    }

    #[inline]
    #[must_use]
    pub const fn is_tagged(&self) -> bool {
        matches!(self, Value::Tagged(_))
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// If the value is a string, returns a reference to it. Otherwise returns `None`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_ziggy::Value;
    ///
    /// assert_eq!(Value::from("hello").as_str(), Some("hello"));
    /// assert_eq!(Value::from(42).as_str(), None);
    /// ```
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(n.as_f64()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Returns the entries of a map or the fields of a struct.
    #[must_use]
    pub fn as_map(&self) -> Option<&ZiggyMap> {
        match self {
            Value::Map(map) => Some(map),
            Value::Struct { fields, .. } => Some(fields),
            _ => None,
        }
    }

    /// Returns the type name of a named struct.
    #[must_use]
    pub fn struct_name(&self) -> Option<&str> {
        match self {
            Value::Struct { name, .. } => name.as_deref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_tagged(&self) -> Option<&TaggedLiteral> {
        match self {
            Value::Tagged(lit) => Some(lit),
            _ => None,
        }
    }

    /// Looks up a map entry or struct field.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_ziggy::parse;
    ///
    /// let book = parse(r#"Book { .title = "Ruy Blas" }"#).unwrap();
    /// assert_eq!(book.get("title").and_then(|v| v.as_str()), Some("Ruy Blas"));
    /// ```
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// A short description of the value's kind, used in error messages.
    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(Number::Float(_)) => "float",
            Value::Number(_) => "integer",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Struct { .. } => "struct",
            Value::Tagged(_) => "tagged literal",
        }
    }
}

impl Serialize for ZiggyMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
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
            Value::Number(Number::Integer(i)) => serializer.serialize_i64(*i),
            Value::Number(Number::BigInt(bi)) => {
                if let Ok(i) = i128::try_from(bi) {
                    serializer.serialize_i128(i)
                } else if let Ok(u) = u128::try_from(bi) {
                    serializer.serialize_u128(u)
                } else {
                    serializer.serialize_newtype_struct(BIGINT_TOKEN, &bi.to_string())
                }
            }
            Value::Number(Number::Float(f)) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(arr) => {
                use serde::ser::SerializeSeq;
                let mut seq = serializer.serialize_seq(Some(arr.len()))?;
                for element in arr {
                    seq.serialize_element(element)?;
                }
                seq.end()
            }
            Value::Map(map) => map.serialize(serializer),
            Value::Struct { name, fields } => {
                serializer.serialize_newtype_struct(STRUCT_TOKEN, &(name, fields))
            }
            Value::Tagged(lit) => lit.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any valid Ziggy value")
            }

            fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E> {
                Ok(Value::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E> {
                Ok(Value::Number(Number::Integer(value)))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E> {
                Ok(Value::Number(Number::from(value)))
            }

            fn visit_i128<E>(self, value: i128) -> Result<Self::Value, E> {
                Ok(Value::Number(Number::from(value)))
            }

            fn visit_u128<E>(self, value: u128) -> Result<Self::Value, E> {
                Ok(Value::Number(Number::from(value)))
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
                A: de::SeqAccess<'de>,
            {
                let mut vec = Vec::new();
                while let Some(elem) = seq.next_element()? {
                    vec.push(elem);
                }
                Ok(Value::Array(vec))
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut values = ZiggyMap::new();
                while let Some((key, value)) = map.next_entry()? {
                    values.insert(key, value);
                }
                Ok(Value::Map(values))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

impl TryFrom<Value> for i64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        value
            .as_i64()
            .ok_or_else(|| crate::Error::custom(format!("expected integer, found {:?}", value)))
    }
}

impl TryFrom<Value> for f64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        value
            .as_f64()
            .ok_or_else(|| crate::Error::custom(format!("expected number, found {:?}", value)))
    }
}

impl TryFrom<Value> for bool {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            _ => Err(crate::Error::custom(format!(
                "expected bool, found {:?}",
                value
            ))),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            Value::Tagged(lit) => Ok(lit.payload),
            _ => Err(crate::Error::custom(format!(
                "expected string, found {:?}",
                value
            ))),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

macro_rules! value_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Number(Number::from(value))
                }
            }
        )*
    };
}

value_from_number!(i8, i16, i32, i64, i128, u8, u16, u32, u64, u128, f32, f64, BigInt);

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::Number(value)
    }
}

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

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<ZiggyMap> for Value {
    fn from(value: ZiggyMap) -> Self {
        Value::Map(value)
    }
}

impl From<TaggedLiteral> for Value {
    fn from(value: TaggedLiteral) -> Self {
        Value::Tagged(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tryfrom_i64() {
        let value = Value::Number(Number::Integer(42));
        assert_eq!(i64::try_from(value).unwrap(), 42);

        let value = Value::Number(Number::BigInt(BigInt::from(-7)));
        assert_eq!(i64::try_from(value).unwrap(), -7);

        assert!(i64::try_from(Value::from(1.5)).is_err());
        assert!(i64::try_from(Value::from("test")).is_err());
    }

    #[test]
    fn test_tryfrom_string_accepts_tag_payload() {
        let value = Value::Tagged(TaggedLiteral::new("date", "2025-10-25"));
        assert_eq!(String::try_from(value).unwrap(), "2025-10-25");
        assert!(String::try_from(Value::from(1)).is_err());
    }

    #[test]
    fn test_number_equality_across_integer_forms() {
        assert_eq!(Number::Integer(5), Number::BigInt(BigInt::from(5)));
        assert_ne!(Number::Integer(5), Number::Float(5.0));
        assert_eq!(Number::from(u64::MAX).as_u64(), Some(u64::MAX));
        assert!(matches!(Number::from(u64::MAX), Number::BigInt(_)));
    }

    #[test]
    fn test_float_display_keeps_float_syntax() {
        assert_eq!(Number::Float(1.0).to_string(), "1.0");
        assert_eq!(Number::Float(-0.5).to_string(), "-0.5");
        assert_eq!(Number::Float(1e300).to_string(), "1e300");
    }

    #[test]
    fn test_accessors() {
        let mut fields = ZiggyMap::new();
        fields.insert("title".to_string(), Value::from("Ruy Blas"));
        let book = Value::Struct {
            name: Some("Book".to_string()),
            fields,
        };
        assert_eq!(book.struct_name(), Some("Book"));
        assert_eq!(book.get("title").and_then(Value::as_str), Some("Ruy Blas"));
        assert!(book.get("author").is_none());
        assert!(Value::Null.get("title").is_none());
    }

    #[test]
    fn test_const_is_methods() {
        const fn check_null(v: &Value) -> bool {
            v.is_null()
        }

        assert!(check_null(&Value::Null));
        assert!(Value::Tagged(TaggedLiteral::new("a", "b")).is_tagged());
    }
}
