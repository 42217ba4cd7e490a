//! Typed decoding of Ziggy values.
//!
//! Documents are first interpreted into a [`Value`] by a [`Parser`](crate::Parser);
//! [`ValueDeserializer`] then drives any `T: Deserialize` from that value.
//!
//! ## Usage
//!
//! ```rust
//! use serde::Deserialize;
//! use serde_ziggy::from_str;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Data { x: i32, y: i32 }
//!
//! let data: Data = from_str(".x = 1, .y = 2").unwrap();
//! assert_eq!(data, Data { x: 1, y: 2 });
//! ```
//!
//! ## Enums
//!
//! Unit variants decode from strings. Variants with data decode from a single-entry map
//! or from a struct named after the variant:
//!
//! ```rust
//! use serde::Deserialize;
//! use serde_ziggy::from_str;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! enum Shape { Dot, Circle { radius: f64 } }
//!
//! let shapes: Vec<Shape> = from_str(r#"["Dot", Circle { .radius = 1.5 }]"#).unwrap();
//! assert_eq!(shapes, vec![Shape::Dot, Shape::Circle { radius: 1.5 }]);
//! ```
//!
//! Tagged literals decode as their payload string.

use crate::{Error, Number, Result, Value, ZiggyMap};
use serde::de::{DeserializeOwned, IntoDeserializer};
use serde::{de, forward_to_deserialize_any};

/// Deserializes an instance of `T` from a [`Value`].
///
/// # Examples
///
/// ```rust
/// use serde_ziggy::{from_value, ziggy};
///
/// let pair: (String, i64) = from_value(ziggy!(["a", 1])).unwrap();
/// assert_eq!(pair, ("a".to_string(), 1));
/// ```
///
/// # Errors
///
/// Returns an error if the value does not have the shape `T` expects.
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T> {
    T::deserialize(ValueDeserializer::new(value))
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<Value>,
}

impl SeqDeserializer {
    fn new(vec: Vec<Value>) -> Self {
        SeqDeserializer {
            iter: vec.into_iter(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct MapDeserializer {
    iter: indexmap::map::IntoIter<String, Value>,
    value: Option<Value>,
}

impl MapDeserializer {
    fn new(map: ZiggyMap) -> Self {
        MapDeserializer {
            iter: map.into_iter(),
            value: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(key.into_deserializer()).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct EnumDeserializer {
    variant: String,
    value: Option<Value>,
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(self.variant.into_deserializer())?;
        Ok((variant, VariantDeserializer { value: self.value }))
    }
}

struct VariantDeserializer {
    value: Option<Value>,
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            Some(Value::Null) | None => Ok(()),
            Some(other) => Err(Error::custom(format!(
                "expected unit variant, found {}",
                other.kind_name()
            ))),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.value {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::custom("expected newtype variant, found a string")),
        }
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(Value::Array(items)) => visitor.visit_seq(SeqDeserializer::new(items)),
            _ => Err(Error::custom("expected tuple variant")),
        }
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(Value::Map(fields) | Value::Struct { fields, .. }) => {
                visitor.visit_map(MapDeserializer::new(fields))
            }
            _ => Err(Error::custom("expected struct variant")),
        }
    }
}

/// A serde deserializer over an owned [`Value`].
pub struct ValueDeserializer {
    value: Value,
}

impl ValueDeserializer {
    #[must_use]
    pub fn new(value: Value) -> Self {
        ValueDeserializer { value }
    }
}

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Number(Number::Integer(i)) => visitor.visit_i64(i),
            Value::Number(Number::BigInt(bi)) => {
                if let Ok(u) = u64::try_from(&bi) {
                    visitor.visit_u64(u)
                } else if let Ok(i) = i128::try_from(&bi) {
                    visitor.visit_i128(i)
                } else if let Ok(u) = u128::try_from(&bi) {
                    visitor.visit_u128(u)
                } else {
                    visitor.visit_string(bi.to_string())
                }
            }
            Value::Number(Number::Float(f)) => visitor.visit_f64(f),
            Value::String(s) => visitor.visit_string(s),
            Value::Array(items) => visitor.visit_seq(SeqDeserializer::new(items)),
            Value::Map(map) | Value::Struct { fields: map, .. } => {
                visitor.visit_map(MapDeserializer::new(map))
            }
            Value::Tagged(lit) => visitor.visit_string(lit.payload),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let (variant, value) = match self.value {
            Value::String(s) => (s, None),
            Value::Tagged(lit) => (lit.payload, None),
            Value::Struct {
                name: Some(variant),
                fields,
            } => (variant, Some(Value::Map(fields))),
            Value::Map(map) if map.len() == 1 => match map.into_iter().next() {
                Some((variant, value)) => (variant, Some(value)),
                None => return Err(Error::custom("empty enum map")),
            },
            other => {
                return Err(Error::custom(format!(
                    "expected enum `{}`, found {}",
                    name,
                    other.kind_name()
                )))
            }
        };
        visitor.visit_enum(EnumDeserializer { variant, value })
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

impl<'de> IntoDeserializer<'de, Error> for Value {
    type Deserializer = ValueDeserializer;

    fn into_deserializer(self) -> ValueDeserializer {
        ValueDeserializer::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{from_str, TaggedLiteral};
    use serde::Deserialize;
    use std::collections::HashMap;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Message {
        id: String,
        body: Option<String>,
        tags: Vec<String>,
    }

    #[derive(Deserialize, Debug, PartialEq)]
    enum Command {
        Stop,
        Move(i32, i32),
        Say(String),
        Paint { color: String },
    }

    #[test]
    fn test_struct_from_top_level_fields() {
        let message: Message = from_str(
            r#"
            .id = @uuid("1234"),
            .body = null,
            .tags = ["a", "b"],
            "#,
        )
        .unwrap();
        assert_eq!(
            message,
            Message {
                id: "1234".to_string(),
                body: None,
                tags: vec!["a".to_string(), "b".to_string()],
            }
        );
    }

    #[test]
    fn test_named_and_unnamed_structs() {
        let named: Message = from_str(r#"Message { .id = "x", .body = "hi", .tags = [] }"#).unwrap();
        assert_eq!(named.body.as_deref(), Some("hi"));

        let map: HashMap<String, i64> = from_str(r#"{ "a": 1, "b": 2 }"#).unwrap();
        assert_eq!(map["b"], 2);
    }

    #[test]
    fn test_enum_forms() {
        let commands: Vec<Command> = from_str(
            r#"[
                "Stop",
                { "Move": [1, -2] },
                { "Say": "hello" },
                Paint { .color = "red" },
            ]"#,
        )
        .unwrap();
        assert_eq!(
            commands,
            vec![
                Command::Stop,
                Command::Move(1, -2),
                Command::Say("hello".to_string()),
                Command::Paint {
                    color: "red".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_enum_rejects_other_kinds() {
        let err = from_value::<Command>(Value::from(3)).unwrap_err();
        assert_eq!(err.to_string(), "expected enum `Command`, found integer");
    }

    #[test]
    fn test_tagged_literal_is_its_payload() {
        let value = Value::Tagged(TaggedLiteral::new("date", "2025-10-25T11:34"));
        let text: String = from_value(value).unwrap();
        assert_eq!(text, "2025-10-25T11:34");
    }

    #[test]
    fn test_wide_integers() {
        let wide: u128 = from_str("340282366920938463463374607431768211455").unwrap();
        assert_eq!(wide, u128::MAX);
        let small: u8 = from_str("0xff").unwrap();
        assert_eq!(small, 255);
        assert!(from_str::<u8>("256").is_err());
    }

    #[test]
    fn test_value_round_trips_through_deserialize() {
        let value: Value = from_str(r#"Point { .x = 1.5, .y = [true] }"#).unwrap();
        assert_eq!(value.get("x").and_then(Value::as_f64), Some(1.5));
        assert!(value.get("y").is_some_and(Value::is_array));
    }
}
