//! Ziggy serialization.
//!
//! Serialization runs in two steps. [`ValueSerializer`] maps any `T: Serialize` onto a
//! [`Value`], consulting the [`SerializationFunctions`] registry for every named type, and
//! the writing [`Serializer`] lays that value out as text.
//!
//! ## Structural mapping
//!
//! | Rust (serde)                      | Ziggy                                 |
//! |-----------------------------------|---------------------------------------|
//! | `()`, `None`, unit struct         | `null`                                |
//! | bool, integers, floats            | literal                               |
//! | `char`, `&str`, `String`          | quoted or multiline string            |
//! | sequences, tuples, bytes          | array                                 |
//! | maps with string keys             | map                                   |
//! | structs                           | struct, optionally with its type name |
//! | newtype structs                   | the inner value                       |
//! | unit enum variants                | the variant name as a string          |
//!
//! Enum variants carrying data, maps with non-string keys and non-finite floats have no
//! Ziggy form. They fail with [`Error::Serialization`] unless a serialization function is
//! registered for the enclosing type.
//!
//! ## Layout
//!
//! ```rust
//! use serde::Serialize;
//! use serde_ziggy::to_string;
//!
//! #[derive(Serialize)]
//! struct Data { foo: Vec<i32>, bar: f64 }
//!
//! let text = to_string(&Data { foo: vec![1, 2], bar: 3.5 }).unwrap();
//! assert_eq!(text, "{\n    .foo = [\n        1,\n        2,\n    ],\n    .bar = 3.5,\n}");
//! ```
//!
//! ## Direct Serializer Usage
//!
//! ```rust
//! use serde::Serialize;
//! use serde_ziggy::{Serializer, ZiggyOptions};
//!
//! let mut serializer = Serializer::new(ZiggyOptions::new()).with_depth(1);
//! vec![1, 2].serialize(&mut serializer).unwrap();
//! assert_eq!(serializer.into_inner(), "[\n        1,\n        2,\n    ]");
//! ```

use crate::options::SerializationFunctions;
use crate::value::{BIGINT_TOKEN, MULTILINE_TOKEN, QUOTED_TOKEN, STRUCT_TOKEN, TAGGED_TOKEN};
use crate::{Error, Number, Result, TaggedLiteral, Value, ZiggyMap, ZiggyOptions};
use num_bigint::BigInt;
use serde::{ser, Serialize};

/// The Ziggy text serializer.
///
/// Output accumulates across calls; take it with [`into_inner`](Serializer::into_inner).
pub struct Serializer {
    output: String,
    options: ZiggyOptions,
    depth: usize,
}

impl Serializer {
    pub fn new(options: ZiggyOptions) -> Self {
        Serializer {
            output: String::with_capacity(256),
            options,
            depth: 0,
        }
    }

    /// Sets the starting depth, for output embedded inside other indented text.
    ///
    /// The first line is never indented; nested lines and closing delimiters are.
    #[must_use]
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn into_inner(self) -> String {
        self.output
    }

    fn value_serializer(&self) -> ValueSerializer {
        ValueSerializer::for_writer(self.options.functions.clone())
    }

    fn emit(&mut self, value: Value) -> Result<()> {
        let depth = self.depth;
        self.write_value(&value, depth)
    }

    fn write_indent(&mut self, depth: usize) {
        for _ in 0..depth {
            self.output.push_str(&self.options.indent);
        }
    }

    /// Containers count toward the nesting limit the same way the parser counts them.
    fn enter(&self, depth: usize) -> Result<()> {
        if depth + 1 - self.depth > self.options.max_depth {
            return Err(Error::DepthLimitExceeded(self.options.max_depth));
        }
        Ok(())
    }

    fn write_value(&mut self, value: &Value, depth: usize) -> Result<()> {
        match value {
            Value::Null => self.output.push_str("null"),
            Value::Bool(b) => self.output.push_str(if *b { "true" } else { "false" }),
            Value::Number(n) => self.write_number(n)?,
            Value::String(s) if is_multiline(s) => self.write_multiline(s, depth),
            Value::String(s) => self.write_quoted(s),
            Value::Array(items) => self.write_array(items, depth)?,
            Value::Map(map) => self.write_map(map, depth)?,
            Value::Struct { name, fields } => self.write_struct(name.as_deref(), fields, depth)?,
            Value::Tagged(lit) if lit.tag == QUOTED_TOKEN => self.write_quoted(&lit.payload),
            Value::Tagged(lit) if lit.tag == MULTILINE_TOKEN && fits_lines(&lit.payload) => {
                self.write_multiline(&lit.payload, depth);
            }
            Value::Tagged(lit) if lit.tag == MULTILINE_TOKEN => self.write_quoted(&lit.payload),
            Value::Tagged(lit) => self.write_tagged(lit)?,
        }
        Ok(())
    }

    fn write_number(&mut self, n: &Number) -> Result<()> {
        if let Number::Float(f) = n {
            if !f.is_finite() {
                return Err(Error::serialization(format!("non-finite float {}", f)));
            }
        }
        self.output.push_str(&n.to_string());
        Ok(())
    }

    fn write_array(&mut self, items: &[Value], depth: usize) -> Result<()> {
        self.enter(depth)?;
        if items.is_empty() {
            self.output.push_str("[]");
            return Ok(());
        }
        self.output.push_str("[\n");
        for item in items {
            self.write_indent(depth + 1);
            self.write_value(item, depth + 1)?;
            self.output.push_str(",\n");
        }
        self.write_indent(depth);
        self.output.push(']');
        Ok(())
    }

    fn write_map(&mut self, map: &ZiggyMap, depth: usize) -> Result<()> {
        self.enter(depth)?;
        if map.is_empty() {
            self.output.push_str("{}");
            return Ok(());
        }
        self.output.push_str("{\n");
        for (key, value) in map {
            self.write_indent(depth + 1);
            self.write_quoted(key);
            self.output.push_str(": ");
            self.write_value(value, depth + 1)?;
            self.output.push_str(",\n");
        }
        self.write_indent(depth);
        self.output.push('}');
        Ok(())
    }

    fn write_struct(&mut self, name: Option<&str>, fields: &ZiggyMap, depth: usize) -> Result<()> {
        self.enter(depth)?;
        if let (true, Some(name)) = (self.options.with_type_name, name) {
            if !is_identifier(name) {
                return Err(Error::serialization(format!(
                    "struct name {:?}: not an identifier",
                    name
                )));
            }
            self.output.push_str(name);
            self.output.push(' ');
        }
        if fields.is_empty() {
            self.output.push_str("{}");
            return Ok(());
        }
        self.output.push_str("{\n");
        for (key, value) in fields {
            if !is_identifier(key) {
                return Err(Error::serialization(format!(
                    "field name {:?}: not an identifier",
                    key
                )));
            }
            self.write_indent(depth + 1);
            self.output.push('.');
            self.output.push_str(key);
            self.output.push_str(" = ");
            self.write_value(value, depth + 1)?;
            self.output.push_str(",\n");
        }
        self.write_indent(depth);
        self.output.push('}');
        Ok(())
    }

    fn write_tagged(&mut self, lit: &TaggedLiteral) -> Result<()> {
        if !is_identifier(&lit.tag) {
            return Err(Error::serialization(format!(
                "tag {:?}: not an identifier",
                lit.tag
            )));
        }
        self.output.push('@');
        self.output.push_str(&lit.tag);
        self.output.push('(');
        self.write_quoted(&lit.payload);
        self.output.push(')');
        Ok(())
    }

    fn write_quoted(&mut self, s: &str) {
        self.output.push('"');
        for ch in s.chars() {
            match ch {
                '"' => self.output.push_str("\\\""),
                '\\' => self.output.push_str("\\\\"),
                '\n' => self.output.push_str("\\n"),
                '\r' => self.output.push_str("\\r"),
                '\t' => self.output.push_str("\\t"),
                c if c.is_control() && c.is_ascii() => {
                    self.output.push_str(&format!("\\x{:02x}", u32::from(c)));
                }
                c if c.is_control() => {
                    self.output.push_str(&format!("\\u{{{:x}}}", u32::from(c)));
                }
                _ => self.output.push(ch),
            }
        }
        self.output.push('"');
    }

    /// Writes `s` as `\\`-prefixed lines at the current indentation. The value starts on
    /// its own line and the same indentation follows the last line.
    fn write_multiline(&mut self, s: &str, depth: usize) {
        let kept = self.output.trim_end_matches(|c: char| c == ' ' || c == '\t').len();
        self.output.truncate(kept);
        if !self.output.is_empty() && !self.output.ends_with('\n') {
            self.output.push('\n');
        }
        for line in s.split('\n') {
            self.write_indent(depth);
            self.output.push_str("\\\\");
            self.output.push_str(line);
            self.output.push('\n');
        }
        self.write_indent(depth);
    }
}

/// Strings with a newline and no other control character except tab.
fn is_multiline(s: &str) -> bool {
    s.contains('\n') && fits_lines(s)
}

fn fits_lines(s: &str) -> bool {
    !s.chars().any(|c| c.is_control() && c != '\n' && c != '\t')
}

pub(crate) fn is_identifier(s: &str) -> bool {
    let mut bytes = s.bytes();
    matches!(bytes.next(), Some(b) if b.is_ascii_alphabetic() || b == b'_')
        && bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

macro_rules! forward_to_value {
    ($($method:ident($($arg:ident: $ty:ty),*);)*) => {
        $(
            fn $method(self, $($arg: $ty),*) -> Result<()> {
                let value = ser::Serializer::$method(self.value_serializer(), $($arg),*)?;
                self.emit(value)
            }
        )*
    };
}

impl<'a> ser::Serializer for &'a mut Serializer {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = Compound<'a, SerializeVec>;
    type SerializeTuple = Compound<'a, SerializeVec>;
    type SerializeTupleStruct = Compound<'a, SerializeVec>;
    type SerializeTupleVariant = Compound<'a, SerializeTupleVariant>;
    type SerializeMap = Compound<'a, SerializeMap>;
    type SerializeStruct = Compound<'a, SerializeStruct>;
    type SerializeStructVariant = Compound<'a, SerializeStructVariant>;

    forward_to_value! {
        serialize_bool(v: bool);
        serialize_i8(v: i8);
        serialize_i16(v: i16);
        serialize_i32(v: i32);
        serialize_i64(v: i64);
        serialize_i128(v: i128);
        serialize_u8(v: u8);
        serialize_u16(v: u16);
        serialize_u32(v: u32);
        serialize_u64(v: u64);
        serialize_u128(v: u128);
        serialize_f32(v: f32);
        serialize_f64(v: f64);
        serialize_char(v: char);
        serialize_str(v: &str);
        serialize_bytes(v: &[u8]);
        serialize_none();
        serialize_unit();
        serialize_unit_struct(name: &'static str);
        serialize_unit_variant(name: &'static str, index: u32, variant: &'static str);
    }

    fn serialize_some<T>(self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_struct<T>(self, name: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let value = ser::Serializer::serialize_newtype_struct(self.value_serializer(), name, value)?;
        self.emit(value)
    }

    fn serialize_newtype_variant<T>(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let value = ser::Serializer::serialize_newtype_variant(
            self.value_serializer(),
            name,
            variant_index,
            variant,
            value,
        )?;
        self.emit(value)
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        let inner = ser::Serializer::serialize_seq(self.value_serializer(), len)?;
        Ok(Compound { ser: self, inner })
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        let inner = ser::Serializer::serialize_tuple(self.value_serializer(), len)?;
        Ok(Compound { ser: self, inner })
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        let inner = ser::Serializer::serialize_tuple_struct(self.value_serializer(), name, len)?;
        Ok(Compound { ser: self, inner })
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        let inner = ser::Serializer::serialize_tuple_variant(
            self.value_serializer(),
            name,
            variant_index,
            variant,
            len,
        )?;
        Ok(Compound { ser: self, inner })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap> {
        let inner = ser::Serializer::serialize_map(self.value_serializer(), len)?;
        Ok(Compound { ser: self, inner })
    }

    fn serialize_struct(self, name: &'static str, len: usize) -> Result<Self::SerializeStruct> {
        let inner = ser::Serializer::serialize_struct(self.value_serializer(), name, len)?;
        Ok(Compound { ser: self, inner })
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        let inner = ser::Serializer::serialize_struct_variant(
            self.value_serializer(),
            name,
            variant_index,
            variant,
            len,
        )?;
        Ok(Compound { ser: self, inner })
    }
}

/// A compound value being collected for the writing [`Serializer`]; written out on `end`.
pub struct Compound<'a, C> {
    ser: &'a mut Serializer,
    inner: C,
}

impl<'a> ser::SerializeSeq for Compound<'a, SerializeVec> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(&mut self.inner, value)
    }

    fn end(self) -> Result<()> {
        let value = ser::SerializeSeq::end(self.inner)?;
        self.ser.emit(value)
    }
}

impl<'a> ser::SerializeTuple for Compound<'a, SerializeVec> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeTuple::serialize_element(&mut self.inner, value)
    }

    fn end(self) -> Result<()> {
        let value = ser::SerializeTuple::end(self.inner)?;
        self.ser.emit(value)
    }
}

impl<'a> ser::SerializeTupleStruct for Compound<'a, SerializeVec> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeTupleStruct::serialize_field(&mut self.inner, value)
    }

    fn end(self) -> Result<()> {
        let value = ser::SerializeTupleStruct::end(self.inner)?;
        self.ser.emit(value)
    }
}

impl<'a> ser::SerializeTupleVariant for Compound<'a, SerializeTupleVariant> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeTupleVariant::serialize_field(&mut self.inner, value)
    }

    fn end(self) -> Result<()> {
        let value = ser::SerializeTupleVariant::end(self.inner)?;
        self.ser.emit(value)
    }
}

impl<'a> ser::SerializeMap for Compound<'a, SerializeMap> {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeMap::serialize_key(&mut self.inner, key)
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeMap::serialize_value(&mut self.inner, value)
    }

    fn end(self) -> Result<()> {
        let value = ser::SerializeMap::end(self.inner)?;
        self.ser.emit(value)
    }
}

impl<'a> ser::SerializeStruct for Compound<'a, SerializeStruct> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeStruct::serialize_field(&mut self.inner, key, value)
    }

    fn end(self) -> Result<()> {
        let value = ser::SerializeStruct::end(self.inner)?;
        self.ser.emit(value)
    }
}

impl<'a> ser::SerializeStructVariant for Compound<'a, SerializeStructVariant> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeStructVariant::serialize_field(&mut self.inner, key, value)
    }

    fn end(self) -> Result<()> {
        let value = ser::SerializeStructVariant::end(self.inner)?;
        self.ser.emit(value)
    }
}

/// Serializes any `T: Serialize` into a [`Value`].
///
/// Named types registered in the [`SerializationFunctions`] are replaced by the output of
/// their function.
///
/// # Examples
///
/// ```rust
/// use serde::Serialize;
/// use serde_ziggy::ser::ValueSerializer;
/// use serde_ziggy::Value;
///
/// #[derive(Serialize)]
/// struct Book { title: &'static str }
///
/// let value = Book { title: "Ruy Blas" }.serialize(ValueSerializer::default()).unwrap();
/// assert_eq!(value.struct_name(), Some("Book"));
/// assert_eq!(value.get("title"), Some(&Value::from("Ruy Blas")));
/// ```
#[derive(Clone, Default)]
pub struct ValueSerializer {
    functions: SerializationFunctions,
    keep_layout: bool,
}

impl ValueSerializer {
    pub fn new(functions: SerializationFunctions) -> Self {
        ValueSerializer {
            functions,
            keep_layout: false,
        }
    }

    pub(crate) fn for_writer(functions: SerializationFunctions) -> Self {
        ValueSerializer {
            functions,
            keep_layout: true,
        }
    }

    fn to_value<T: ?Sized + Serialize>(&self, value: &T) -> Result<Value> {
        value.serialize(self.clone())
    }

    /// Replaces the structural value of a named type by its registered rendering.
    fn named(&self, name: &str, value: Value) -> Result<Value> {
        Ok(self
            .functions
            .apply(name, &value, self.keep_layout)?
            .unwrap_or(value))
    }

    /// Enum variants carrying data only serialize through a registered function.
    fn variant(&self, name: &str, variant: &str, payload: Value) -> Result<Value> {
        let mut map = ZiggyMap::with_capacity(1);
        map.insert(variant.to_string(), payload);
        self.functions
            .apply(name, &Value::Map(map), self.keep_layout)?
            .ok_or_else(|| Error::serialization(format!("enum variant `{}::{}`", name, variant)))
    }

    fn tagged(value: Value) -> Result<Value> {
        match value {
            Value::Array(parts) => match <[Value; 2]>::try_from(parts) {
                Ok([Value::String(tag), Value::String(payload)]) => {
                    Ok(Value::Tagged(TaggedLiteral { tag, payload }))
                }
                _ => Err(Error::custom("malformed tagged literal")),
            },
            _ => Err(Error::custom("malformed tagged literal")),
        }
    }

    fn structure(&self, value: Value) -> Result<Value> {
        let Value::Array(parts) = value else {
            return Err(Error::custom("malformed struct"));
        };
        match <[Value; 2]>::try_from(parts) {
            Ok([Value::Null, Value::Map(fields)]) => Ok(Value::Struct { name: None, fields }),
            Ok([Value::String(name), Value::Map(fields)]) => {
                let structure = Value::Struct {
                    name: Some(name.clone()),
                    fields,
                };
                self.named(&name, structure)
            }
            _ => Err(Error::custom("malformed struct")),
        }
    }

    fn big_integer(value: Value) -> Result<Value> {
        match value {
            Value::String(digits) => digits
                .parse::<BigInt>()
                .map(|bi| Value::Number(Number::from(bi)))
                .map_err(|_| Error::invalid_number("integer", &digits)),
            _ => Err(Error::custom("malformed big integer")),
        }
    }
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeTupleVariant;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeStruct;
    type SerializeStructVariant = SerializeStructVariant;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        Ok(Value::Array(v.iter().map(|&b| Value::from(b)).collect()))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Value> {
        self.named(name, Value::Null)
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        self.named(name, Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, name: &'static str, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        let inner = self.to_value(value)?;
        match name {
            TAGGED_TOKEN => Self::tagged(inner),
            STRUCT_TOKEN => self.structure(inner),
            BIGINT_TOKEN => Self::big_integer(inner),
            _ => self.named(name, inner),
        }
    }

    fn serialize_newtype_variant<T>(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        let payload = self.to_value(value)?;
        self.variant(name, variant, payload)
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec {
            ser: self,
            name: None,
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, name: &'static str, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec {
            ser: self,
            name: Some(name),
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeTupleVariant> {
        Ok(SerializeTupleVariant {
            ser: self,
            name,
            variant,
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap {
            ser: self,
            map: ZiggyMap::with_capacity(len.unwrap_or(0)),
            current_key: None,
        })
    }

    fn serialize_struct(self, name: &'static str, len: usize) -> Result<SerializeStruct> {
        Ok(SerializeStruct {
            ser: self,
            name,
            fields: ZiggyMap::with_capacity(len),
        })
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeStructVariant> {
        Ok(SerializeStructVariant {
            ser: self,
            name,
            variant,
            fields: ZiggyMap::with_capacity(len),
        })
    }
}

pub struct SerializeVec {
    ser: ValueSerializer,
    name: Option<&'static str>,
    items: Vec<Value>,
}

impl SerializeVec {
    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.items.push(self.ser.to_value(value)?);
        Ok(())
    }

    fn finish(self) -> Result<Value> {
        let value = Value::Array(self.items);
        match self.name {
            Some(name) => self.ser.named(name, value),
            None => Ok(value),
        }
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        self.finish()
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        self.finish()
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        self.finish()
    }
}

pub struct SerializeTupleVariant {
    ser: ValueSerializer,
    name: &'static str,
    variant: &'static str,
    items: Vec<Value>,
}

impl ser::SerializeTupleVariant for SerializeTupleVariant {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.items.push(self.ser.to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        self.ser
            .variant(self.name, self.variant, Value::Array(self.items))
    }
}

pub struct SerializeMap {
    ser: ValueSerializer,
    map: ZiggyMap,
    current_key: Option<String>,
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        match self.ser.to_value(key)? {
            Value::String(s) => {
                self.current_key = Some(s);
                Ok(())
            }
            other => Err(Error::serialization(format!(
                "map key of type {}",
                other.kind_name()
            ))),
        }
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        let value = self.ser.to_value(value)?;
        self.map.insert(key, value);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Map(self.map))
    }
}

pub struct SerializeStruct {
    ser: ValueSerializer,
    name: &'static str,
    fields: ZiggyMap,
}

impl ser::SerializeStruct for SerializeStruct {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let value = self.ser.to_value(value)?;
        self.fields.insert(key.to_string(), value);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        let value = Value::Struct {
            name: Some(self.name.to_string()),
            fields: self.fields,
        };
        self.ser.named(self.name, value)
    }
}

pub struct SerializeStructVariant {
    ser: ValueSerializer,
    name: &'static str,
    variant: &'static str,
    fields: ZiggyMap,
}

impl ser::SerializeStructVariant for SerializeStructVariant {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let value = self.ser.to_value(value)?;
        self.fields.insert(key.to_string(), value);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        self.ser
            .variant(self.name, self.variant, Value::Map(self.fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{to_string, to_string_with_options};
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct Data {
        foo: Vec<serde_json::Value>,
        bar: f64,
    }

    #[derive(Serialize)]
    enum Action {
        Send,
        Clear,
    }

    #[derive(Serialize)]
    enum Shape {
        Circle { radius: f64 },
    }

    #[test]
    fn test_scalars() {
        assert_eq!(to_string(&()).unwrap(), "null");
        assert_eq!(to_string(&true).unwrap(), "true");
        assert_eq!(to_string(&-42i8).unwrap(), "-42");
        assert_eq!(to_string(&1.0f64).unwrap(), "1.0");
        assert_eq!(to_string(&u128::MAX).unwrap(), u128::MAX.to_string());
        assert_eq!(to_string(&Option::<i32>::None).unwrap(), "null");
        assert_eq!(to_string(&'z').unwrap(), r#""z""#);
    }

    #[test]
    fn test_quoting() {
        assert_eq!(
            to_string("OK\"you\" lucky\tboy's\\").unwrap(),
            r#""OK\"you\" lucky\tboy's\\""#
        );
        assert_eq!(to_string("bell\u{7}").unwrap(), r#""bell\x07""#);
        assert_eq!(to_string("cr\r\nlf").unwrap(), r#""cr\r\nlf""#);
    }

    #[test]
    fn test_containers() {
        assert_eq!(to_string(&vec![1, 2]).unwrap(), "[\n    1,\n    2,\n]");
        assert_eq!(to_string(&Vec::<i32>::new()).unwrap(), "[]");

        let mut map = BTreeMap::new();
        map.insert("a", vec![true]);
        map.insert("b", vec![]);
        assert_eq!(
            to_string(&map).unwrap(),
            "{\n    \"a\": [\n        true,\n    ],\n    \"b\": [],\n}"
        );
        assert_eq!(to_string(&BTreeMap::<String, i32>::new()).unwrap(), "{}");
        assert_eq!(to_string(&(1, "x")).unwrap(), "[\n    1,\n    \"x\",\n]");
        assert_eq!(to_string(&b"hi"[..]).unwrap(), "[\n    104,\n    105,\n]");
    }

    #[test]
    fn test_struct_with_and_without_type_name() {
        let data = Data {
            foo: vec![serde_json::json!(true), serde_json::json!("A"), serde_json::json!(1)],
            bar: 3.5,
        };
        let body = ".foo = [\n        true,\n        \"A\",\n        1,\n    ],\n    .bar = 3.5,\n}";
        assert_eq!(to_string(&data).unwrap(), format!("{{\n    {}", body));

        let options = ZiggyOptions::new().with_type_name(true);
        assert_eq!(
            to_string_with_options(&data, options).unwrap(),
            format!("Data {{\n    {}", body)
        );
    }

    #[test]
    fn test_multiline_string_layout() {
        #[derive(Serialize)]
        struct Note {
            text: &'static str,
        }
        let text = to_string(&Note { text: "first\nsecond" }).unwrap();
        assert_eq!(
            text,
            "{\n    .text =\n    \\\\first\n    \\\\second\n    ,\n}"
        );
        assert_eq!(to_string("a\nb").unwrap(), "\\\\a\n\\\\b\n");
    }

    #[test]
    fn test_with_depth() {
        let mut serializer = Serializer::new(ZiggyOptions::new().with_indent("\t")).with_depth(2);
        vec![vec![1]].serialize(&mut serializer).unwrap();
        assert_eq!(serializer.into_inner(), "[\n\t\t\t[\n\t\t\t\t1,\n\t\t\t],\n\t\t]");
    }

    #[test]
    fn test_unit_variant_is_a_string() {
        assert_eq!(to_string(&Action::Clear).unwrap(), r#""Clear""#);
    }

    #[test]
    fn test_data_variant_requires_function() {
        let shape = Shape::Circle { radius: 1.5 };
        let err = to_string(&shape).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
        assert_eq!(err.to_string(), "cannot serialize enum variant `Shape::Circle`");

        let options = ZiggyOptions::new().with_function("Shape", "shape", |v| {
            let radius = v
                .get("Circle")
                .and_then(|c| c.get("radius"))
                .and_then(Value::as_f64)
                .unwrap_or_default();
            Ok(format!("circle:{}", radius))
        });
        assert_eq!(
            to_string_with_options(&shape, options).unwrap(),
            r#"@shape("circle:1.5")"#
        );
    }

    #[test]
    fn test_registered_struct_and_unit_variant() {
        #[derive(Serialize)]
        struct Stamp {
            secs: i64,
        }
        #[derive(Serialize)]
        struct Event {
            command: Action,
            at: Stamp,
        }

        let options = ZiggyOptions::new()
            .with_function("Action", "user_action", |v| {
                Ok(v.as_str().unwrap_or_default().to_lowercase())
            })
            .with_function("Stamp", "timestamp", |v| {
                Ok(v.get("secs").and_then(Value::as_i64).unwrap_or_default().to_string())
            });
        let event = Event {
            command: Action::Send,
            at: Stamp { secs: 1710085168 },
        };
        assert_eq!(
            to_string_with_options(&event, options).unwrap(),
            "{\n    .command = @user_action(\"send\"),\n    .at = @timestamp(\"1710085168\"),\n}"
        );
    }

    #[test]
    fn test_callback_error_propagates() {
        let options = ZiggyOptions::new().with_function("Action", "a", |_| Err("boom".into()));
        let err = to_string_with_options(&Action::Send, options).unwrap_err();
        assert!(matches!(err, Error::Callback(_)));
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_rejections() {
        let mut int_keys = BTreeMap::new();
        int_keys.insert(1, "one");
        assert_eq!(
            to_string(&int_keys).unwrap_err().to_string(),
            "cannot serialize map key of type integer"
        );
        assert!(matches!(to_string(&f64::NAN), Err(Error::Serialization(_))));

        let mut fields = ZiggyMap::new();
        fields.insert("not an identifier".to_string(), Value::Null);
        let odd = Value::Struct { name: None, fields };
        assert!(matches!(to_string(&odd), Err(Error::Serialization(_))));
    }

    #[test]
    fn test_value_passthrough() {
        let mut fields = ZiggyMap::new();
        fields.insert("id".to_string(), Value::Tagged(TaggedLiteral::new("uuid", "1234")));
        let value = Value::Struct {
            name: Some("Message".to_string()),
            fields,
        };
        let options = ZiggyOptions::new().with_type_name(true);
        assert_eq!(
            to_string_with_options(&value, options).unwrap(),
            "Message {\n    .id = @uuid(\"1234\"),\n}"
        );

        let big: BigInt = "123456789012345678901234567890123456789012".parse().unwrap();
        let value = Value::from(big.clone());
        assert_eq!(to_string(&value).unwrap(), big.to_string());
    }

    #[test]
    fn test_depth_limit() {
        let nested = vec![vec![vec![1]]];
        let options = ZiggyOptions::new().with_max_depth(2);
        assert!(matches!(
            to_string_with_options(&nested, options),
            Err(Error::DepthLimitExceeded(2))
        ));
        assert!(to_string_with_options(&nested, ZiggyOptions::new().with_max_depth(3)).is_ok());
    }

    #[test]
    fn test_depth_limit_counts_empty_containers() {
        let nested = Value::Array(vec![Value::Array(vec![])]);
        assert!(matches!(
            to_string_with_options(&nested, ZiggyOptions::new().with_max_depth(1)),
            Err(Error::DepthLimitExceeded(1))
        ));
        assert_eq!(
            to_string_with_options(&nested, ZiggyOptions::new().with_max_depth(2)).unwrap(),
            "[\n    [],\n]"
        );
    }
}
