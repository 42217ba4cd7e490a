//! # serde_ziggy
//!
//! A Serde-compatible library for the Ziggy data format.
//!
//! ## What is Ziggy?
//!
//! Ziggy is a human-friendly data format with typed structs, maps, arrays, tagged
//! literals and multiline strings:
//!
//! ```text
//! .id = @uuid("4f1c0d0e"),
//! .time = 1710085168,
//! .payload = Command {
//!     .do = @action("clear_chat"),
//!     .sender = "kristoff",
//!     .roles = ["admin", "mod"],
//!     .extra = {
//!         "agent": "Mozilla/5.0",
//!         "os": "Linux/x64",
//!     },
//! },
//! ```
//!
//! ## Key Features
//!
//! - **Error reporting**: malformed documents fail with every unparseable region, each
//!   with its line, column and source excerpt
//! - **Extensible decoding**: register converters for tagged literals and constructors
//!   for named structs on a [`Parser`]
//! - **Extensible encoding**: register per-type serialization functions that render
//!   values as tagged literals
//! - **Serde Compatible**: works with `#[derive(Serialize, Deserialize)]` types
//!
//! ## Quick Start
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_ziggy::{from_str, to_string};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct User {
//!     id: u32,
//!     name: String,
//!     active: bool,
//! }
//!
//! let user = User { id: 123, name: "Alice".to_string(), active: true };
//!
//! let text = to_string(&user).unwrap();
//! assert_eq!(text, "{\n    .id = 123,\n    .name = \"Alice\",\n    .active = true,\n}");
//!
//! let back: User = from_str(&text).unwrap();
//! assert_eq!(user, back);
//! ```
//!
//! ### Dynamic Values
//!
//! ```rust
//! use serde_ziggy::{parse, Value};
//!
//! let value = parse(r#"Point { .x = 0x10, .label = @tag("p") }"#).unwrap();
//! assert_eq!(value.struct_name(), Some("Point"));
//! assert_eq!(value.get("x"), Some(&Value::from(16)));
//! assert_eq!(value.get("label"), Some(&Value::from("p")));
//! ```
//!
//! ### Registries
//!
//! ```rust
//! use serde_ziggy::{Parser, Value};
//!
//! let parser = Parser::new()
//!     .literal("upper", |payload| Ok(Value::from(payload.to_uppercase())))
//!     .struct_constructor("Pair", |fields| {
//!         Ok(Value::Array(fields.into_iter().map(|(_, v)| v).collect()))
//!     });
//! let value = parser.parse(r#"Pair { .a = @upper("x"), .b = 2 }"#).unwrap();
//! assert_eq!(value, Value::Array(vec![Value::from("X"), Value::from(2)]));
//! ```
//!
//! ## Examples
//!
//! See the `demos/` directory:
//!
//! - **`parse.rs`** - decoding a document with a date literal converter
//! - **`serialize.rs`** - encoding with type names, tab indentation and tagged literals
//!
//! Run one with: `cargo run --example <name>`

pub mod de;
pub mod diagnostics;
pub mod error;
pub mod interpret;
pub mod literal;
pub mod macros;
pub mod map;
pub mod number;
pub mod options;
pub mod ser;
pub mod syntax;
pub mod value;

pub use de::{from_value, ValueDeserializer};
pub use error::{BoxError, Error, Result};
pub use interpret::Parser;
pub use map::ZiggyMap;
pub use options::{SerializationFunctions, ZiggyOptions};
pub use ser::{Serializer, ValueSerializer};
pub use value::{Number, TaggedLiteral, Value};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;

/// Parses a Ziggy document into a [`Value`] with no registered converters.
///
/// # Examples
///
/// ```rust
/// use serde_ziggy::{parse, Value};
///
/// let value = parse(".a = 1, .b = \"two\"").unwrap();
/// assert_eq!(value.get("b"), Some(&Value::from("two")));
/// ```
///
/// # Errors
///
/// Returns [`Error::Parse`] if the document has unparseable regions.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse(source: &str) -> Result<Value> {
    Parser::default().parse(source)
}

/// Serialize any `T: Serialize` to a Ziggy string with default options.
///
/// # Examples
///
/// ```rust
/// use serde_ziggy::to_string;
///
/// assert_eq!(to_string(&vec!["a", "b"]).unwrap(), "[\n    \"a\",\n    \"b\",\n]");
/// ```
///
/// # Errors
///
/// Returns an error if the value has no Ziggy representation.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, ZiggyOptions::default())
}

/// Serialize any `T: Serialize` to a Ziggy string with custom options.
///
/// # Errors
///
/// Returns an error if the value has no Ziggy representation, a registered function
/// fails, or nesting exceeds the configured depth.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T>(value: &T, options: ZiggyOptions) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_at_depth(value, options, 0)
}

/// Serialize with a starting depth, for output embedded in indented text.
///
/// # Examples
///
/// ```rust
/// use serde_ziggy::{to_string_at_depth, ZiggyOptions};
///
/// let text = to_string_at_depth(&[1], ZiggyOptions::new().with_indent("\t"), 1).unwrap();
/// assert_eq!(text, "[\n\t\t1,\n\t]");
/// ```
///
/// # Errors
///
/// Same as [`to_string_with_options`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_at_depth<T>(value: &T, options: ZiggyOptions, depth: usize) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let mut serializer = Serializer::new(options).with_depth(depth);
    value.serialize(&mut serializer)?;
    Ok(serializer.into_inner())
}

/// Convert any `T: Serialize` to a [`Value`] without applying serialization functions.
///
/// # Examples
///
/// ```rust
/// use serde_ziggy::to_value;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let value = to_value(&Point { x: 1, y: 2 }).unwrap();
/// assert_eq!(value.struct_name(), Some("Point"));
/// ```
///
/// # Errors
///
/// Returns an error if the value has no Ziggy representation.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    value.serialize(ValueSerializer::default())
}

/// Serialize any `T: Serialize` to a writer in Ziggy format.
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    to_writer_with_options(writer, value, ZiggyOptions::default())
}

/// Serialize any `T: Serialize` to a writer in Ziggy format with custom options.
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W, T>(mut writer: W, value: &T, options: ZiggyOptions) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let text = to_string_with_options(value, options)?;
    writer
        .write_all(text.as_bytes())
        .map_err(|e| Error::io(&e.to_string()))?;
    Ok(())
}

/// Deserialize an instance of type `T` from Ziggy text.
///
/// # Examples
///
/// ```rust
/// use serde_ziggy::from_str;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_str("Point { .x = 1, .y = 2 }").unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if the text is not valid Ziggy or does not have the shape of `T`.
/// Parse errors carry line and column information.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(s: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    Parser::default().parse_as(s)
}

/// Deserialize an instance of type `T` from an I/O stream of Ziggy.
///
/// # Errors
///
/// Returns an error if reading fails, the input is not valid Ziggy, or the data does not
/// have the shape of `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(mut reader: R) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    let mut string = String::new();
    reader
        .read_to_string(&mut string)
        .map_err(|e| Error::io(&e.to_string()))?;
    from_str(&string)
}

/// Deserialize an instance of type `T` from bytes of Ziggy text.
///
/// # Examples
///
/// ```rust
/// use serde_ziggy::from_slice;
///
/// let numbers: Vec<u8> = from_slice(b"[1, 0x2, 0o3, 0b100]").unwrap();
/// assert_eq!(numbers, vec![1, 2, 3, 4]);
/// ```
///
/// # Errors
///
/// Returns an error if the bytes are not valid UTF-8, not valid Ziggy, or do not have
/// the shape of `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<T>(v: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    let s = std::str::from_utf8(v).map_err(|e| Error::custom(e.to_string()))?;
    from_str(s)
}
