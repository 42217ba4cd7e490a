//! Syntax tree interpretation.
//!
//! [`Parser`] turns a document into a [`Value`]. It first fails fast on any error node of
//! the syntax tree, then walks the tree, dispatching on [`NodeKind`]. Two registries let
//! the caller take over parts of the walk:
//!
//! - **literals**: a tag name mapped to a converter that receives the decoded payload of
//!   `@tag("payload")`
//! - **structs**: a struct name mapped to a constructor that receives the decoded fields of
//!   `Name { .field = value, ... }`
//!
//! ```rust
//! use serde_ziggy::{Parser, Value};
//!
//! let parser = Parser::new()
//!     .struct_constructor("Book", |fields| {
//!         let title = fields.get("title").and_then(Value::as_str).unwrap_or_default();
//!         Ok(Value::from(format!("<{}>", title)))
//!     });
//!
//! let value = parser.parse(r#"Book { .title = "Ruy Blas" }"#).unwrap();
//! assert_eq!(value, Value::from("<Ruy Blas>"));
//! ```

use crate::diagnostics;
use crate::error::BoxError;
use crate::number::{decode_float, decode_integer};
use crate::syntax::{Field, Node, NodeKind, SyntaxTree, DEFAULT_MAX_DEPTH};
use crate::{Error, Number, Result, TaggedLiteral, Value, ZiggyMap};
use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Converts the payload of a tagged literal.
pub type LiteralFn = dyn Fn(&str) -> std::result::Result<Value, BoxError> + Send + Sync;

/// Builds a value from the fields of a named struct.
pub type StructFn = dyn Fn(ZiggyMap) -> std::result::Result<Value, BoxError> + Send + Sync;

/// Decoder configuration: registries plus the nesting limit.
///
/// A `Parser` is immutable once built and can be shared between threads; every call to
/// [`parse`](Parser::parse) reads the same registries.
#[derive(Clone)]
pub struct Parser {
    literals: HashMap<String, Arc<LiteralFn>>,
    structs: HashMap<String, Arc<StructFn>>,
    preserved: HashSet<String>,
    max_depth: usize,
}

impl Default for Parser {
    fn default() -> Self {
        Parser {
            literals: HashMap::new(),
            structs: HashMap::new(),
            preserved: HashSet::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut literals: Vec<_> = self.literals.keys().collect();
        literals.sort();
        let mut structs: Vec<_> = self.structs.keys().collect();
        structs.sort();
        f.debug_struct("Parser")
            .field("literals", &literals)
            .field("structs", &structs)
            .field("preserved", &self.preserved)
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a converter for `@tag("...")` literals.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_ziggy::{Parser, Value};
    ///
    /// let parser = Parser::new().literal("upper", |s| Ok(Value::from(s.to_uppercase())));
    /// assert_eq!(parser.parse(r#"@upper("abc")"#).unwrap(), Value::from("ABC"));
    /// assert_eq!(parser.parse(r#"@other("abc")"#).unwrap(), Value::from("abc"));
    /// ```
    #[must_use]
    pub fn literal<F>(mut self, tag: impl Into<String>, converter: F) -> Self
    where
        F: Fn(&str) -> std::result::Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.literals.insert(tag.into(), Arc::new(converter));
        self
    }

    /// Registers a constructor for structs named `name`.
    #[must_use]
    pub fn struct_constructor<F>(mut self, name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(ZiggyMap) -> std::result::Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.structs.insert(name.into(), Arc::new(constructor));
        self
    }

    /// Keeps `@tag("...")` literals as [`Value::Tagged`] instead of decoding them to their
    /// payload. A converter registered for the same tag takes precedence.
    ///
    /// ```rust
    /// use serde_ziggy::{Parser, TaggedLiteral, Value};
    ///
    /// let parser = Parser::new().preserve_tag("uuid");
    /// assert_eq!(
    ///     parser.parse(r#"@uuid("1234")"#).unwrap(),
    ///     Value::Tagged(TaggedLiteral::new("uuid", "1234"))
    /// );
    /// ```
    #[must_use]
    pub fn preserve_tag(mut self, tag: impl Into<String>) -> Self {
        self.preserved.insert(tag.into());
        self
    }

    /// Sets the nesting depth past which a document is rejected.
    #[must_use]
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Decodes one document.
    ///
    /// Fails with [`Error::Parse`] if the document has any unparseable region; no
    /// partial value is returned. An empty document decodes to [`Value::Null`].
    pub fn parse(&self, source: &str) -> Result<Value> {
        let tree = SyntaxTree::parse_with_max_depth(source, self.max_depth);
        let errors = diagnostics::find_errors(&tree);
        if !errors.is_empty() {
            let diagnostics = diagnostics::diagnose(&errors, source);
            return Err(Error::parse(diagnostics::render(&diagnostics), diagnostics));
        }
        self.interpret(tree.root_node())
    }

    /// Decodes one document from UTF-8 bytes.
    pub fn parse_slice(&self, bytes: &[u8]) -> Result<Value> {
        let source = std::str::from_utf8(bytes)
            .map_err(|e| Error::custom(format!("invalid UTF-8 in document: {}", e)))?;
        self.parse(source)
    }

    /// Decodes one document, then deserializes the value into `T`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde::Deserialize;
    /// use serde_ziggy::Parser;
    ///
    /// #[derive(Deserialize, Debug, PartialEq)]
    /// struct Book { title: String, year: u16 }
    ///
    /// let book: Book = Parser::new()
    ///     .parse_as(r#"Book { .title = "Ruy Blas", .year = 1838 }"#)
    ///     .unwrap();
    /// assert_eq!(book, Book { title: "Ruy Blas".into(), year: 1838 });
    /// ```
    pub fn parse_as<T: DeserializeOwned>(&self, source: &str) -> Result<T> {
        crate::de::from_value(self.parse(source)?)
    }

    /// Interprets one node of an error-free syntax tree.
    pub fn interpret(&self, node: Node<'_>) -> Result<Value> {
        match node.kind() {
            NodeKind::Document => match node.named_child(0) {
                Some(child) => self.interpret(child),
                None => Ok(Value::Null),
            },
            NodeKind::True => Ok(Value::Bool(true)),
            NodeKind::False => Ok(Value::Bool(false)),
            NodeKind::Null => Ok(Value::Null),
            NodeKind::Integer => decode_integer(node.text()).map(Value::Number),
            NodeKind::Float => decode_float(node.text()).map(|f| Value::Number(Number::Float(f))),
            NodeKind::Identifier => Ok(Value::String(node.text().to_string())),
            NodeKind::String => Ok(Value::String(interpret_string(node))),
            NodeKind::QuotedString => Ok(Value::String(interpret_quoted_string(node))),
            NodeKind::TagString => self.interpret_tag_string(node),
            NodeKind::Map => self.interpret_map(node),
            NodeKind::Array => node
                .named_children()
                .map(|child| self.interpret(child))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            NodeKind::Struct | NodeKind::TopLevelStruct => self.interpret_struct(node),
            NodeKind::StructField
            | NodeKind::MapField
            | NodeKind::LineString
            | NodeKind::Error => Err(Error::UnsupportedNode(node.kind().to_string())),
        }
    }

    fn interpret_tag_string(&self, node: Node<'_>) -> Result<Value> {
        let tag = child(node, 0)?.text();
        let payload = interpret_quoted_string(child(node, 1)?);

        if let Some(converter) = self.literals.get(tag) {
            return converter(&payload).map_err(Error::Callback);
        }
        if self.preserved.contains(tag) {
            return Ok(Value::Tagged(TaggedLiteral::new(tag, payload)));
        }
        Ok(Value::String(payload))
    }

    fn interpret_map(&self, node: Node<'_>) -> Result<Value> {
        let mut map = ZiggyMap::with_capacity(node.named_child_count());
        for entry in node.named_children() {
            let key = interpret_quoted_string(field(entry, Field::Key)?);
            let value = self.interpret(field(entry, Field::Value)?)?;
            // Later duplicates overwrite earlier ones.
            map.insert(key, value);
        }
        Ok(Value::Map(map))
    }

    fn interpret_struct(&self, node: Node<'_>) -> Result<Value> {
        let mut fields = ZiggyMap::with_capacity(node.named_child_count());
        for entry in node
            .named_children()
            .filter(|c| c.kind() == NodeKind::StructField)
        {
            let key = field(entry, Field::Key)?.text().to_string();
            let value = self.interpret(field(entry, Field::Value)?)?;
            fields.insert(key, value);
        }

        let Some(name) = node.child_by_field_name(Field::Name) else {
            return Ok(Value::Map(fields));
        };
        let name = name.text();
        match self.structs.get(name) {
            Some(constructor) => constructor(fields).map_err(Error::Callback),
            None => Ok(Value::Struct {
                name: Some(name.to_string()),
                fields,
            }),
        }
    }
}

fn child<'a>(node: Node<'a>, index: usize) -> Result<Node<'a>> {
    node.named_child(index)
        .ok_or_else(|| Error::UnsupportedNode(format!("{} without child {}", node.kind(), index)))
}

fn field<'a>(node: Node<'a>, field: Field) -> Result<Node<'a>> {
    node.child_by_field_name(field).ok_or_else(|| {
        Error::UnsupportedNode(format!("{} without {} field", node.kind(), field.as_str()))
    })
}

fn interpret_string(node: Node<'_>) -> String {
    match node.named_child(0) {
        Some(quoted) if quoted.kind() == NodeKind::QuotedString => interpret_quoted_string(quoted),
        _ => node
            .named_children()
            .map(|line| {
                let text = line.text();
                text.strip_prefix("\\\\").unwrap_or(text)
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn interpret_quoted_string(node: Node<'_>) -> String {
    let text = node.text();
    let inner = text.strip_prefix('"').unwrap_or(text);
    let inner = inner.strip_suffix('"').unwrap_or(inner);
    unescape(inner)
}

/// Decodes `\n \r \t \\ \" \' \xNN \u{N...}`. Unknown escapes are kept as written, and
/// so is `\xNN` above `7f`, which names a raw byte rather than a character.
pub(crate) fn unescape(raw: &str) -> String {
    if !raw.contains('\\') {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(i) = rest.find('\\') {
        out.push_str(&rest[..i]);
        let escape = &rest[i + 1..];
        match decode_escape(escape) {
            Some((c, used)) => {
                out.push(c);
                rest = &escape[used..];
            }
            None => {
                out.push('\\');
                rest = escape;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Decodes the escape following a backslash, returning the char and the bytes consumed.
fn decode_escape(s: &str) -> Option<(char, usize)> {
    let simple = match s.as_bytes().first()? {
        b'n' => '\n',
        b'r' => '\r',
        b't' => '\t',
        b'\\' => '\\',
        b'"' => '"',
        b'\'' => '\'',
        b'x' => {
            let hex = s.get(1..3)?;
            if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            let byte = u8::from_str_radix(hex, 16).ok()?;
            if !byte.is_ascii() {
                return None;
            }
            return Some((char::from(byte), 3));
        }
        b'u' => {
            let end = s.find('}')?;
            let hex = s.get(1..end)?.strip_prefix('{')?;
            if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            let c = char::from_u32(u32::from_str_radix(hex, 16).ok()?)?;
            return Some((c, end + 1));
        }
        _ => return None,
    };
    Some((simple, 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars() {
        let parser = Parser::new();
        assert_eq!(parser.parse("null").unwrap(), Value::Null);
        assert_eq!(parser.parse("").unwrap(), Value::Null);
        assert_eq!(parser.parse("// nothing\n").unwrap(), Value::Null);
        assert_eq!(parser.parse("true").unwrap(), Value::Bool(true));
        assert_eq!(parser.parse("-0x10").unwrap(), Value::from(-16));
        assert_eq!(parser.parse("2.5e3").unwrap(), Value::from(2500.0));
        assert_eq!(
            parser.parse("0xFFFF_FFFF_FFFF_FFFF_FF").unwrap().as_i64(),
            None
        );
    }

    #[test]
    fn test_mixed_array() {
        let value = Parser::new()
            .parse(r#"[1, 2.75, "pi", {"a": 0, "b": 1}]"#)
            .unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items[0], Value::from(1));
        assert_eq!(items[1], Value::from(2.75));
        assert_eq!(items[2], Value::from("pi"));
        let keys: Vec<_> = items[3].as_map().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_top_level_struct_keeps_field_order() {
        let value = Parser::new()
            .parse(".title = \"Ruy Blas\", .author = \"Victor Hugo\"")
            .unwrap();
        assert!(value.is_map());
        let entries: Vec<_> = value
            .as_map()
            .unwrap()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str().unwrap()))
            .collect();
        assert_eq!(entries, vec![("title", "Ruy Blas"), ("author", "Victor Hugo")]);
    }

    #[test]
    fn test_named_struct_with_and_without_constructor() {
        let source = r#"Book { .title = "Ruy Blas", .author = "Victor Hugo" }"#;

        let plain = Parser::new().parse(source).unwrap();
        assert_eq!(plain.struct_name(), Some("Book"));
        assert_eq!(plain.get("author").and_then(Value::as_str), Some("Victor Hugo"));

        let parser = Parser::new().struct_constructor("Book", |fields| {
            let keys: Vec<_> = fields.keys().cloned().collect();
            Ok(Value::from(keys.join("+")))
        });
        assert_eq!(parser.parse(source).unwrap(), Value::from("title+author"));
    }

    #[test]
    fn test_unnamed_struct_is_map() {
        let value = Parser::new().parse("{ .a = 1, .b = [] }").unwrap();
        assert!(value.is_map());
        assert_eq!(value.get("b"), Some(&Value::Array(vec![])));
    }

    #[test]
    fn test_tag_string() {
        let source = r#"@date("2025-10-25T11:34")"#;
        assert_eq!(
            Parser::new().parse(source).unwrap(),
            Value::from("2025-10-25T11:34")
        );

        let parser = Parser::new()
            .preserve_tag("date")
            .literal("date", |s| Ok(Value::from(s.len() as i64)));
        assert_eq!(parser.parse(source).unwrap(), Value::from(16));
    }

    #[test]
    fn test_callback_error_is_not_wrapped() {
        #[derive(Debug)]
        struct Rejected;
        impl fmt::Display for Rejected {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("rejected")
            }
        }
        impl std::error::Error for Rejected {}

        let parser = Parser::new().literal("action", |_| Err(Box::new(Rejected)));
        let err = parser.parse(r#"[@action("ban")]"#).unwrap_err();
        assert_eq!(err.to_string(), "rejected");
        match err {
            Error::Callback(inner) => assert!(inner.downcast_ref::<Rejected>().is_some()),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_map_keys_overwrite() {
        let value = Parser::new().parse(r#"{"a": 1, "b": 2, "a": 3}"#).unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a"), Some(&Value::from(3)));
    }

    #[test]
    fn test_strings() {
        let parser = Parser::new();
        assert_eq!(
            parser.parse(r#""tab\there \"quoted\" \x41\u{e9}""#).unwrap(),
            Value::from("tab\there \"quoted\" Aé")
        );
        assert_eq!(
            parser.parse(r#""keep \q""#).unwrap(),
            Value::from("keep \\q")
        );
        assert_eq!(
            parser.parse(r#""\x7f \xff""#).unwrap(),
            Value::from("\u{7f} \\xff")
        );
        assert_eq!(
            parser.parse("\\\\first line\n\\\\  second\n").unwrap(),
            Value::from("first line\n  second")
        );
        assert_eq!(
            parser.parse("\\\\only one").unwrap(),
            Value::from("only one")
        );
    }

    #[test]
    fn test_parse_error_has_one_diagnostic_per_region() {
        let err = Parser::new().parse("[1, ?, 3,\n  !]").unwrap_err();
        let positions: Vec<_> = err.diagnostics().iter().map(|d| (d.line, d.column)).collect();
        assert_eq!(positions, vec![(1, 5), (2, 3)]);
        assert!(err.to_string().starts_with("Parse error:\nError at line 1, column 5:"));
    }

    #[test]
    fn test_depth_limit() {
        let parser = Parser::new().max_depth(3);
        assert!(parser.parse("[[[1]]]").is_ok());
        assert!(matches!(parser.parse("[[[[1]]]]"), Err(Error::Parse { .. })));
    }

    #[test]
    fn test_error_node_is_unsupported() {
        let tree = SyntaxTree::parse("?");
        let error = tree.root_node().named_child(0).unwrap();
        assert!(matches!(
            Parser::new().interpret(error),
            Err(Error::UnsupportedNode(kind)) if kind == "ERROR"
        ));
    }
}
