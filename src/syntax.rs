//! Concrete syntax tree for Ziggy documents.
//!
//! [`SyntaxTree::parse`] never fails: text it cannot make sense of is wrapped in
//! [`NodeKind::Error`] nodes and parsing carries on after the next `,` or closing
//! delimiter. The tree keeps byte ranges into the source, so every node can hand back its
//! exact text and position. Punctuation is not materialised; `children` and
//! `named_children` are the same list.
//!
//! ```rust
//! use serde_ziggy::syntax::SyntaxTree;
//!
//! let tree = SyntaxTree::parse(r#"Book { .title = "Ruy Blas" }"#);
//! assert_eq!(
//!     tree.root_node().to_sexp(),
//!     "(document (struct name: (identifier) (struct_field key: (identifier) value: (string (quoted_string)))))"
//! );
//! ```

use std::fmt;
use std::ops::Range;

/// Nesting depth past which the remainder of a document is reported as an error.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// The closed set of node types produced by the grammar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    TopLevelStruct,
    Struct,
    StructField,
    Map,
    MapField,
    Array,
    String,
    QuotedString,
    LineString,
    TagString,
    Identifier,
    Integer,
    Float,
    True,
    False,
    Null,
    Error,
}

impl NodeKind {
    /// The grammar name of this node type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            NodeKind::Document => "document",
            NodeKind::TopLevelStruct => "top_level_struct",
            NodeKind::Struct => "struct",
            NodeKind::StructField => "struct_field",
            NodeKind::Map => "map",
            NodeKind::MapField => "map_field",
            NodeKind::Array => "array",
            NodeKind::String => "string",
            NodeKind::QuotedString => "quoted_string",
            NodeKind::LineString => "line_string",
            NodeKind::TagString => "tag_string",
            NodeKind::Identifier => "identifier",
            NodeKind::Integer => "integer",
            NodeKind::Float => "float",
            NodeKind::True => "true",
            NodeKind::False => "false",
            NodeKind::Null => "null",
            NodeKind::Error => "ERROR",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named child slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Key,
    Value,
    Name,
}

impl Field {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Field::Key => "key",
            Field::Value => "value",
            Field::Name => "name",
        }
    }
}

/// A zero-based position: line index and byte offset within that line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Point {
    pub row: usize,
    pub column: usize,
}

#[derive(Debug)]
struct NodeData {
    kind: NodeKind,
    range: Range<usize>,
    children: Vec<usize>,
    fields: Vec<(Field, usize)>,
}

/// A parsed document. Nodes borrow from the tree, and the tree borrows the source.
#[derive(Debug)]
pub struct SyntaxTree<'src> {
    source: &'src str,
    nodes: Vec<NodeData>,
    root: usize,
}

impl<'src> SyntaxTree<'src> {
    /// Parses `source` with the default nesting limit.
    #[must_use]
    pub fn parse(source: &'src str) -> Self {
        Self::parse_with_max_depth(source, DEFAULT_MAX_DEPTH)
    }

    /// Parses `source`, turning everything from the first container nested deeper than
    /// `max_depth` to the end of input into an error node.
    #[must_use]
    pub fn parse_with_max_depth(source: &'src str, max_depth: usize) -> Self {
        let mut builder = Builder {
            src: source,
            pos: 0,
            nodes: Vec::new(),
            depth: 0,
            max_depth,
            aborted: false,
        };
        let root = builder.parse_document();
        SyntaxTree {
            source,
            nodes: builder.nodes,
            root,
        }
    }

    #[must_use]
    pub fn source(&self) -> &'src str {
        self.source
    }

    #[must_use]
    pub fn root_node(&self) -> Node<'_> {
        Node {
            tree: self,
            id: self.root,
        }
    }

    /// Returns `true` if any node in the tree is an error node.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.nodes.iter().any(|n| n.kind == NodeKind::Error)
    }
}

/// A handle to one node of a [`SyntaxTree`].
#[derive(Clone, Copy)]
pub struct Node<'a> {
    tree: &'a SyntaxTree<'a>,
    id: usize,
}

impl<'a> Node<'a> {
    fn data(&self) -> &'a NodeData {
        &self.tree.nodes[self.id]
    }

    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.data().kind
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.kind() == NodeKind::Error
    }

    #[must_use]
    pub fn byte_range(&self) -> Range<usize> {
        self.data().range.clone()
    }

    #[must_use]
    pub fn start_byte(&self) -> usize {
        self.data().range.start
    }

    /// The source text covered by this node.
    #[must_use]
    pub fn text(&self) -> &'a str {
        &self.tree.source[self.data().range.clone()]
    }

    #[must_use]
    pub fn start_point(&self) -> Point {
        let before = &self.tree.source.as_bytes()[..self.start_byte()];
        let row = before.iter().filter(|&&b| b == b'\n').count();
        let line_start = before
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |i| i + 1);
        Point {
            row,
            column: before.len() - line_start,
        }
    }

    pub fn children(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        let tree = self.tree;
        self.data()
            .children
            .iter()
            .map(move |&id| Node { tree, id })
    }

    pub fn named_children(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        self.children()
    }

    #[must_use]
    pub fn named_child_count(&self) -> usize {
        self.data().children.len()
    }

    #[must_use]
    pub fn named_child(&self, index: usize) -> Option<Node<'a>> {
        self.data().children.get(index).map(|&id| Node {
            tree: self.tree,
            id,
        })
    }

    #[must_use]
    pub fn child_by_field_name(&self, field: Field) -> Option<Node<'a>> {
        self.data()
            .fields
            .iter()
            .find(|(f, _)| *f == field)
            .map(|&(_, id)| Node {
                tree: self.tree,
                id,
            })
    }

    /// Renders the subtree as an S-expression of node types, with field labels.
    #[must_use]
    pub fn to_sexp(&self) -> String {
        let mut out = String::new();
        self.write_sexp(&mut out);
        out
    }

    fn write_sexp(&self, out: &mut String) {
        out.push('(');
        out.push_str(self.kind().as_str());
        for child in self.children() {
            out.push(' ');
            if let Some((field, _)) = self.data().fields.iter().find(|(_, id)| *id == child.id) {
                out.push_str(field.as_str());
                out.push_str(": ");
            }
            child.write_sexp(out);
        }
        out.push(')');
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.kind(), self.byte_range())
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Element {
    StructField,
    MapField,
    Value,
}

struct Builder<'src> {
    src: &'src str,
    pos: usize,
    nodes: Vec<NodeData>,
    depth: usize,
    max_depth: usize,
    aborted: bool,
}

impl Builder<'_> {
    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.as_bytes().get(self.pos + offset).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_str(&mut self, s: &str) -> bool {
        if self.src[self.pos..].starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    fn eat_while(&mut self, pred: impl Fn(u8) -> bool) -> usize {
        let start = self.pos;
        while self.peek().map_or(false, &pred) {
            self.pos += 1;
        }
        self.pos - start
    }

    /// Skips whitespace and `//` comments.
    fn skip_trivia(&mut self) {
        loop {
            self.eat_while(|b| b.is_ascii_whitespace());
            if self.src[self.pos..].starts_with("//") {
                self.eat_while(|b| b != b'\n');
            } else {
                break;
            }
        }
    }

    fn push(&mut self, kind: NodeKind, range: Range<usize>, children: Vec<usize>) -> usize {
        self.push_with_fields(kind, range, children, Vec::new())
    }

    fn push_with_fields(
        &mut self,
        kind: NodeKind,
        range: Range<usize>,
        children: Vec<usize>,
        fields: Vec<(Field, usize)>,
    ) -> usize {
        self.nodes.push(NodeData {
            kind,
            range,
            children,
            fields,
        });
        self.nodes.len() - 1
    }

    fn leaf(&mut self, kind: NodeKind, start: usize) -> usize {
        self.push(kind, start..self.pos, Vec::new())
    }

    fn is_sync(&self, closer: Option<u8>) -> bool {
        match self.peek() {
            None => true,
            Some(b',') => true,
            c => closer.is_some() && c == closer,
        }
    }

    /// Wraps everything up to the next `,`, `closer` or end of input in an error node.
    fn recover(&mut self, closer: Option<u8>) -> usize {
        let start = self.pos;
        while !self.is_sync(closer) {
            self.pos += 1;
        }
        self.leaf(NodeKind::Error, start)
    }

    /// Extends a failed construct that began at `start` up to the next sync point.
    fn fail(&mut self, start: usize, closer: Option<u8>) -> usize {
        while !self.is_sync(closer) {
            self.pos += 1;
        }
        self.leaf(NodeKind::Error, start)
    }

    fn abort(&mut self) -> usize {
        let start = self.pos;
        self.pos = self.src.len();
        self.aborted = true;
        self.leaf(NodeKind::Error, start)
    }

    fn parse_document(&mut self) -> usize {
        let mut children = Vec::new();
        self.skip_trivia();
        if self.peek() == Some(b'.') {
            let start = self.pos;
            let fields = self.parse_list(Element::StructField, None);
            let end = self.last_end(&fields, start);
            children.push(self.push(NodeKind::TopLevelStruct, start..end, fields));
        } else if !self.at_end() {
            children.push(self.parse_value());
        }
        self.skip_trivia();
        if !self.at_end() {
            let start = self.pos;
            self.pos = self.src.len();
            children.push(self.leaf(NodeKind::Error, start));
        }
        self.push(NodeKind::Document, 0..self.src.len(), children)
    }

    fn last_end(&self, children: &[usize], start: usize) -> usize {
        children
            .last()
            .map_or(start, |&id| self.nodes[id].range.end)
    }

    /// Parses comma-separated elements until `closer` (or end of input when `None`).
    fn parse_list(&mut self, element: Element, closer: Option<u8>) -> Vec<usize> {
        let mut children = Vec::new();
        loop {
            self.skip_trivia();
            if self.at_end() || (closer.is_some() && self.peek() == closer) {
                break;
            }
            let child = match (element, self.peek()) {
                (Element::StructField, Some(b'.')) => self.parse_struct_field(closer),
                (Element::MapField, Some(b'"')) => self.parse_map_field(closer),
                (Element::Value, _) => self.parse_value(),
                _ => self.recover(closer),
            };
            children.push(child);
            if self.aborted {
                break;
            }
            self.skip_trivia();
            match self.peek() {
                Some(b',') => self.pos += 1,
                None => break,
                c if closer.is_some() && c == closer => break,
                _ => {
                    children.push(self.recover(closer));
                    self.eat(b',');
                }
            }
        }
        children
    }

    /// Consumes `closer`, or records a zero-width error where it was expected.
    fn expect_closer(&mut self, closer: u8, children: &mut Vec<usize>) {
        if !self.eat(closer) && !self.aborted {
            let at = self.pos;
            children.push(self.leaf(NodeKind::Error, at));
        }
    }

    fn enter(&mut self) -> bool {
        self.depth += 1;
        self.depth <= self.max_depth
    }

    fn parse_value(&mut self) -> usize {
        let start = self.pos;
        match self.peek() {
            Some(b'{') => self.parse_braced(start, None),
            Some(b'[') => self.parse_array(),
            Some(b'"') => {
                let quoted = self.parse_quoted_string();
                if self.nodes[quoted].kind == NodeKind::Error {
                    return quoted;
                }
                self.push(NodeKind::String, start..self.pos, vec![quoted])
            }
            Some(b'\\') if self.peek_at(1) == Some(b'\\') => self.parse_multiline_string(),
            Some(b'@') => self.parse_tag_string(),
            Some(b'-') => self.parse_number(),
            Some(b) if b.is_ascii_digit() => self.parse_number(),
            Some(b) if is_identifier_start(b) => self.parse_word(),
            _ => self.parse_unexpected(),
        }
    }

    /// Error node for a character that cannot start a value.
    fn parse_unexpected(&mut self) -> usize {
        let start = self.pos;
        self.eat_while(|b| !b.is_ascii_whitespace() && !matches!(b, b',' | b']' | b'}' | b')'));
        self.leaf(NodeKind::Error, start)
    }

    fn parse_word(&mut self) -> usize {
        let start = self.pos;
        self.eat_while(is_identifier_continue);
        match &self.src[start..self.pos] {
            "true" => self.leaf(NodeKind::True, start),
            "false" => self.leaf(NodeKind::False, start),
            "null" => self.leaf(NodeKind::Null, start),
            _ => {
                let name = self.leaf(NodeKind::Identifier, start);
                self.skip_trivia();
                if self.peek() == Some(b'{') {
                    self.parse_braced(start, Some(name))
                } else {
                    // A bare identifier is not a value; the node is dropped with the error.
                    self.nodes.pop();
                    self.pos = self.nodes_end_or(start);
                    self.leaf(NodeKind::Error, start)
                }
            }
        }
    }

    fn nodes_end_or(&self, start: usize) -> usize {
        start
            + self.src[start..]
                .bytes()
                .take_while(|&b| is_identifier_continue(b))
                .count()
    }

    /// Parses `{ ... }`, deciding between struct and map from the first element.
    fn parse_braced(&mut self, start: usize, name: Option<usize>) -> usize {
        if !self.enter() {
            return self.abort();
        }
        self.pos += 1;
        self.skip_trivia();
        let is_struct = name.is_some() || self.peek() == Some(b'.');

        let (kind, element) = if is_struct {
            (NodeKind::Struct, Element::StructField)
        } else {
            (NodeKind::Map, Element::MapField)
        };
        let mut children: Vec<usize> = name.into_iter().collect();
        children.extend(self.parse_list(element, Some(b'}')));
        self.expect_closer(b'}', &mut children);
        self.depth -= 1;

        let fields = name.map(|id| vec![(Field::Name, id)]).unwrap_or_default();
        self.push_with_fields(kind, start..self.pos, children, fields)
    }

    fn parse_array(&mut self) -> usize {
        let start = self.pos;
        if !self.enter() {
            return self.abort();
        }
        self.pos += 1;
        let mut children = self.parse_list(Element::Value, Some(b']'));
        self.expect_closer(b']', &mut children);
        self.depth -= 1;
        self.push(NodeKind::Array, start..self.pos, children)
    }

    fn parse_struct_field(&mut self, closer: Option<u8>) -> usize {
        let start = self.pos;
        self.pos += 1;
        let key_start = self.pos;
        if self.peek().map_or(true, |b| !is_identifier_start(b)) {
            return self.fail(start, closer);
        }
        self.eat_while(is_identifier_continue);
        let key = self.leaf(NodeKind::Identifier, key_start);
        self.skip_trivia();
        if !self.eat(b'=') {
            self.nodes.pop();
            return self.fail(start, closer);
        }
        self.skip_trivia();
        let value = self.parse_value();
        self.push_with_fields(
            NodeKind::StructField,
            start..self.pos,
            vec![key, value],
            vec![(Field::Key, key), (Field::Value, value)],
        )
    }

    fn parse_map_field(&mut self, closer: Option<u8>) -> usize {
        let start = self.pos;
        let key = self.parse_quoted_string();
        if self.nodes[key].kind == NodeKind::Error {
            self.nodes.pop();
            return self.fail(start, closer);
        }
        self.skip_trivia();
        if !self.eat(b':') {
            self.nodes.pop();
            return self.fail(start, closer);
        }
        self.skip_trivia();
        let value = self.parse_value();
        self.push_with_fields(
            NodeKind::MapField,
            start..self.pos,
            vec![key, value],
            vec![(Field::Key, key), (Field::Value, value)],
        )
    }

    /// Parses `"..."`. Strings end at the first unescaped quote and may not span lines.
    fn parse_quoted_string(&mut self) -> usize {
        let start = self.pos;
        self.pos += 1;
        loop {
            match self.peek() {
                None | Some(b'\n') => return self.leaf(NodeKind::Error, start),
                Some(b'"') => {
                    self.pos += 1;
                    return self.leaf(NodeKind::QuotedString, start);
                }
                Some(b'\\') if self.peek_at(1).map_or(false, |b| b != b'\n') => self.pos += 2,
                Some(_) => self.pos += 1,
            }
        }
    }

    fn parse_multiline_string(&mut self) -> usize {
        let start = self.pos;
        let mut lines = Vec::new();
        let mut end;
        loop {
            let line_start = self.pos;
            self.eat_while(|b| b != b'\n');
            let mut line_end = self.pos;
            if self.src.as_bytes()[line_start..line_end].ends_with(b"\r") {
                line_end -= 1;
            }
            lines.push(self.push(NodeKind::LineString, line_start..line_end, Vec::new()));
            end = line_end;

            self.skip_trivia();
            if !(self.peek() == Some(b'\\') && self.peek_at(1) == Some(b'\\')) {
                break;
            }
        }
        self.push(NodeKind::String, start..end, lines)
    }

    fn parse_tag_string(&mut self) -> usize {
        let start = self.pos;
        self.pos += 1;
        let name_start = self.pos;
        if self.eat_while(is_identifier_continue) == 0
            || !is_identifier_start(self.src.as_bytes()[name_start])
        {
            return self.leaf(NodeKind::Error, start);
        }
        let name = self.leaf(NodeKind::Identifier, name_start);
        if !self.eat(b'(') || self.peek() != Some(b'"') {
            self.nodes.pop();
            return self.leaf(NodeKind::Error, start);
        }
        let payload = self.parse_quoted_string();
        if self.nodes[payload].kind == NodeKind::Error || !self.eat(b')') {
            self.nodes.truncate(name);
            return self.leaf(NodeKind::Error, start);
        }
        self.push_with_fields(
            NodeKind::TagString,
            start..self.pos,
            vec![name, payload],
            vec![(Field::Name, name)],
        )
    }

    fn parse_number(&mut self) -> usize {
        let start = self.pos;
        self.eat(b'-');
        if !self.peek().map_or(false, |b| b.is_ascii_digit()) {
            return self.parse_unexpected_from(start);
        }

        let mut float = false;
        let well_formed = if self.eat_str("0x") {
            let mut ok = self.eat_while(is_hex_digit) > 0;
            if self.peek() == Some(b'.') && self.peek_at(1).map_or(false, |b| b.is_ascii_hexdigit())
            {
                self.pos += 1;
                self.eat_while(is_hex_digit);
                float = true;
            }
            if self.eat(b'p') {
                self.eat_sign();
                ok &= self.eat_while(is_decimal_digit) > 0;
                float = true;
            }
            ok
        } else if self.eat_str("0o") {
            self.eat_while(|b| matches!(b, b'0'..=b'7' | b'_')) > 0
        } else if self.eat_str("0b") {
            self.eat_while(|b| matches!(b, b'0' | b'1' | b'_')) > 0
        } else {
            self.eat_while(is_decimal_digit);
            let mut ok = true;
            if self.peek() == Some(b'.') && self.peek_at(1).map_or(false, |b| b.is_ascii_digit()) {
                self.pos += 1;
                self.eat_while(is_decimal_digit);
                float = true;
            }
            if matches!(self.peek(), Some(b'e' | b'E')) {
                self.pos += 1;
                self.eat_sign();
                ok = self.eat_while(is_decimal_digit) > 0;
                float = true;
            }
            ok
        };

        if !well_formed || self.peek().map_or(false, |b| is_identifier_continue(b) || b == b'.') {
            return self.parse_unexpected_from(start);
        }
        let kind = if float {
            NodeKind::Float
        } else {
            NodeKind::Integer
        };
        self.leaf(kind, start)
    }

    fn parse_unexpected_from(&mut self, start: usize) -> usize {
        self.pos = start;
        self.parse_unexpected()
    }

    fn eat_sign(&mut self) {
        if !self.eat(b'+') {
            self.eat(b'-');
        }
    }
}

fn is_identifier_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_identifier_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_decimal_digit(b: u8) -> bool {
    b.is_ascii_digit() || b == b'_'
}

fn is_hex_digit(b: u8) -> bool {
    b.is_ascii_hexdigit() || b == b'_'
}
