//! Configuration options for Ziggy serialization.
//!
//! - [`ZiggyOptions`]: indentation unit, type-name emission, nesting limit and the
//!   serialization-function registry
//! - [`SerializationFunctions`]: per-type functions that render a value as a tagged
//!   literal (or a plain string) instead of structurally
//!
//! ## Examples
//!
//! ```rust
//! use serde::Serialize;
//! use serde_ziggy::{to_string_with_options, ZiggyOptions};
//!
//! #[derive(Serialize)]
//! struct Point { x: i32, y: i32 }
//!
//! let options = ZiggyOptions::new().with_indent("\t").with_type_name(true);
//! let text = to_string_with_options(&Point { x: 1, y: 2 }, options).unwrap();
//! assert_eq!(text, "Point {\n\t.x = 1,\n\t.y = 2,\n}");
//! ```

use crate::error::BoxError;
use crate::syntax::DEFAULT_MAX_DEPTH;
use crate::value::{MULTILINE_TOKEN, QUOTED_TOKEN};
use crate::{Error, Result, TaggedLiteral, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Produces the payload string for a value of a registered type.
pub type SerializeFn = dyn Fn(&Value) -> std::result::Result<String, BoxError> + Send + Sync;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StringStyle {
    /// Multiline when the text has a newline, quoted otherwise.
    Auto,
    Quoted,
    Multiline,
}

#[derive(Clone)]
enum Render {
    Tag(String),
    Text(StringStyle),
}

#[derive(Clone)]
struct Entry {
    render: Render,
    func: Arc<SerializeFn>,
}

/// Registry of serialization functions, keyed by serde type name.
///
/// The type name is the one serde reports: the struct or enum identifier as written in
/// Rust (`#[serde(rename = "...")]` applies). A registered function receives the value
/// as it would otherwise have been serialized, which for enums is the externally tagged
/// form (`{"Variant": value}`) or the variant name of a unit variant.
///
/// # Examples
///
/// ```rust
/// use serde::Serialize;
/// use serde_ziggy::{to_string_with_options, SerializationFunctions, ZiggyOptions};
///
/// #[derive(Serialize)]
/// enum Action { Send, Clear }
///
/// let functions = SerializationFunctions::new().register("Action", "user_action", |v| {
///     Ok(v.as_str().unwrap_or_default().to_lowercase())
/// });
/// let options = ZiggyOptions::new().with_functions(functions);
/// let text = to_string_with_options(&Action::Send, options).unwrap();
/// assert_eq!(text, r#"@user_action("send")"#);
/// ```
#[derive(Clone, Default)]
pub struct SerializationFunctions {
    entries: Arc<HashMap<String, Entry>>,
}

impl SerializationFunctions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders values of `type_name` as `@tag("payload")`.
    #[must_use]
    pub fn register<F>(self, type_name: impl Into<String>, tag: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value) -> std::result::Result<String, BoxError> + Send + Sync + 'static,
    {
        self.insert(type_name.into(), Render::Tag(tag.into()), Arc::new(f))
    }

    /// Renders values of `type_name` as a plain string, quoted or multiline.
    #[must_use]
    pub fn register_string<F>(self, type_name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value) -> std::result::Result<String, BoxError> + Send + Sync + 'static,
    {
        self.insert(type_name.into(), Render::Text(StringStyle::Auto), Arc::new(f))
    }

    /// Renders values of `type_name` as a quoted string, even when it spans lines.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde::Serialize;
    /// use serde_ziggy::{to_string_with_options, SerializationFunctions, ZiggyOptions};
    ///
    /// #[derive(Serialize)]
    /// struct Address { street: String, city: String }
    ///
    /// let functions = SerializationFunctions::new().register_quoted("Address", |v| {
    ///     let field = |k| v.get(k).and_then(|f| f.as_str()).unwrap_or_default();
    ///     Ok(format!("{}\n{}", field("street"), field("city")))
    /// });
    /// let options = ZiggyOptions::new().with_functions(functions);
    /// let address = Address { street: "1 Main St".into(), city: "Springfield".into() };
    /// let text = to_string_with_options(&address, options).unwrap();
    /// assert_eq!(text, r#""1 Main St\nSpringfield""#);
    /// ```
    #[must_use]
    pub fn register_quoted<F>(self, type_name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value) -> std::result::Result<String, BoxError> + Send + Sync + 'static,
    {
        self.insert(type_name.into(), Render::Text(StringStyle::Quoted), Arc::new(f))
    }

    /// Renders values of `type_name` as `\\`-prefixed lines, even when the text has a
    /// single line.
    ///
    /// Text holding control characters other than newline and tab cannot be written as
    /// lines and falls back to a quoted string.
    #[must_use]
    pub fn register_multiline<F>(self, type_name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value) -> std::result::Result<String, BoxError> + Send + Sync + 'static,
    {
        self.insert(type_name.into(), Render::Text(StringStyle::Multiline), Arc::new(f))
    }

    fn insert(mut self, type_name: String, render: Render, func: Arc<SerializeFn>) -> Self {
        Arc::make_mut(&mut self.entries).insert(type_name, Entry { render, func });
        self
    }

    #[must_use]
    pub fn contains(&self, type_name: &str) -> bool {
        self.entries.contains_key(type_name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Applies the function registered for `type_name`, if any.
    ///
    /// Returns `Ok(None)` when the type is not registered. With `keep_layout`, strings
    /// registered with a fixed layout come back wrapped in a private tag that the text
    /// writer unwraps.
    pub(crate) fn apply(
        &self,
        type_name: &str,
        value: &Value,
        keep_layout: bool,
    ) -> Result<Option<Value>> {
        let Some(entry) = self.entries.get(type_name) else {
            return Ok(None);
        };
        let payload = (entry.func)(value).map_err(Error::Callback)?;
        Ok(Some(match &entry.render {
            Render::Tag(tag) => Value::Tagged(TaggedLiteral::new(tag.as_str(), payload)),
            Render::Text(StringStyle::Quoted) if keep_layout => {
                Value::Tagged(TaggedLiteral::new(QUOTED_TOKEN, payload))
            }
            Render::Text(StringStyle::Multiline) if keep_layout => {
                Value::Tagged(TaggedLiteral::new(MULTILINE_TOKEN, payload))
            }
            Render::Text(_) => Value::String(payload),
        }))
    }
}

impl fmt::Debug for SerializationFunctions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|(name, entry)| {
                let tag = match &entry.render {
                    Render::Tag(tag) => Some(tag.as_str()),
                    Render::Text(_) => None,
                };
                (name.as_str(), tag)
            })
            .collect();
        entries.sort();
        f.debug_map().entries(entries).finish()
    }
}

/// Configuration options for Ziggy serialization.
///
/// # Examples
///
/// ```rust
/// use serde_ziggy::ZiggyOptions;
///
/// let options = ZiggyOptions::new();
/// assert_eq!(options.indent, "    ");
/// assert!(!options.with_type_name);
///
/// let options = ZiggyOptions::new().with_indent("  ").with_max_depth(16);
/// assert_eq!(options.max_depth, 16);
/// ```
#[derive(Clone, Debug)]
pub struct ZiggyOptions {
    /// Indentation unit, repeated once per nesting level.
    pub indent: String,
    /// Whether named structs are written with their type name before the body.
    pub with_type_name: bool,
    pub functions: SerializationFunctions,
    pub max_depth: usize,
}

impl Default for ZiggyOptions {
    fn default() -> Self {
        ZiggyOptions {
            indent: "    ".to_string(),
            with_type_name: false,
            functions: SerializationFunctions::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ZiggyOptions {
    /// Creates default options: four-space indent, no type names, no functions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    #[must_use]
    pub fn with_type_name(mut self, with_type_name: bool) -> Self {
        self.with_type_name = with_type_name;
        self
    }

    #[must_use]
    pub fn with_functions(mut self, functions: SerializationFunctions) -> Self {
        self.functions = functions;
        self
    }

    /// Registers one serialization function; see [`SerializationFunctions::register`].
    #[must_use]
    pub fn with_function<F>(
        mut self,
        type_name: impl Into<String>,
        tag: impl Into<String>,
        f: F,
    ) -> Self
    where
        F: Fn(&Value) -> std::result::Result<String, BoxError> + Send + Sync + 'static,
    {
        self.functions = self.functions.register(type_name, tag, f);
        self
    }

    /// Sets the nesting depth past which serialization fails.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_is_copy_on_write() {
        let base = SerializationFunctions::new().register("A", "a", |_| Ok(String::new()));
        let extended = base.clone().register_string("B", |_| Ok(String::new()));
        assert_eq!(base.len(), 1);
        assert_eq!(extended.len(), 2);
        assert!(extended.contains("B") && !base.contains("B"));
    }

    #[test]
    fn test_apply() {
        let functions = SerializationFunctions::new()
            .register("Stamp", "timestamp", |v| Ok(v.as_i64().unwrap_or_default().to_string()))
            .register_string("Name", |_| Ok("anonymous".to_string()));

        let tagged = functions.apply("Stamp", &Value::from(12), false).unwrap();
        assert_eq!(tagged, Some(Value::Tagged(TaggedLiteral::new("timestamp", "12"))));
        let plain = functions.apply("Name", &Value::Null, true).unwrap();
        assert_eq!(plain, Some(Value::from("anonymous")));
        assert!(functions.apply("Other", &Value::Null, false).unwrap().is_none());
    }

    #[test]
    fn test_fixed_layout_only_survives_for_the_writer() {
        let functions = SerializationFunctions::new()
            .register_quoted("Q", |_| Ok("a\nb".to_string()))
            .register_multiline("M", |_| Ok("line".to_string()));

        assert_eq!(
            functions.apply("Q", &Value::Null, false).unwrap(),
            Some(Value::from("a\nb"))
        );
        assert_eq!(
            functions.apply("Q", &Value::Null, true).unwrap(),
            Some(Value::Tagged(TaggedLiteral::new(QUOTED_TOKEN, "a\nb")))
        );
        assert_eq!(
            functions.apply("M", &Value::Null, true).unwrap(),
            Some(Value::Tagged(TaggedLiteral::new(MULTILINE_TOKEN, "line")))
        );
        assert_eq!(
            format!("{:?}", functions),
            r#"{"M": None, "Q": None}"#
        );
    }

    #[test]
    fn test_debug_lists_types_and_tags() {
        let functions = SerializationFunctions::new()
            .register("B", "b", |_| Ok(String::new()))
            .register_string("A", |_| Ok(String::new()));
        assert_eq!(format!("{:?}", functions), r#"{"A": None, "B": Some("b")}"#);
    }
}
