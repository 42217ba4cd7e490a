//! Ordered map type for Ziggy maps and struct fields.
//!
//! [`ZiggyMap`] wraps an [`IndexMap`] so that fields come back out in the order they were
//! read from a document or declared on a Rust struct. Order is kept for output stability;
//! two maps with the same entries in a different order still compare equal.
//!
//! ## Examples
//!
//! ```rust
//! use serde_ziggy::{ZiggyMap, Value};
//!
//! let mut map = ZiggyMap::new();
//! map.insert("title".to_string(), Value::from("Ruy Blas"));
//! map.insert("author".to_string(), Value::from("Victor Hugo"));
//!
//! let keys: Vec<_> = map.keys().cloned().collect();
//! assert_eq!(keys, vec!["title", "author"]);
//! ```

use indexmap::IndexMap;
use std::collections::HashMap;

/// An ordered map of string keys to Ziggy values.
#[derive(Debug, Clone, PartialEq)]
pub struct ZiggyMap(IndexMap<String, crate::Value>);

impl ZiggyMap {
    #[must_use]
    pub fn new() -> Self {
        ZiggyMap(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        ZiggyMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair into the map.
    ///
    /// An existing key keeps its position and has its value replaced; the old value is
    /// returned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_ziggy::{ZiggyMap, Value};
    ///
    /// let mut map = ZiggyMap::new();
    /// assert!(map.insert("key".to_string(), Value::from(42)).is_none());
    /// assert!(map.insert("key".to_string(), Value::from(43)).is_some());
    /// assert_eq!(map.get("key").and_then(|v| v.as_i64()), Some(43));
    /// ```
    pub fn insert(&mut self, key: String, value: crate::Value) -> Option<crate::Value> {
        self.0.insert(key, value)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&crate::Value> {
        self.0.get(key)
    }

    /// Removes a key, keeping the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<crate::Value> {
        self.0.shift_remove(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the keys of the map, in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, crate::Value> {
        self.0.keys()
    }

    /// Returns an iterator over the values of the map, in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, String, crate::Value> {
        self.0.values()
    }

    /// Returns an iterator over the key-value pairs of the map, in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, crate::Value> {
        self.0.iter()
    }
}

impl Default for ZiggyMap {
    fn default() -> Self {
        Self::new()
    }
}

impl From<HashMap<String, crate::Value>> for ZiggyMap {
    fn from(map: HashMap<String, crate::Value>) -> Self {
        ZiggyMap(map.into_iter().collect())
    }
}

impl From<ZiggyMap> for HashMap<String, crate::Value> {
    fn from(map: ZiggyMap) -> Self {
        map.0.into_iter().collect()
    }
}

impl IntoIterator for ZiggyMap {
    type Item = (String, crate::Value);
    type IntoIter = indexmap::map::IntoIter<String, crate::Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ZiggyMap {
    type Item = (&'a String, &'a crate::Value);
    type IntoIter = indexmap::map::Iter<'a, String, crate::Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, crate::Value)> for ZiggyMap {
    fn from_iter<T: IntoIterator<Item = (String, crate::Value)>>(iter: T) -> Self {
        ZiggyMap(IndexMap::from_iter(iter))
    }
}
