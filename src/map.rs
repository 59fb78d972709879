//! Ordered map type for Brack maps.
//!
//! This module provides [`ValueMap`], a wrapper around [`IndexMap`] that
//! maintains insertion order for map entries. Brack maps preserve the order
//! entries were written in, and the printer emits them back in that order, so
//! parse → print is entry-order stable.
//!
//! Keys are [`Key`] rather than `String`: Brack allows any scalar as a map
//! key, and keys compare numerically, so an entry inserted under `1` is found
//! under `1.0`.
//!
//! ## Examples
//!
//! ```rust
//! use brack::{Key, Value, ValueMap};
//!
//! let mut map = ValueMap::new();
//! map.insert(Key::from("name"), Value::from("Alice"));
//! map.insert(Key::from("age"), Value::from(30));
//!
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.get_str("name").and_then(|v| v.as_str()), Some("Alice"));
//! ```

use crate::{Key, Value};
use indexmap::IndexMap;

/// An insertion-ordered map of scalar keys to Brack values.
///
/// # Examples
///
/// ```rust
/// use brack::{Key, Value, ValueMap};
///
/// let mut map = ValueMap::new();
/// map.insert(Key::from("first"), Value::from(1));
/// map.insert(Key::from("second"), Value::from(2));
///
/// // Iteration maintains insertion order
/// let keys: Vec<_> = map.keys().map(|k| k.to_string()).collect();
/// assert_eq!(keys, vec!["first", "second"]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValueMap(IndexMap<Key, Value>);

impl ValueMap {
    /// Creates an empty `ValueMap`.
    #[must_use]
    pub fn new() -> Self {
        ValueMap(IndexMap::new())
    }

    /// Creates an empty `ValueMap` with the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        ValueMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map already contained this key, the old value is returned and
    /// the entry keeps its original position.
    pub fn insert(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use brack::{Key, Value, ValueMap};
    ///
    /// let mut map = ValueMap::new();
    /// map.insert(Key::from(1), Value::from("one"));
    /// // Keys compare numerically, so 1.0 finds the entry keyed by 1.
    /// assert_eq!(map.get(&Key::from(1.0)).and_then(|v| v.as_str()), Some("one"));
    /// ```
    #[must_use]
    pub fn get(&self, key: &Key) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns a reference to the value under a string key.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&Value> {
        self.0.get(&Key::from(key))
    }

    /// Returns `true` if the map contains the key.
    #[must_use]
    pub fn contains_key(&self, key: &Key) -> bool {
        self.0.contains_key(key)
    }

    /// Removes the entry for the key, preserving the order of the remaining
    /// entries, and returns its value.
    pub fn shift_remove(&mut self, key: &Key) -> Option<Value> {
        self.0.shift_remove(key)
    }

    /// Returns the number of entries in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the keys of the map, in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, Key, Value> {
        self.0.keys()
    }

    /// Returns an iterator over the values of the map, in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, Key, Value> {
        self.0.values()
    }

    /// Returns an iterator over the entries of the map, in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, Key, Value> {
        self.0.iter()
    }
}

impl IntoIterator for ValueMap {
    type Item = (Key, Value);
    type IntoIter = indexmap::map::IntoIter<Key, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValueMap {
    type Item = (&'a Key, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, Key, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(Key, Value)> for ValueMap {
    fn from_iter<T: IntoIterator<Item = (Key, Value)>>(iter: T) -> Self {
        ValueMap(IndexMap::from_iter(iter))
    }
}
