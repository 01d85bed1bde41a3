//! Property system for node, edge and store metadata.
//!
//! Provides tagged property values, insertion-ordered maps with a builder
//! pattern, and the merge semantics shared by every property-bearing entity.

use crate::error::{GraphError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Strongly-typed property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    /// String value
    String(String),
    /// Integer value
    Int(i64),
    /// Floating point value (weights, distances, scores)
    Float(f64),
    /// Boolean flag
    Bool(bool),
    /// List of strings (tags, labels)
    StringList(Vec<String>),
    /// List of integers
    IntList(Vec<i64>),
    /// Explicit null/absence of value
    Null,
}

impl PropertyValue {
    /// Numeric view of the value, if it has one.
    ///
    /// Integers are widened to `f64`; every other variant yields `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Int(i) => Some(*i as f64),
            PropertyValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Borrow the value as a string slice if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Int(value as i64)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Float(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(value: Vec<String>) -> Self {
        PropertyValue::StringList(value)
    }
}

impl From<Vec<i64>> for PropertyValue {
    fn from(value: Vec<i64>) -> Self {
        PropertyValue::IntList(value)
    }
}

/// String-keyed property map.
///
/// Keys keep their insertion order. Every getter on nodes, edges and the store
/// hands out a clone, so callers can never reach the internal map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyMap {
    data: IndexMap<String, PropertyValue>,
}

impl PropertyMap {
    /// Create a new empty property map.
    pub fn new() -> Self {
        Self {
            data: IndexMap::new(),
        }
    }

    /// Builder pattern: add a property and return self.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Insert a property value, returning the previous one.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Option<PropertyValue> {
        self.data.insert(key.into(), value.into())
    }

    /// Get a property value by key.
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.data.get(key)
    }

    /// Remove a property by key.
    ///
    /// Preserves the order of the remaining keys.
    pub fn remove(&mut self, key: &str) -> Option<PropertyValue> {
        self.data.shift_remove(key)
    }

    /// Check if a property exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Get the number of properties.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the property map is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate over all properties in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &PropertyValue)> {
        self.data.iter()
    }

    /// Iterate over all keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    /// Merge `other` into this map; keys in `other` win.
    pub fn merge(&mut self, other: &PropertyMap) {
        for (key, value) in other.iter() {
            self.data.insert(key.clone(), value.clone());
        }
    }

    /// Reject maps containing an empty key.
    pub fn validate(&self) -> Result<()> {
        self.keys().try_for_each(|key| validate_key(key))
    }

    /// Type-safe getter for string properties.
    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.data.get(key) {
            Some(PropertyValue::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Type-safe getter for integer properties.
    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.data.get(key) {
            Some(PropertyValue::Int(i)) => Some(*i),
            _ => None,
        }
    }

    /// Type-safe getter for float properties.
    pub fn get_float(&self, key: &str) -> Option<f64> {
        match self.data.get(key) {
            Some(PropertyValue::Float(f)) => Some(*f),
            _ => None,
        }
    }

    /// Type-safe getter for boolean properties.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.data.get(key) {
            Some(PropertyValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// Type-safe getter for string list properties.
    pub fn get_string_list(&self, key: &str) -> Option<&[String]> {
        match self.data.get(key) {
            Some(PropertyValue::StringList(list)) => Some(list),
            _ => None,
        }
    }

    /// Type-safe getter for integer list properties.
    pub fn get_int_list(&self, key: &str) -> Option<&[i64]> {
        match self.data.get(key) {
            Some(PropertyValue::IntList(list)) => Some(list),
            _ => None,
        }
    }
}

/// Property keys must be non-empty.
pub(crate) fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(GraphError::invalid_argument("property key must not be empty"));
    }
    Ok(())
}

impl FromIterator<(String, PropertyValue)> for PropertyMap {
    fn from_iter<T: IntoIterator<Item = (String, PropertyValue)>>(iter: T) -> Self {
        Self {
            data: IndexMap::from_iter(iter),
        }
    }
}

impl IntoIterator for PropertyMap {
    type Item = (String, PropertyValue);
    type IntoIter = indexmap::map::IntoIter<String, PropertyValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}
