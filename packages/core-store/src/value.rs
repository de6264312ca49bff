//! The Value type - the configuration tree.
//!
//! A dynamically-tagged tree rather than a fixed schema: configuration files
//! are hand-edited and may hold unknown, partial or legacy shapes, all of which
//! must load and survive a save.

use std::collections::BTreeMap;

use crate::json::value_to_json;
use crate::Path;

/// A node in a configuration tree.
///
/// # Design Notes
///
/// - Uses `BTreeMap` so a saved document has a deterministic member order
/// - `Float` only exists so documents written by other tools round-trip;
///   the store itself never produces one
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// Explicit null, or the placeholder of a missing node.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed 64-bit integer.
    Integer(i64),
    /// Integer above `i64::MAX`. Smaller integers are always `Integer`.
    Unsigned(u64),
    /// 64-bit floating point.
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// Ordered sequence of values.
    Array(Vec<Value>),
    /// Key-value map with string keys.
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Create an empty map.
    pub fn map() -> Self {
        Value::Map(BTreeMap::new())
    }

    /// Create an empty array.
    pub fn array() -> Self {
        Value::Array(Vec::new())
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this value is a map.
    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    /// Check if this value is an array.
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(arr) => Some(arr.as_slice()),
            _ => None,
        }
    }

    /// Integer coercion.
    ///
    /// Integers are returned as is (saturating at `i64::MAX`) and floats are
    /// truncated toward zero.
    /// Every other tag yields `0`.
    pub fn as_int(&self) -> i64 {
        match self {
            Value::Integer(i) => *i,
            Value::Unsigned(u) => i64::try_from(*u).unwrap_or(i64::MAX),
            Value::Float(f) => *f as i64,
            Value::Null
            | Value::Bool(_)
            | Value::String(_)
            | Value::Array(_)
            | Value::Map(_) => 0,
        }
    }

    /// Boolean coercion.
    ///
    /// Numbers are true when non-zero and strings when non-empty. Null is
    /// false; containers are true.
    pub fn as_bool(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Integer(i) => *i != 0,
            Value::Unsigned(u) => *u != 0,
            Value::Float(f) => *f != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Map(_) => true,
        }
    }

    /// String form of any node.
    ///
    /// Strings are returned unquoted and null renders as the empty string.
    /// Everything else uses the compact form of the JSON a save would write.
    pub fn to_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => value_to_json(other).to_string(),
        }
    }

    /// Get a reference to a nested value by path.
    ///
    /// Every component is looked up as a map member. Returns `None` as soon as
    /// a member is missing or the current node is not a map; arrays are never
    /// indexed into.
    pub fn get(&self, path: &Path) -> Option<&Value> {
        let mut current = self;
        for component in path.iter() {
            current = current.as_map()?.get(component)?;
        }
        Some(current)
    }

    /// Get a mutable reference to a nested value by path.
    pub fn get_mut(&mut self, path: &Path) -> Option<&mut Value> {
        let mut current = self;
        for component in path.iter() {
            current = match current {
                Value::Map(map) => map.get_mut(component)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Set a value at a path, creating intermediate maps as needed.
    ///
    /// Never fails: any node on the way (this one included) that is not a map
    /// is replaced by an empty map before descending into it. Returns a
    /// reference to the value just written.
    pub fn set(&mut self, path: &Path, value: Value) -> &mut Value {
        let mut current = self;
        for component in path.parent() {
            current = current.ensure_map().entry(component.clone()).or_default();
        }

        let map = current.ensure_map();
        let key = path.last().to_string();
        map.insert(key.clone(), value);
        map.entry(key).or_default()
    }

    fn ensure_map(&mut self) -> &mut BTreeMap<String, Value> {
        if !self.is_map() {
            *self = Value::map();
        }
        match self {
            Value::Map(map) => map,
            _ => unreachable!("value was just replaced with a map"),
        }
    }
}

// Conversion from common types

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        match i64::try_from(v) {
            Ok(i) => Value::Integer(i),
            Err(_) => Value::Unsigned(v),
        }
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::String(v.clone())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(v: BTreeMap<String, Value>) -> Self {
        Value::Map(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;

    fn sample() -> Value {
        let mut value = Value::map();
        value.set(&path!("downloads", "maxspeed"), Value::from(42i64));
        value.set(&path!("downloads", "dir"), Value::from("/srv/music"));
        value.set(
            &path!("users", "buddies"),
            Value::from(vec!["alice", "bob"]),
        );
        value
    }

    #[test]
    fn get_nested_value() {
        let value = sample();
        assert_eq!(
            value.get(&path!("downloads", "maxspeed")),
            Some(&Value::Integer(42))
        );
        assert!(value.get(&path!("downloads")).unwrap().is_map());
        assert_eq!(value.get(&path!("nonexistent")), None);
        assert_eq!(value.get(&path!("downloads", "nope", "deeper")), None);
    }

    #[test]
    fn get_does_not_descend_through_scalars_or_arrays() {
        let value = sample();
        assert_eq!(value.get(&path!("downloads", "maxspeed", "x")), None);
        // Arrays are not indexable by path.
        assert_eq!(value.get(&path!("users", "buddies", "0")), None);
    }

    #[test]
    fn set_creates_intermediate_maps() {
        let mut value = Value::map();
        value.set(&path!("a", "b", "c", "d"), Value::from(42i64));

        assert_eq!(value.get(&path!("a", "b", "c", "d")), Some(&Value::Integer(42)));
        assert!(value.get(&path!("a")).unwrap().is_map());
        assert!(value.get(&path!("a", "b")).unwrap().is_map());
    }

    #[test]
    fn set_replaces_wrong_tagged_intermediates() {
        let mut value = sample();
        value.set(&path!("downloads", "maxspeed", "unit"), Value::from("kB"));
        assert_eq!(
            value.get(&path!("downloads", "maxspeed", "unit")),
            Some(&Value::from("kB"))
        );

        value.set(&path!("users", "buddies", "alice"), Value::from(true));
        assert!(value.get(&path!("users", "buddies")).unwrap().is_map());
    }

    #[test]
    fn set_on_non_map_root_replaces_it() {
        let mut value = Value::Integer(7);
        value.set(&path!("x"), Value::from(1i64));
        assert_eq!(value.get(&path!("x")), Some(&Value::Integer(1)));
    }

    #[test]
    fn set_overwrites_and_keeps_siblings() {
        let mut value = sample();
        *value.set(&path!("downloads", "maxspeed"), Value::from(1i64)) = Value::from(2i64);
        assert_eq!(value.get(&path!("downloads", "maxspeed")), Some(&Value::Integer(2)));
        assert_eq!(
            value.get(&path!("downloads", "dir")),
            Some(&Value::from("/srv/music"))
        );
    }

    #[test]
    fn get_mut_allows_in_place_edit() {
        let mut value = sample();
        if let Some(Value::Array(arr)) = value.get_mut(&path!("users", "buddies")) {
            arr.push(Value::from("carol"));
        }
        assert_eq!(
            value.get(&path!("users", "buddies")),
            Some(&Value::from(vec!["alice", "bob", "carol"]))
        );
        assert!(value.get_mut(&path!("users", "buddies", "alice")).is_none());
    }

    #[test]
    fn int_coercion() {
        assert_eq!(Value::Integer(-3).as_int(), -3);
        assert_eq!(Value::Float(2.9).as_int(), 2);
        assert_eq!(Value::Unsigned(u64::MAX).as_int(), i64::MAX);
        assert_eq!(Value::from("42").as_int(), 0);
        assert_eq!(Value::Bool(true).as_int(), 0);
        assert_eq!(Value::Null.as_int(), 0);
        assert_eq!(Value::map().as_int(), 0);
    }

    #[test]
    fn bool_coercion() {
        assert!(Value::Bool(true).as_bool());
        assert!(!Value::Bool(false).as_bool());
        assert!(Value::Integer(5).as_bool());
        assert!(!Value::Integer(0).as_bool());
        assert!(Value::from("no").as_bool());
        assert!(!Value::from("").as_bool());
        assert!(!Value::Null.as_bool());
    }

    #[test]
    fn text_form() {
        assert_eq!(Value::from("plain").to_text(), "plain");
        assert_eq!(Value::Integer(42).to_text(), "42");
        assert_eq!(Value::Float(1.5).to_text(), "1.5");
        assert_eq!(Value::Bool(false).to_text(), "false");
        assert_eq!(Value::Null.to_text(), "");
        assert_eq!(Value::from(vec![1i64, 2]).to_text(), "[1,2]");

        let mut map = BTreeMap::new();
        map.insert("quote\"d".to_string(), Value::from("a\nb"));
        assert_eq!(Value::Map(map).to_text(), r#"{"quote\"d":"a\nb"}"#);
    }

    #[test]
    fn text_form_matches_saved_spelling() {
        assert_eq!(Value::Unsigned(u64::MAX).to_text(), "18446744073709551615");
        assert_eq!(Value::from(u64::MAX), Value::Unsigned(u64::MAX));
        assert_eq!(Value::from(7u64), Value::Integer(7));

        let big = Value::Float(1.8446744073709552e19);
        assert_eq!(big.to_text(), serde_json::to_string(&value_to_json(&big)).unwrap());
        assert_eq!(Value::Float(f64::NAN).to_text(), "null");
    }
}
