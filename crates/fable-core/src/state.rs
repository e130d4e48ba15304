//! Nested story state and its flat projection.
//!
//! A [`State`] is a tree of string keys whose leaves are numbers or strings.
//! Expression evaluation never walks the tree directly: it works on the
//! [`FlatState`] projection, where every leaf is addressed by its dot-joined
//! path (`inventory.rope`). [`flatten`] and [`unflatten`] convert between the
//! two and are exact inverses for trees without empty tables and without `.`
//! inside key names.

use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Separator between path segments in a [`FlatState`] key.
pub const PATH_SEPARATOR: char = '.';

/// A leaf value: a number or a string.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// A numeric value. Integral numbers display without a fraction.
    Number(f64),
    /// A text value.
    Text(String),
}

impl Scalar {
    /// Turn text into a number when it prints back identically as one.
    ///
    /// `"3"` and `"1.5"` become numbers, `"1.50"`, `"03"` and `"apple"` stay text.
    pub fn coerce(text: impl Into<String>) -> Self {
        let text = text.into();
        match text.parse::<f64>() {
            Ok(n) if n.is_finite() && format_number(n) == text => Self::Number(n),
            _ => Self::Text(text),
        }
    }

    /// The numeric value, parsing text if it looks like a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }

    /// The text value, if this is a string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }
}

/// Format a number the way story authors expect to read it: `3`, `0.5`, `-2`.
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        // Avoid printing negative zero.
        return "0".to_string();
    }
    format!("{n}")
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", format_number(*n)),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Scalar {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            // Integral numbers are written as JSON integers so `3` stays `3`.
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => {
                serializer.serialize_i64(*n as i64)
            }
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ScalarVisitor;

        impl Visitor<'_> for ScalarVisitor {
            type Value = Scalar;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a number or a string")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Scalar, E> {
                Ok(Scalar::Text(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Scalar, E> {
                Ok(Scalar::Number(v as f64))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Scalar, E> {
                Ok(Scalar::Number(v as f64))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Scalar, E> {
                Ok(Scalar::Number(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Scalar, E> {
                Ok(Scalar::Text(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Scalar, E> {
                Ok(Scalar::Text(v))
            }
        }

        deserializer.deserialize_any(ScalarVisitor)
    }
}

/// A value in the state tree: a leaf or a nested table.
///
/// Arrays deserialize into tables keyed by position (`"0"`, `"1"`, ...), so
/// `{fruits: ["apple", "pear"]}` flattens to `fruits.0` and `fruits.1`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// A number or string leaf.
    Scalar(Scalar),
    /// A nested table of further values.
    Table(State),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Scalar(Scalar),
    Table(State),
    List(Vec<Value>),
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawValue::deserialize(deserializer)? {
            RawValue::Scalar(scalar) => Self::Scalar(scalar),
            RawValue::Table(table) => Self::Table(table),
            RawValue::List(items) => Self::Table(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| (i.to_string(), item))
                    .collect(),
            ),
        })
    }
}

impl<T: Into<Scalar>> From<T> for Value {
    fn from(v: T) -> Self {
        Self::Scalar(v.into())
    }
}

impl From<State> for Value {
    fn from(state: State) -> Self {
        Self::Table(state)
    }
}

/// The nested story state. Keys keep their declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(IndexMap<String, Value>);

impl State {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for constructing literal states.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a top-level value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Look up a top-level value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Remove a top-level value, keeping the order of the remaining keys.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    /// Whether a top-level key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Iterate over top-level entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Top-level keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Number of top-level entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the state has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolve a dot-joined path to a leaf.
    pub fn lookup(&self, path: &str) -> Option<&Scalar> {
        let mut segments = path.split(PATH_SEPARATOR);
        let first = segments.next()?;
        let mut current = self.0.get(first)?;
        for segment in segments {
            match current {
                Value::Table(table) => current = table.0.get(segment)?,
                Value::Scalar(_) => return None,
            }
        }
        match current {
            Value::Scalar(scalar) => Some(scalar),
            Value::Table(_) => None,
        }
    }

    /// Flat projection of this state.
    pub fn flatten(&self) -> FlatState {
        flatten(self)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for State {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// The flat projection of a [`State`]: dot-joined path to leaf value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlatState(IndexMap<String, Scalar>);

impl FlatState {
    /// Create an empty flat state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, path: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.insert(path, value);
        self
    }

    /// Set a path. Existing paths keep their position, new ones are appended.
    pub fn insert(&mut self, path: impl Into<String>, value: impl Into<Scalar>) -> Option<Scalar> {
        self.0.insert(path.into(), value.into())
    }

    /// Look up a path.
    pub fn get(&self, path: &str) -> Option<&Scalar> {
        self.0.get(path)
    }

    /// Remove a path, keeping the order of the remaining ones.
    pub fn remove(&mut self, path: &str) -> Option<Scalar> {
        self.0.shift_remove(path)
    }

    /// Whether a path is present.
    pub fn contains_key(&self, path: &str) -> bool {
        self.0.contains_key(path)
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Scalar)> {
        self.0.iter()
    }

    /// Paths in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Number of leaves.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no leaves.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Right-biased overlay: every entry of `other` replaces or extends `self`.
    pub fn overlay(&mut self, other: &FlatState) {
        for (path, value) in &other.0 {
            self.0.insert(path.clone(), value.clone());
        }
    }

    /// Rebuild the nested state.
    pub fn unflatten(&self) -> State {
        unflatten(self)
    }
}

impl<K: Into<String>, V: Into<Scalar>> FromIterator<(K, V)> for FlatState {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for FlatState {
    type Item = (String, Scalar);
    type IntoIter = indexmap::map::IntoIter<String, Scalar>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Depth-first walk of the tree, joining keys with [`PATH_SEPARATOR`].
pub fn flatten(state: &State) -> FlatState {
    let mut flat = FlatState::new();
    flatten_into(state, None, &mut flat);
    flat
}

fn flatten_into(state: &State, prefix: Option<&str>, flat: &mut FlatState) {
    for (key, value) in state.iter() {
        let path = match prefix {
            Some(prefix) => format!("{prefix}{PATH_SEPARATOR}{key}"),
            None => key.clone(),
        };
        match value {
            Value::Scalar(scalar) => {
                flat.insert(path, scalar.clone());
            }
            Value::Table(table) => flatten_into(table, Some(&path), flat),
        }
    }
}

/// Rebuild a tree from dot-joined paths.
///
/// Intermediate tables are created as needed. When a path needs a table where
/// a leaf already sits, the later path wins.
pub fn unflatten(flat: &FlatState) -> State {
    let mut state = State::new();
    for (path, value) in flat.iter() {
        let segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
        insert_path(&mut state, &segments, value.clone());
    }
    state
}

fn insert_path(state: &mut State, segments: &[&str], value: Scalar) {
    match segments {
        [] => {}
        [last] => {
            state.0.insert((*last).to_string(), Value::Scalar(value));
        }
        [head, rest @ ..] => {
            let entry = state
                .0
                .entry((*head).to_string())
                .or_insert_with(|| Value::Table(State::new()));
            if !matches!(entry, Value::Table(_)) {
                *entry = Value::Table(State::new());
            }
            if let Value::Table(inner) = entry {
                insert_path(inner, rest, value);
            }
        }
    }
}

/// Overlay `b` on `a` in flat space and rebuild the tree.
pub fn merge(a: &State, b: &State) -> State {
    let mut flat = flatten(a);
    flat.overlay(&flatten(b));
    unflatten(&flat)
}
