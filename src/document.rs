//! Path-addressable container for semi-structured API payloads.
//!
//! A [`Document`] wraps a JSON object or array and lets callers read and
//! write nested values with dot paths such as `"content.title"`. Every read
//! hands out an owned value: scalars come back as [`Item`] variants and nested
//! objects or arrays come back as fresh `Document`s. Mutating such a view never
//! touches the document it was read from; only [`Document::set`] on the owning
//! document does.
//!
//! # Examples
//!
//! ```
//! use storyblok_mapi::{Document, Item};
//! use serde_json::json;
//!
//! let mut doc = Document::from_value(json!({
//!     "name": "Home",
//!     "content": { "component": "page", "body": [] }
//! }))?;
//!
//! assert_eq!(doc.get_string("content.component", ""), "page");
//! assert_eq!(doc.get("missing.path"), None);
//!
//! doc.set("content.seo.title", "Welcome");
//! assert_eq!(doc.get_string("content.seo.title", ""), "Welcome");
//! # Ok::<(), storyblok_mapi::Error>(())
//! ```

use crate::date;
use crate::record::{Payload, Record};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

/// Separator used by the path-aware accessors unless told otherwise.
pub const DEFAULT_SEPARATOR: &str = ".";

/// A key into a [`Document`].
///
/// Names may contain a separator and then address a nested path. Indices never
/// split and address array positions (or the stringified key on objects).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A field name or separator-delimited path.
    Name(String),
    /// An array position.
    Index(usize),
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(name.to_owned())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(name)
    }
}

impl From<&String> for Key {
    fn from(name: &String) -> Self {
        Key::Name(name.clone())
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Key::Index(index)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Name(name) => f.write_str(name),
            Key::Index(index) => write!(f, "{index}"),
        }
    }
}

/// A value read out of a [`Document`].
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// A stored `null`.
    Null,
    /// A boolean.
    Bool(bool),
    /// A number.
    Number(Number),
    /// A string.
    String(String),
    /// A nested object or array, wrapped as its own document.
    Document(Document),
}

impl Item {
    fn from_value(value: Value) -> Self {
        match value {
            Value::Null => Item::Null,
            Value::Bool(b) => Item::Bool(b),
            Value::Number(n) => Item::Number(n),
            Value::String(s) => Item::String(s),
            nested @ (Value::Object(_) | Value::Array(_)) => Item::Document(Document { data: nested }),
        }
    }

    /// Returns `true` for a stored `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Item::Null)
    }

    /// Returns `true` for scalars (everything except `Null` and `Document`).
    pub fn is_scalar(&self) -> bool {
        matches!(self, Item::Bool(_) | Item::Number(_) | Item::String(_))
    }

    /// Borrows the string if this is a string item.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Item::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrows the nested document if this is one.
    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Item::Document(doc) => Some(doc),
            _ => None,
        }
    }

    /// Coerces a scalar into a string.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Item::String(s) => Some(s.clone()),
            Item::Number(n) => Some(n.to_string()),
            Item::Bool(b) => Some(b.to_string()),
            Item::Null | Item::Document(_) => None,
        }
    }

    /// Coerces a scalar into an integer. Floats truncate toward zero.
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Item::Number(n) => n
                .as_i64()
                .or_else(|| n.as_u64().map(|u| i64::try_from(u).unwrap_or(i64::MAX)))
                .or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
            Item::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            }
            Item::Bool(b) => Some(i64::from(*b)),
            Item::Null | Item::Document(_) => None,
        }
    }

    /// Coerces a scalar into a float.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Item::Number(n) => n.as_f64(),
            Item::String(s) => s.trim().parse::<f64>().ok(),
            Item::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Item::Null | Item::Document(_) => None,
        }
    }

    /// Coerces a scalar into a boolean.
    ///
    /// Numbers are true when non-zero. Strings accept the usual spellings
    /// (`"1"`, `"true"`, `"yes"`, `"on"` and their negatives, plus `""`);
    /// anything else is not a boolean.
    pub fn to_bool(&self) -> Option<bool> {
        match self {
            Item::Bool(b) => Some(*b),
            Item::Number(n) => n.as_f64().map(|f| f != 0.0),
            Item::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Some(true),
                "" | "0" | "false" | "no" | "off" => Some(false),
                _ => None,
            },
            Item::Null | Item::Document(_) => None,
        }
    }

    /// Converts the item back into a raw JSON value.
    pub fn into_value(self) -> Value {
        match self {
            Item::Null => Value::Null,
            Item::Bool(b) => Value::Bool(b),
            Item::Number(n) => Value::Number(n),
            Item::String(s) => Value::String(s),
            Item::Document(doc) => doc.data,
        }
    }
}

impl From<Item> for Value {
    fn from(item: Item) -> Self {
        item.into_value()
    }
}

impl From<&str> for Item {
    fn from(s: &str) -> Self {
        Item::String(s.to_owned())
    }
}

impl From<String> for Item {
    fn from(s: String) -> Self {
        Item::String(s)
    }
}

impl From<bool> for Item {
    fn from(b: bool) -> Self {
        Item::Bool(b)
    }
}

impl From<i64> for Item {
    fn from(n: i64) -> Self {
        Item::Number(n.into())
    }
}

impl From<Document> for Item {
    fn from(doc: Document) -> Self {
        Item::Document(doc)
    }
}

/// A JSON object or array addressable by dot paths.
///
/// Objects keep insertion order. Arrays are exposed with [`Key::Index`] keys
/// and serialize back to arrays, so `Document::from_value(v)?.to_value() == v`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Document {
    data: Value,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates an empty object document.
    pub fn new() -> Self {
        Self {
            data: Value::Object(Map::new()),
        }
    }

    /// Wraps a JSON object or array.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Format`] for scalars and `null`.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(_) | Value::Array(_) => Ok(Self { data: value }),
            other => Err(Error::format(
                "Document",
                format!("expected an object or array, got {}", kind_of(&other)),
            )),
        }
    }

    /// Parses a JSON string into a document.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| Error::format("Document", e.to_string()))?;
        Self::from_value(value)
    }

    /// Reads `key`, splitting names on `"."`.
    ///
    /// Returns `None` when the path does not resolve. A path that resolves to a
    /// stored `null` returns `Some(Item::Null)`.
    pub fn get(&self, key: impl Into<Key>) -> Option<Item> {
        self.get_with_separator(key, DEFAULT_SEPARATOR)
    }

    /// Reads `key`, falling back to `default` when the path does not resolve.
    pub fn get_or(&self, key: impl Into<Key>, default: impl Into<Item>) -> Item {
        self.get(key).unwrap_or_else(|| default.into())
    }

    /// Reads `key`, splitting names on `separator`.
    ///
    /// A name that exists verbatim at the top level wins over its split form,
    /// so a field literally called `"a.b"` stays reachable.
    pub fn get_with_separator(&self, key: impl Into<Key>, separator: &str) -> Option<Item> {
        self.lookup(&key.into(), separator)
            .map(|value| Item::from_value(value.clone()))
    }

    /// Borrows the raw value at `key` without wrapping it.
    pub fn get_value(&self, key: impl Into<Key>) -> Option<&Value> {
        self.lookup(&key.into(), DEFAULT_SEPARATOR)
    }

    fn lookup(&self, key: &Key, separator: &str) -> Option<&Value> {
        match key {
            Key::Index(index) => index_child(&self.data, *index),
            Key::Name(name) => {
                if let Some(value) = child(&self.data, name) {
                    return Some(value);
                }
                if separator.is_empty() || !name.contains(separator) {
                    return None;
                }
                name.split(separator)
                    .try_fold(&self.data, |node, segment| child(node, segment))
            }
        }
    }

    /// Writes `value` at `key`, splitting names on `"."`.
    pub fn set(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> &mut Self {
        self.set_with_separator(key, value, DEFAULT_SEPARATOR)
    }

    /// Writes `value` at `key`, splitting names on `separator`.
    ///
    /// A name that exists verbatim at the top level is overwritten in place,
    /// mirroring [`get_with_separator`](Self::get_with_separator). Missing
    /// intermediate levels are created as empty objects. An existing
    /// intermediate that is not an object or array is replaced by an empty
    /// object, discarding what was there.
    pub fn set_with_separator(
        &mut self,
        key: impl Into<Key>,
        value: impl Into<Value>,
        separator: &str,
    ) -> &mut Self {
        let value = value.into();
        match key.into() {
            Key::Index(index) => *slot(&mut self.data, &index.to_string()) = value,
            Key::Name(name) if separator.is_empty() || !name.contains(separator) => {
                *slot(&mut self.data, &name) = value;
            }
            Key::Name(name) => {
                if let Some(existing) = self.data.get_mut(name.as_str()) {
                    *existing = value;
                    return self;
                }
                let segments: Vec<&str> = name.split(separator).collect();
                if let Some((leaf, parents)) = segments.split_last() {
                    let mut node = &mut self.data;
                    for segment in parents {
                        node = slot(node, segment);
                    }
                    *slot(node, leaf) = value;
                }
            }
        }
        self
    }

    /// Removes a top-level key, returning what was stored there.
    pub fn remove(&mut self, key: impl Into<Key>) -> Option<Item> {
        let removed = match (&mut self.data, key.into()) {
            (Value::Object(map), key) => map.shift_remove(&key.to_string()),
            (Value::Array(items), Key::Index(index)) if index < items.len() => {
                Some(items.remove(index))
            }
            (Value::Array(items), Key::Name(name)) => match name.parse::<usize>() {
                Ok(index) if index < items.len() => Some(items.remove(index)),
                _ => None,
            },
            _ => None,
        };
        removed.map(Item::from_value)
    }

    /// Reads `key` as a string. Non-scalars and `null` yield `default`.
    pub fn get_string(&self, key: impl Into<Key>, default: &str) -> String {
        self.get(key)
            .and_then(|item| item.to_text())
            .unwrap_or_else(|| default.to_owned())
    }

    /// Reads `key` as an integer. Unconvertible values yield `default`.
    pub fn get_int(&self, key: impl Into<Key>, default: i64) -> i64 {
        self.get(key).and_then(|item| item.to_i64()).unwrap_or(default)
    }

    /// Reads `key` as a float. Unconvertible values yield `default`.
    pub fn get_float(&self, key: impl Into<Key>, default: f64) -> f64 {
        self.get(key).and_then(|item| item.to_f64()).unwrap_or(default)
    }

    /// Reads `key` as a boolean. Unconvertible values yield `default`.
    pub fn get_bool(&self, key: impl Into<Key>, default: bool) -> bool {
        self.get(key).and_then(|item| item.to_bool()).unwrap_or(default)
    }

    /// Reads `key` as a nested document. Scalars and missing keys yield `default`.
    pub fn get_array(&self, key: impl Into<Key>, default: Document) -> Document {
        match self.get(key) {
            Some(Item::Document(doc)) => doc,
            _ => default,
        }
    }

    /// Reads `key` as a list of strings, skipping non-scalar entries.
    pub fn get_string_list(&self, key: impl Into<Key>) -> Vec<String> {
        self.get_array(key, Document::new())
            .values()
            .iter()
            .filter_map(Item::to_text)
            .collect()
    }

    /// Reads `key` as a timestamp and renders it with the strftime `format`.
    ///
    /// Values that are not strings, fail to parse, or cannot be rendered with
    /// `format` yield `default`.
    pub fn get_formatted_date_time(
        &self,
        key: impl Into<Key>,
        default: &str,
        format: &str,
    ) -> String {
        match self.get(key) {
            Some(Item::String(raw)) => {
                date::reformat(&raw, format).unwrap_or_else(|| default.to_owned())
            }
            _ => default.to_owned(),
        }
    }

    /// Top-level keys in order.
    pub fn keys(&self) -> Vec<Key> {
        self.iter().map(|(key, _)| key).collect()
    }

    /// Top-level values in order.
    pub fn values(&self) -> Vec<Item> {
        self.iter().map(|(_, item)| item).collect()
    }

    /// Returns `true` if any top-level value equals `value`.
    pub fn has(&self, value: &Value) -> bool {
        match &self.data {
            Value::Object(map) => map.values().any(|v| v == value),
            Value::Array(items) => items.iter().any(|v| v == value),
            _ => false,
        }
    }

    /// Returns `true` if `key` exists verbatim at the top level.
    pub fn has_key(&self, key: impl Into<Key>) -> bool {
        match key.into() {
            Key::Index(index) => index_child(&self.data, index).is_some(),
            Key::Name(name) => child(&self.data, &name).is_some(),
        }
    }

    /// Number of top-level entries.
    pub fn count(&self) -> usize {
        match &self.data {
            Value::Object(map) => map.len(),
            Value::Array(items) => items.len(),
            _ => 0,
        }
    }

    /// Returns `true` if the document has no entries.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Returns `true` if the document wraps a JSON array.
    pub fn is_list(&self) -> bool {
        self.data.is_array()
    }

    /// Iterates top-level entries in insertion order.
    pub fn iter(&self) -> Iter<'_> {
        let inner = match &self.data {
            Value::Object(map) => IterInner::Object(map.iter()),
            Value::Array(items) => IterInner::Array(items.iter().enumerate()),
            _ => IterInner::Empty,
        };
        Iter { inner }
    }

    /// Iterates nested objects wrapped as `R`. Scalar entries are skipped.
    ///
    /// The records are unchecked views; see [`Record::from_document`].
    pub fn iter_as<R: Record>(&self) -> impl Iterator<Item = R> + '_ {
        self.iter().filter_map(|(_, item)| match item {
            Item::Document(doc) => Some(R::from_document(doc)),
            _ => None,
        })
    }

    /// Copies every top-level entry of `other` into `self`, overwriting
    /// existing keys. A list `other`, or a list `self`, is replaced wholesale.
    pub fn merge(&mut self, other: &Document) -> &mut Self {
        match (&mut self.data, &other.data) {
            (Value::Object(mine), Value::Object(theirs)) => {
                for (key, value) in theirs {
                    mine.insert(key.clone(), value.clone());
                }
            }
            (mine, theirs) => *mine = theirs.clone(),
        }
        self
    }

    /// Borrows the underlying JSON value.
    pub fn as_value(&self) -> &Value {
        &self.data
    }

    /// Returns a copy of the underlying JSON value.
    pub fn to_value(&self) -> Value {
        self.data.clone()
    }

    /// Unwraps the underlying JSON value.
    pub fn into_value(self) -> Value {
        self.data
    }

    /// Serializes the document to compact JSON.
    pub fn to_json(&self) -> String {
        self.data.to_string()
    }

    /// Serializes the document to indented JSON.
    pub fn to_pretty_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.data)
            .map_err(|e| Error::SerializationFailed(e.to_string()))
    }
}

impl Payload for Document {
    fn make(raw: Value) -> Result<Self> {
        Document::from_value(raw)
    }
}

impl TryFrom<Value> for Document {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        Document::from_value(value)
    }
}

impl From<Map<String, Value>> for Document {
    fn from(map: Map<String, Value>) -> Self {
        Self {
            data: Value::Object(map),
        }
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        doc.data
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (Key, Item);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the top-level entries of a [`Document`].
pub struct Iter<'a> {
    inner: IterInner<'a>,
}

enum IterInner<'a> {
    Object(serde_json::map::Iter<'a>),
    Array(std::iter::Enumerate<std::slice::Iter<'a, Value>>),
    Empty,
}

impl Iterator for Iter<'_> {
    type Item = (Key, Item);

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            IterInner::Object(entries) => entries
                .next()
                .map(|(key, value)| (Key::Name(key.clone()), Item::from_value(value.clone()))),
            IterInner::Array(entries) => entries
                .next()
                .map(|(index, value)| (Key::Index(index), Item::from_value(value.clone()))),
            IterInner::Empty => None,
        }
    }
}

impl fmt::Debug for Iter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter").finish_non_exhaustive()
    }
}

fn child<'a>(node: &'a Value, segment: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn index_child(node: &Value, index: usize) -> Option<&Value> {
    match node {
        Value::Array(items) => items.get(index),
        Value::Object(map) => map.get(&index.to_string()),
        _ => None,
    }
}

/// Returns a mutable slot for `segment` inside `node`, creating it as `null`.
///
/// Scalars are replaced by an empty object first. Arrays accept an existing
/// index or the next free one; any other segment widens the array into an
/// object keyed by the stringified indices.
fn slot<'a>(node: &'a mut Value, segment: &str) -> &'a mut Value {
    let index = segment.parse::<usize>().ok();

    if let Value::Array(items) = node {
        let fits = matches!(index, Some(i) if i <= items.len());
        if !fits {
            let widened: Map<String, Value> = std::mem::take(items)
                .into_iter()
                .enumerate()
                .map(|(i, value)| (i.to_string(), value))
                .collect();
            *node = Value::Object(widened);
        }
    }

    match node {
        Value::Object(map) => map.entry(segment.to_owned()).or_insert(Value::Null),
        Value::Array(items) => {
            let position = index.unwrap_or(items.len());
            if position == items.len() {
                items.push(Value::Null);
            }
            &mut items[position]
        }
        scalar => {
            *scalar = Value::Object(Map::new());
            slot(scalar, segment)
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
