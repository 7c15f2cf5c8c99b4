//! Typed views over [`Document`]s and the factory contract responses use.
//!
//! Anything an [`ApiResponse`](crate::ApiResponse) can decode into implements
//! [`Payload`], which has two factory forms: [`Payload::make`] for the raw
//! fields and [`Payload::make_from_response`] for the full decoded body. The
//! second form defaults to the first, so a type only overrides it when its
//! payload arrives nested under an envelope key.
//!
//! Resource types implement [`Record`] and get `Payload` for free: the
//! response form strips the envelope (`{"story": {...}}`), and `make` builds
//! the record from its mandatory fields, copies the remaining fields back on
//! and checks validity. [`Collection`] does the same for list envelopes
//! (`{"stories": [...]}`).

use crate::document::{Document, Item};
use crate::{Error, Result};
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;

/// A type a decoded response body can be turned into.
pub trait Payload: Sized {
    /// Builds the payload from its raw fields.
    fn make(raw: Value) -> Result<Self>;

    /// Builds the payload from a full decoded response body.
    fn make_from_response(body: Value) -> Result<Self> {
        Self::make(body)
    }
}

/// A resource-specific view over a [`Document`].
pub trait Record: Sized {
    /// Human readable resource name used in errors, e.g. `"Story"`.
    const RESOURCE: &'static str;

    /// Key a single record is nested under in response bodies, e.g. `"story"`.
    /// `None` when the API returns the record bare.
    const ENVELOPE_KEY: Option<&'static str>;

    /// Key a list of records is nested under, e.g. `"stories"`.
    const COLLECTION_KEY: &'static str;

    /// Builds a record from the mandatory fields of `document`.
    ///
    /// Only the fields the concrete constructor takes are read; [`make_record`]
    /// copies the rest afterwards.
    fn construct(document: &Document) -> Self;

    /// Wraps `document` without checking it.
    ///
    /// Used for collection elements and documents that already passed through
    /// [`Payload::make`]. A record built this way is never validated.
    fn from_document(document: Document) -> Self;

    /// Borrows the backing document.
    fn document(&self) -> &Document;

    /// Mutably borrows the backing document.
    fn document_mut(&mut self) -> &mut Document;

    /// Returns `true` if the mandatory fields are present.
    fn is_valid(&self) -> bool {
        true
    }

    /// Returns the raw fields.
    fn to_value(&self) -> Value {
        self.document().to_value()
    }

    /// Reads a field of the backing document.
    fn get(&self, key: &str) -> Option<Item> {
        self.document().get(key)
    }

    /// Writes a field of the backing document.
    fn set(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.document_mut().set(key, value);
        self
    }
}

/// Builds and validates a record from its raw fields.
///
/// `raw` is wrapped in a document and its mandatory fields are handed to
/// [`Record::construct`]. The record keeps every raw field in its original
/// order; fields the constructor added that `raw` lacks are appended. The
/// result is then checked with [`Record::is_valid`].
pub fn make_record<R: Record>(raw: Value) -> Result<R> {
    let source = Document::from_value(raw).map_err(|_| {
        Error::format(R::RESOURCE, format!("{} fields must be an object", R::RESOURCE))
    })?;
    if source.is_list() {
        return Err(Error::format(
            R::RESOURCE,
            format!("{} fields must be an object, got a list", R::RESOURCE),
        ));
    }

    let mut record = R::construct(&source);
    let mut document = source;
    if let Value::Object(constructed) = record.document().as_value() {
        for (key, value) in constructed {
            if !document.has_key(key.as_str()) {
                document.set_with_separator(key.as_str(), value.clone(), "");
            }
        }
    }
    *record.document_mut() = document;

    if !record.is_valid() {
        return Err(Error::Validation {
            resource: R::RESOURCE,
            message: format!("{} is missing mandatory fields", R::RESOURCE),
        });
    }
    Ok(record)
}

impl<R: Record> Payload for R {
    fn make(raw: Value) -> Result<Self> {
        make_record(raw)
    }

    fn make_from_response(body: Value) -> Result<Self> {
        match R::ENVELOPE_KEY {
            Some(key) => make_record(take_key::<R>(body, key)?),
            None => make_record(body),
        }
    }
}

fn take_key<R: Record>(body: Value, key: &str) -> Result<Value> {
    match body {
        Value::Object(mut map) => map
            .remove(key)
            .ok_or_else(|| Error::format(R::RESOURCE, format!("missing key `{key}` in response"))),
        _ => Err(Error::format(
            R::RESOURCE,
            format!("expected an object with key `{key}`"),
        )),
    }
}

/// An ordered list of raw records wrapped into `T` on access.
///
/// Wrapping happens on every access; two iterations produce two sets of
/// independent views.
pub struct Collection<T> {
    items: Vec<Value>,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            _record: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection").field("items", &self.items).finish()
    }
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            _record: PhantomData,
        }
    }
}

impl<T: Record> Collection<T> {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if there are no records.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Wraps the record at `index`.
    pub fn get(&self, index: usize) -> Option<T> {
        self.items.get(index).map(wrap::<T>)
    }

    /// Wraps the first record.
    pub fn first(&self) -> Option<T> {
        self.get(0)
    }

    /// Iterates the records, wrapping each one.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.items.iter().map(wrap::<T>)
    }

    /// Appends a record.
    pub fn push(&mut self, record: &T) -> &mut Self {
        self.items.push(record.to_value());
        self
    }

    /// Returns the raw list.
    pub fn to_value(&self) -> Value {
        Value::Array(self.items.clone())
    }
}

fn wrap<T: Record>(raw: &Value) -> T {
    match Document::from_value(raw.clone()) {
        Ok(document) => T::from_document(document),
        Err(_) => T::from_document(Document::new()),
    }
}

impl<T: Record> Payload for Collection<T> {
    fn make(raw: Value) -> Result<Self> {
        match raw {
            Value::Array(items) => Ok(Self {
                items,
                _record: PhantomData,
            }),
            _ => Err(Error::format(
                T::RESOURCE,
                format!("expected a list of {}", T::COLLECTION_KEY),
            )),
        }
    }

    fn make_from_response(body: Value) -> Result<Self> {
        match body {
            Value::Object(mut map) => match map.remove(T::COLLECTION_KEY) {
                Some(list @ Value::Array(_)) => Self::make(list),
                Some(_) => Err(Error::format(
                    T::RESOURCE,
                    format!("key `{}` does not hold a list", T::COLLECTION_KEY),
                )),
                None => Err(Error::format(
                    T::RESOURCE,
                    format!("missing key `{}` in response", T::COLLECTION_KEY),
                )),
            },
            list @ Value::Array(_) => Self::make(list),
            _ => Err(Error::format(
                T::RESOURCE,
                format!("expected an object with key `{}`", T::COLLECTION_KEY),
            )),
        }
    }
}

impl<T: Record> IntoIterator for Collection<T> {
    type Item = T;
    type IntoIter = std::iter::Map<std::vec::IntoIter<Value>, fn(Value) -> T>;

    fn into_iter(self) -> Self::IntoIter {
        fn wrap_owned<T: Record>(raw: Value) -> T {
            wrap::<T>(&raw)
        }
        self.items.into_iter().map(wrap_owned::<T> as fn(Value) -> T)
    }
}

impl<T: Record> FromIterator<T> for Collection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(|record| record.to_value()).collect(),
            _record: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug)]
    struct Note {
        document: Document,
    }

    impl Note {
        fn new(title: &str) -> Self {
            let mut document = Document::new();
            document.set("title", title);
            Self { document }
        }

        fn title(&self) -> String {
            self.document.get_string("title", "")
        }
    }

    impl Record for Note {
        const RESOURCE: &'static str = "Note";
        const ENVELOPE_KEY: Option<&'static str> = Some("note");
        const COLLECTION_KEY: &'static str = "notes";

        fn construct(document: &Document) -> Self {
            Self::new(&document.get_string("title", ""))
        }

        fn from_document(document: Document) -> Self {
            Self { document }
        }

        fn document(&self) -> &Document {
            &self.document
        }

        fn document_mut(&mut self) -> &mut Document {
            &mut self.document
        }

        fn is_valid(&self) -> bool {
            !self.title().is_empty()
        }
    }

    #[test]
    fn test_make_copies_optional_fields() {
        let note = Note::make(json!({ "title": "Hi", "body": "text", "pinned": true })).unwrap();

        assert_eq!(note.title(), "Hi");
        assert_eq!(note.document().get_string("body", ""), "text");
        assert_eq!(note.to_value(), json!({ "title": "Hi", "body": "text", "pinned": true }));
    }

    #[test]
    fn test_make_rejects_invalid_records() {
        assert!(matches!(
            Note::make(json!({ "body": "no title" })),
            Err(Error::Validation { resource: "Note", .. })
        ));
        assert!(matches!(
            Note::make(json!([1, 2])),
            Err(Error::Format { resource: "Note", .. })
        ));
        assert!(matches!(
            Note::make(json!("title")),
            Err(Error::Format { resource: "Note", .. })
        ));
    }

    #[test]
    fn test_make_from_response_strips_envelope() {
        let note = Note::make_from_response(json!({ "note": { "title": "Wrapped" } })).unwrap();
        assert_eq!(note.title(), "Wrapped");

        match Note::make_from_response(json!({ "title": "Bare" })) {
            Err(Error::Format { message, .. }) => assert!(message.contains("`note`")),
            other => panic!("Expected Format error, got {:?}", other),
        }
    }

    #[test]
    fn test_document_payload_takes_the_whole_body() {
        let doc = Document::make_from_response(json!({ "note": { "title": "x" } })).unwrap();
        assert_eq!(doc.get_string("note.title", ""), "x");
    }

    #[test]
    fn test_collection_wraps_on_access() {
        let notes = Collection::<Note>::make_from_response(json!({
            "notes": [{ "title": "a" }, { "title": "" }, { "title": "c" }]
        }))
        .unwrap();

        assert_eq!(notes.len(), 3);
        // Collection elements are unchecked views.
        assert_eq!(notes.get(1).map(|n| n.title()), Some(String::new()));
        let titles: Vec<String> = notes.iter().map(|n| n.title()).collect();
        assert_eq!(titles, vec!["a", "", "c"]);

        let mut first = notes.first().unwrap();
        first.set("title", "changed");
        assert_eq!(notes.first().unwrap().title(), "a");

        let owned: Vec<String> = notes.into_iter().map(|n| n.title()).collect();
        assert_eq!(owned, vec!["a", "", "c"]);
    }

    #[test]
    fn test_collection_shape_errors() {
        assert!(matches!(
            Collection::<Note>::make_from_response(json!({ "items": [] })),
            Err(Error::Format { .. })
        ));
        assert!(matches!(
            Collection::<Note>::make_from_response(json!({ "notes": {} })),
            Err(Error::Format { .. })
        ));
        assert!(Collection::<Note>::make_from_response(json!([])).unwrap().is_empty());
    }

    #[test]
    fn test_collection_from_records() {
        let notes: Collection<Note> = vec![Note::new("x"), Note::new("y")].into_iter().collect();
        assert_eq!(notes.to_value(), json!([{ "title": "x" }, { "title": "y" }]));
    }

    #[test]
    fn test_document_iter_as_records() {
        let doc = Document::from_value(json!({ "a": { "title": "first" }, "skip": 1, "b": { "title": "second" } }))
            .unwrap();
        let titles: Vec<String> = doc.iter_as::<Note>().map(|n| n.title()).collect();
        assert_eq!(titles, vec!["first", "second"]);
    }
}
