//! Translation of the primary identifier field between application and storage naming.
//!
//! Callers address records by `id`; the document store keys them by `_id`. Every
//! filter and record crossing the gateway passes through [`translate_document`] in
//! the matching [`Direction`] so that neither side ever sees the other's naming.
//!
//! Translation is structural: mappings are rewritten at every depth, sequences of
//! mappings have each element rewritten, and any other value is left alone.
//!
//! ```ignore
//! use bson::doc;
//! use recordgate_core::translate::{translate_document, Direction};
//!
//! let stored = translate_document(&doc! { "id": "abc", "author": { "id": "u1" } }, Direction::ToStorage);
//! assert_eq!(stored, doc! { "_id": "abc", "author": { "_id": "u1" } });
//! ```

use bson::{Bson, Document};

/// Name of the identifier field in application space.
pub const APPLICATION_ID: &str = "id";

/// Name of the identifier field in storage space.
pub const STORAGE_ID: &str = "_id";

/// The direction a value is travelling through the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// From the caller towards the document store (`id` becomes `_id`).
    ToStorage,
    /// From the document store back to the caller (`_id` becomes `id`).
    FromStorage,
}

impl Direction {
    /// Returns the name `key` should carry after translation in this direction.
    pub fn rename<'k>(&self, key: &'k str) -> &'k str {
        match (self, key) {
            (Direction::ToStorage, APPLICATION_ID) => STORAGE_ID,
            (Direction::FromStorage, STORAGE_ID) => APPLICATION_ID,
            _ => key,
        }
    }
}

/// Translates an arbitrary value, returning a new value and leaving the input untouched.
///
/// Documents are rewritten recursively. Arrays are rewritten element by element
/// only when their first element is a document; any other array, like any other
/// scalar, is returned as-is.
pub fn translate(value: &Bson, direction: Direction) -> Bson {
    match value {
        Bson::Document(document) => Bson::Document(translate_document(document, direction)),
        Bson::Array(items) if starts_with_document(items) => Bson::Array(
            items
                .iter()
                .map(|item| match item {
                    Bson::Document(document) => Bson::Document(translate_document(document, direction)),
                    other => other.clone(),
                })
                .collect(),
        ),
        _ => value.clone(),
    }
}

/// Translates a single document.
///
/// If the input carries both `id` and `_id`, the pair appearing later wins, so the
/// output never holds both.
pub fn translate_document(document: &Document, direction: Direction) -> Document {
    document
        .iter()
        .map(|(key, value)| (direction.rename(key).to_string(), translate(value, direction)))
        .collect()
}

/// Translates every document of a result set, preserving order and length.
pub fn translate_documents(documents: &[Document], direction: Direction) -> Vec<Document> {
    documents
        .iter()
        .map(|document| translate_document(document, direction))
        .collect()
}

fn starts_with_document(items: &[Bson]) -> bool {
    matches!(items.first(), Some(Bson::Document(_)))
}
