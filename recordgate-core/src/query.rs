//! Query inputs accepted by the gateway and the find options handed to backends.
//!
//! Filters are plain BSON documents in the document store's own query syntax; the
//! gateway never interprets them beyond renaming the identifier field and forcing
//! the soft-delete flag.

use bson::{Bson, Document};

use crate::{
    defaults::fields,
    translate::{Direction, translate_document},
};

/// Selects the records an operation applies to.
///
/// ```ignore
/// use recordgate_core::query::RecordQuery;
/// use bson::doc;
///
/// let by_id: RecordQuery = "abc123".into();
/// let by_filter: RecordQuery = doc! { "postId": "p1" }.into();
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RecordQuery {
    /// A bare identifier, equivalent to `{ "id": <id> }`.
    Id(String),
    /// A filter document in application space.
    Filter(Document),
}

impl RecordQuery {
    /// Returns the query as a filter document in application space.
    pub fn into_filter(self) -> Document {
        match self {
            RecordQuery::Id(id) => id_filter(Bson::String(id)),
            RecordQuery::Filter(filter) => filter,
        }
    }

    /// Builds the storage-space filter for a read, restricted to active records.
    ///
    /// Any `active` criterion supplied by the caller is overridden.
    pub fn into_active_filter(self) -> Document {
        let mut filter = self.into_filter();
        filter.insert(fields::ACTIVE, true);

        translate_document(&filter, Direction::ToStorage)
    }

    /// Builds the storage-space filter for a write.
    pub fn into_storage_filter(self) -> Document {
        translate_document(&self.into_filter(), Direction::ToStorage)
    }
}

impl From<&str> for RecordQuery {
    fn from(id: &str) -> Self {
        RecordQuery::Id(id.to_string())
    }
}

impl From<String> for RecordQuery {
    fn from(id: String) -> Self {
        RecordQuery::Id(id)
    }
}

impl From<&String> for RecordQuery {
    fn from(id: &String) -> Self {
        RecordQuery::Id(id.clone())
    }
}

impl From<Document> for RecordQuery {
    fn from(filter: Document) -> Self {
        RecordQuery::Filter(filter)
    }
}

impl From<&Document> for RecordQuery {
    fn from(filter: &Document) -> Self {
        RecordQuery::Filter(filter.clone())
    }
}

impl From<Bson> for RecordQuery {
    /// Strings become [`RecordQuery::Id`], documents become [`RecordQuery::Filter`];
    /// anything else is treated as an identifier value under `id`.
    fn from(value: Bson) -> Self {
        match value {
            Bson::String(id) => RecordQuery::Id(id),
            Bson::Document(filter) => RecordQuery::Filter(filter),
            other => RecordQuery::Filter(id_filter(other)),
        }
    }
}

fn id_filter(id: Bson) -> Document {
    let mut filter = Document::new();
    filter.insert(fields::ID, id);
    filter
}

/// Skip/limit/sort options for a backend find.
///
/// Sorting is always ascending on a single storage-space field.
#[derive(Debug, Clone, PartialEq)]
pub struct FindOptions {
    /// Number of matching documents to skip.
    pub skip: u64,
    /// Maximum number of documents to return.
    pub limit: u64,
    /// Storage-space field to sort by, ascending.
    pub sort: String,
}

impl FindOptions {
    /// Creates find options.
    pub fn new(skip: u64, limit: u64, sort: impl Into<String>) -> Self {
        Self { skip, limit, sort: sort.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn bare_id_becomes_storage_id_filter() {
        let query = RecordQuery::from("abc123");

        assert_eq!(query.into_storage_filter(), doc! { "_id": "abc123" });
    }

    #[test]
    fn active_filter_overrides_caller_flag() {
        let query = RecordQuery::from(doc! { "id": "abc123", "active": false });

        assert_eq!(query.into_active_filter(), doc! { "_id": "abc123", "active": true });
    }

    #[test]
    fn non_string_bson_is_an_identifier_value() {
        let query = RecordQuery::from(Bson::Int32(7));

        assert_eq!(query.into_filter(), doc! { "id": 7 });
    }
}
