//! Storage backend abstraction for the gateway.
//!
//! A [`StoreBackend`] is the thin slice of a document store driver the gateway
//! relies on: counting, finding with skip/limit/sort, inserting one document and
//! updating one document with `$set` semantics. Everything handed to a backend is
//! already in storage space (`_id`), and every document it returns is expected to
//! be in storage space too.
//!
//! # Traits
//!
//! - [`StoreBackend`]: The core trait for storage backends
//! - [`StoreBackendBuilder`]: Factory trait that opens a backend against a target URL
//!
//! # Examples
//!
//! ```ignore
//! use recordgate_core::backend::{StoreBackend, StoreBackendBuilder};
//! use bson::doc;
//!
//! let backend = InMemoryStore::builder().build().await?;
//! backend.insert_document(doc! { "_id": "c1", "active": true }, "comment").await?;
//! assert_eq!(backend.count_documents(doc! { "active": true }, "comment").await?, 1);
//! ```

use async_trait::async_trait;
use bson::Document;
use std::fmt::Debug;

use crate::{error::GatewayResult, query::FindOptions};

/// Counts reported by a single-document update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Number of documents matching the filter (0 or 1).
    pub matched: u64,
    /// Number of documents whose content actually changed (0 or 1).
    pub modified: u64,
}

/// Abstract interface for document storage backends.
///
/// # Thread Safety
///
/// Implementations are shared by every caller of a gateway and must be safe to
/// use concurrently. Connection pooling, if any, is the implementation's concern.
///
/// # Error Handling
///
/// Driver failures are reported as [`GatewayError::Backend`](crate::error::GatewayError::Backend)
/// and are never retried.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Counts the documents in `collection` matching `filter`.
    async fn count_documents(&self, filter: Document, collection: &str) -> GatewayResult<u64>;

    /// Returns the documents in `collection` matching `filter`, sorted ascending by
    /// `options.sort`, after skipping `options.skip` and keeping at most `options.limit`.
    async fn find_documents(
        &self,
        filter: Document,
        options: FindOptions,
        collection: &str,
    ) -> GatewayResult<Vec<Document>>;

    /// Returns the first document in `collection` matching `filter`, if any.
    async fn find_one_document(
        &self,
        filter: Document,
        collection: &str,
    ) -> GatewayResult<Option<Document>>;

    /// Inserts a single document into `collection`, creating the collection if needed.
    ///
    /// Inserting a document whose `_id` already exists is an error.
    async fn insert_document(&self, document: Document, collection: &str) -> GatewayResult<()>;

    /// Sets the fields of `changes` on the first document matching `filter`.
    ///
    /// Fields not named in `changes` are left untouched.
    async fn update_one_document(
        &self,
        filter: Document,
        changes: Document,
        collection: &str,
    ) -> GatewayResult<UpdateOutcome>;

    /// Cleanly shuts down the backend, releasing all resources.
    ///
    /// The default implementation is a no-op.
    async fn shutdown(self) -> GatewayResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

/// Factory for backends that are opened against a target URL.
#[async_trait]
pub trait StoreBackendBuilder: Send {
    type Backend: StoreBackend;

    /// The URL this builder connects to, as reported in logs and errors.
    fn target(&self) -> &str;

    /// Opens the backend.
    ///
    /// # Errors
    ///
    /// Returns an error describing why the target could not be reached.
    async fn build(self) -> GatewayResult<Self::Backend>;
}
