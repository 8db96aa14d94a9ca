//! In-memory storage implementation for the record gateway.
//!
//! This module provides a simple backend that keeps every collection as an
//! insertion-ordered list of BSON documents behind an async-safe read-write lock.

use std::{collections::HashMap, sync::Arc};
use async_trait::async_trait;
use mea::rwlock::RwLock;
use bson::{Bson, Document, oid::ObjectId};
use tracing::debug;

use recordgate_core::{
    backend::{StoreBackend, StoreBackendBuilder, UpdateOutcome},
    config::GatewayOptions,
    error::{GatewayError, GatewayResult},
    query::FindOptions,
    translate::STORAGE_ID,
};

use crate::evaluator::{Comparable, DocumentEvaluator, lookup};

type StoreMap = HashMap<String, Vec<Document>>;

/// URL scheme accepted by [`InMemoryStoreBuilder`].
pub const MEMORY_SCHEME: &str = "memory:";


/// Thread-safe in-memory document storage backend.
///
/// Documents are kept per collection in insertion order. Filters are evaluated
/// with MongoDB semantics for the operators the gateway and its callers use.
///
/// # Thread Safety
///
/// `InMemoryStore` is cloneable and uses an `Arc`-wrapped internal state, allowing
/// it to be safely shared across async tasks. Multiple clones of the same instance
/// share the same underlying data.
///
/// # Performance
///
/// Queries scan all documents in a collection (no indexing). For small to medium
/// datasets this is typically acceptable. For larger datasets, use the MongoDB
/// backend.
///
/// # Example
///
/// ```ignore
/// use recordgate_memory::InMemoryStore;
/// use recordgate_core::backend::StoreBackend;
/// use bson::doc;
///
/// let store = InMemoryStore::new();
/// store.insert_document(doc! { "_id": "c1", "active": true }, "comment").await?;
/// assert_eq!(store.count_documents(doc! {}, "comment").await?, 1);
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    /// The main storage map: collection_name -> documents in insertion order
    store: Arc<RwLock<StoreMap>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory document store.
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(StoreMap::new())),
        }
    }

    /// Creates a builder targeting `memory://`.
    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }

    /// Returns a copy of every stored document in `collection`, as stored.
    ///
    /// Inactive documents are included.
    pub async fn documents(&self, collection: &str) -> Vec<Document> {
        self.store
            .read()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Names of the collections that have received at least one document.
    pub async fn collections(&self) -> Vec<String> {
        let mut names = self.store
            .read()
            .await
            .keys()
            .cloned()
            .collect::<Vec<_>>();
        names.sort();
        names
    }
}

fn sort_documents(documents: &mut [Document], field: &str) {
    documents.sort_by(|a, b| {
        let left = lookup(a, field)
            .map(Comparable::from)
            .unwrap_or(Comparable::Null);
        let right = lookup(b, field)
            .map(Comparable::from)
            .unwrap_or(Comparable::Null);

        left.sort_cmp(&right)
    });
}

/// Sets `value` at the possibly dotted `path`, creating intermediate documents.
fn set_path(document: &mut Document, path: &str, value: Bson) -> GatewayResult<()> {
    let (parents, leaf) = match path.rsplit_once('.') {
        Some((parents, leaf)) => (parents.split('.').collect::<Vec<_>>(), leaf),
        None => (Vec::new(), path),
    };

    let mut current = document;
    for segment in parents {
        if !current.contains_key(segment) {
            current.insert(segment, Document::new());
        }

        current = match current.get_mut(segment) {
            Some(Bson::Document(inner)) => inner,
            _ => {
                return Err(GatewayError::InvalidRecord(format!(
                    "Cannot set {path}: {segment} is not a document"
                )));
            },
        };
    }

    current.insert(leaf, value);

    Ok(())
}

/// Applies `changes` with `$set` semantics and returns whether any value changed.
///
/// Either every change is applied or, on error, none is.
fn apply_changes(document: &mut Document, changes: Document) -> GatewayResult<bool> {
    let mut updated = document.clone();
    let mut modified = false;

    for (key, value) in changes {
        let unchanged = lookup(&updated, &key)
            .is_some_and(|current| Comparable::from(current) == Comparable::from(&value));

        if !unchanged {
            set_path(&mut updated, &key, value)?;
            modified = true;
        }
    }

    if modified {
        *document = updated;
    }

    Ok(modified)
}


#[async_trait]
impl StoreBackend for InMemoryStore {
    async fn count_documents(&self, filter: Document, collection: &str) -> GatewayResult<u64> {
        let store = self.store.read().await;
        let documents = match store.get(collection) {
            Some(col) => col,
            None => return Ok(0),
        };

        Ok(DocumentEvaluator::filter_documents(documents, &filter)?.len() as u64)
    }

    async fn find_documents(
        &self,
        filter: Document,
        options: FindOptions,
        collection: &str,
    ) -> GatewayResult<Vec<Document>> {
        let store = self.store.read().await;
        let documents = match store.get(collection) {
            Some(col) => col,
            None => return Ok(vec![]),
        };

        let mut matching = DocumentEvaluator::filter_documents(documents, &filter)?
            .into_iter()
            .cloned()
            .collect::<Vec<_>>();

        sort_documents(&mut matching, &options.sort);

        // A limit of zero means no limit, as in MongoDB
        let limit = match options.limit {
            0 => usize::MAX,
            n => usize::try_from(n).unwrap_or(usize::MAX),
        };

        Ok(
            matching
                .into_iter()
                .skip(usize::try_from(options.skip).unwrap_or(usize::MAX))
                .take(limit)
                .collect()
        )
    }

    async fn find_one_document(
        &self,
        filter: Document,
        collection: &str,
    ) -> GatewayResult<Option<Document>> {
        let store = self.store.read().await;
        let documents = match store.get(collection) {
            Some(col) => col,
            None => return Ok(None),
        };

        for document in documents {
            if DocumentEvaluator::new(document).matches(&filter)? {
                return Ok(Some(document.clone()));
            }
        }

        Ok(None)
    }

    async fn insert_document(&self, mut document: Document, collection: &str) -> GatewayResult<()> {
        if !document.contains_key(STORAGE_ID) {
            document.insert(STORAGE_ID, ObjectId::new());
        }

        let mut store = self.store.write().await;
        let documents = store
            .entry(collection.to_string())
            .or_default();

        let id = document.get(STORAGE_ID).cloned().unwrap_or(Bson::Null);
        let duplicate = documents
            .iter()
            .any(|existing| existing.get(STORAGE_ID).is_some_and(|other| *other == id));

        if duplicate {
            return Err(GatewayError::Backend(format!(
                "Document with id {id} already exists in collection {collection}"
            )));
        }

        debug!(collection, %id, "inserted document");
        documents.push(document);

        Ok(())
    }

    async fn update_one_document(
        &self,
        filter: Document,
        changes: Document,
        collection: &str,
    ) -> GatewayResult<UpdateOutcome> {
        let mut store = self.store.write().await;
        let documents = match store.get_mut(collection) {
            Some(col) => col,
            None => return Ok(UpdateOutcome::default()),
        };

        let mut position = None;
        for (index, document) in documents.iter().enumerate() {
            if DocumentEvaluator::new(document).matches(&filter)? {
                position = Some(index);
                break;
            }
        }

        let Some(document) = position.and_then(|index| documents.get_mut(index)) else {
            return Ok(UpdateOutcome::default());
        };

        let modified = apply_changes(document, changes)?;

        Ok(UpdateOutcome {
            matched: 1,
            modified: u64::from(modified),
        })
    }
}


/// Builder for constructing [`InMemoryStore`] instances.
///
/// The target URL must use the `memory:` scheme; anything else fails to build,
/// which lets callers exercise connection failures without a real server.
///
/// # Example
///
/// ```ignore
/// use recordgate_memory::InMemoryStoreBuilder;
/// use recordgate_core::backend::StoreBackendBuilder;
///
/// let store = InMemoryStoreBuilder::new("memory://comments").build().await?;
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryStoreBuilder {
    url: String,
}

impl Default for InMemoryStoreBuilder {
    fn default() -> Self {
        Self::new("memory://")
    }
}

impl InMemoryStoreBuilder {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Creates a builder targeting the URL in `options`.
    pub fn from_options(options: &GatewayOptions) -> Self {
        Self::new(options.db_url.clone())
    }
}

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    fn target(&self) -> &str {
        &self.url
    }

    async fn build(self) -> GatewayResult<Self::Backend> {
        if !self.url.starts_with(MEMORY_SCHEME) {
            return Err(GatewayError::Connection {
                reason: format!("unsupported scheme, expected {MEMORY_SCHEME}//"),
                url: self.url,
            });
        }

        Ok(InMemoryStore::new())
    }
}
