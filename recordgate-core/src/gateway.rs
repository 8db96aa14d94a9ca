//! The record gateway: CRUD over a [`StoreBackend`] with soft-deletion and audit defaults.
//!
//! A [`Gateway`] owns its backend handle and the registry of model schemas. It is
//! built once at startup with [`Gateway::init`] and then shared by reference; every
//! operation is a single round trip (two concurrent ones for [`Gateway::get_models`])
//! and nothing is cached or retried.
//!
//! Records cross the gateway in application space (`id`) and reach the backend in
//! storage space (`_id`). Reads only ever see records whose `active` flag is `true`.
//!
//! # Example
//!
//! ```ignore
//! use recordgate_core::{gateway::Gateway, schema::{Domains, Schema}, page::ListOptions};
//! use recordgate_memory::InMemoryStore;
//! use bson::{doc, Bson};
//!
//! let domains = Domains::new().with("comment", Schema::new());
//! let gateway = Gateway::init(domains, InMemoryStore::builder()).await?;
//!
//! let user = Bson::String("u1".into());
//! let comment = gateway.create("comment", &doc! { "text": "hello" }, Some(&user)).await?;
//! let id = comment.get_str("id")?;
//!
//! gateway.edit("comment", id, &doc! { "text": "hi" }).await?;
//! let page = gateway.get_models("comment", doc! {}, &ListOptions::new()).await?;
//! gateway.remove("comment", id).await?;
//! ```

use bson::{Bson, Document};
use futures::try_join;
use tracing::{debug, error, info, warn};

use crate::{
    backend::{StoreBackend, StoreBackendBuilder, UpdateOutcome},
    config::GatewayOptions,
    defaults::{fields, now, set_default_values},
    error::{GatewayError, GatewayResult},
    page::{DEFAULT_LIMIT, DEFAULT_PAGE, ListOptions, Page},
    query::{FindOptions, RecordQuery},
    schema::Domains,
    translate::{APPLICATION_ID, Direction, STORAGE_ID, translate_document, translate_documents},
};

/// CRUD gateway bound to a backend and a schema registry.
#[derive(Debug)]
pub struct Gateway<B: StoreBackend> {
    backend: B,
    domains: Domains,
    default_page: u64,
    default_limit: u64,
}

impl<B: StoreBackend> Gateway<B> {
    /// Creates a gateway over an already opened backend.
    pub fn new(backend: B, domains: Domains) -> Self {
        Self {
            backend,
            domains,
            default_page: DEFAULT_PAGE,
            default_limit: DEFAULT_LIMIT,
        }
    }

    /// Opens the backend through `builder` and creates a gateway over it.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Connection`] naming the builder's target if the
    /// backend cannot be opened. The failure is logged at error level.
    pub async fn init<T>(domains: Domains, builder: T) -> GatewayResult<Self>
    where
        T: StoreBackendBuilder<Backend = B>,
    {
        let url = builder.target().to_string();

        match builder.build().await {
            Ok(backend) => {
                info!("Connected to {url}");
                Ok(Self::new(backend, domains))
            }
            Err(err) => {
                let reason = match err {
                    GatewayError::Connection { reason, .. } => reason,
                    other => other.to_string(),
                };
                error!("Cannot connect to {url}: {reason}");

                Err(GatewayError::Connection { url, reason })
            }
        }
    }

    /// Applies the list defaults from `options`.
    pub fn with_options(mut self, options: &GatewayOptions) -> Self {
        self.default_page = options.default_page.max(1);
        self.default_limit = options.default_limit.max(1);
        self
    }

    /// Returns the underlying backend handle.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns the schema registry.
    pub fn domains(&self) -> &Domains {
        &self.domains
    }

    /// Fetches the first active record matching `query`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] if no active record matches.
    pub async fn get_model(
        &self,
        model: &str,
        query: impl Into<RecordQuery>,
    ) -> GatewayResult<Document> {
        let filter = query.into().into_active_filter();
        debug!(model, ?filter, "fetching record");

        let found = self
            .backend
            .find_one_document(filter, model)
            .await?
            .ok_or_else(|| GatewayError::not_found(model))?;

        Ok(translate_document(&found, Direction::FromStorage))
    }

    /// Fetches one page of active records matching `query` together with the
    /// total number of active matches.
    ///
    /// The count and the page are fetched concurrently and are not guaranteed to
    /// observe the same snapshot.
    pub async fn get_models(
        &self,
        model: &str,
        query: impl Into<RecordQuery>,
        options: &ListOptions,
    ) -> GatewayResult<Page<Document>> {
        let filter = query.into().into_active_filter();
        let params = options.resolve_with(self.default_page, self.default_limit);
        debug!(model, ?filter, page = params.page, limit = params.per_page, "listing records");

        let find = FindOptions::new(params.offset(), params.per_page, params.sort.as_str());
        let (total, records) = try_join!(
            self.backend.count_documents(filter.clone(), model),
            self.backend.find_documents(filter, find, model),
        )?;

        Ok(params.page_of(total, translate_documents(&records, Direction::FromStorage)))
    }

    /// Creates a record from `data`, filling in schema and audit defaults, and
    /// returns it as a subsequent read would.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UnknownModel`] if `model` has no registered schema.
    pub async fn create(
        &self,
        model: &str,
        data: &Document,
        current_user: Option<&Bson>,
    ) -> GatewayResult<Document> {
        let schema = self.domains.schema(model)?;
        let record = set_default_values(schema, data, current_user);
        let id = record.get(fields::ID).cloned().unwrap_or(Bson::Null);
        debug!(model, %id, "creating record");

        self.backend
            .insert_document(translate_document(&record, Direction::ToStorage), model)
            .await?;

        self.get_model(model, RecordQuery::from(id)).await
    }

    /// Sets the fields of `data` on the record matching `query`, stamps
    /// `updatedAt`, and returns the updated record.
    ///
    /// Identifier fields in `data` are never written.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] if no record was modified.
    pub async fn edit(
        &self,
        model: &str,
        query: impl Into<RecordQuery>,
        data: &Document,
    ) -> GatewayResult<Document> {
        let filter = query.into().into_filter();

        let mut changes: Document = data
            .iter()
            .filter(|(key, _)| !is_identifier(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        changes.insert(fields::UPDATED_AT, now());
        debug!(model, ?filter, "editing record");

        let outcome = self
            .backend
            .update_one_document(
                translate_document(&filter, Direction::ToStorage),
                translate_document(&changes, Direction::ToStorage),
                model,
            )
            .await?;

        if outcome.modified == 0 {
            log_unmodified(model, "edit", outcome);
            return Err(GatewayError::not_found(model));
        }

        self.get_model(model, refetch_filter(filter, changes)).await
    }

    /// Soft-deletes the record matching `query` by setting `active` to `false`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] if no record was modified, which includes
    /// records that were already removed.
    pub async fn remove(&self, model: &str, query: impl Into<RecordQuery>) -> GatewayResult<()> {
        let filter = query.into().into_storage_filter();
        debug!(model, ?filter, "removing record");

        let mut changes = Document::new();
        changes.insert(fields::ACTIVE, false);

        let outcome = self
            .backend
            .update_one_document(filter, changes, model)
            .await?;

        if outcome.modified == 0 {
            log_unmodified(model, "remove", outcome);
            return Err(GatewayError::not_found(model));
        }

        Ok(())
    }

    /// Shuts down the gateway and its backend.
    pub async fn shutdown(self) -> GatewayResult<()> {
        self.backend.shutdown().await
    }
}

fn log_unmodified(model: &str, operation: &str, outcome: UpdateOutcome) {
    if outcome.matched == 0 {
        warn!(model, operation, "no record matched");
    } else {
        warn!(model, operation, "record matched but nothing changed");
    }
}

fn is_identifier(key: &str) -> bool {
    key == APPLICATION_ID || key == STORAGE_ID
}

/// Filter that finds an edited record again: by its id when the edit named a
/// single one, otherwise by the edit's criteria with the written values laid
/// over them.
fn refetch_filter(filter: Document, changes: Document) -> RecordQuery {
    match filter.get(APPLICATION_ID) {
        Some(Bson::Document(_) | Bson::Array(_)) | None => {}
        Some(id) => {
            let mut by_id = Document::new();
            by_id.insert(APPLICATION_ID, id.clone());
            return RecordQuery::Filter(by_id);
        }
    }

    let mut overlaid = filter;
    for (key, value) in changes {
        overlaid.insert(key, value);
    }

    RecordQuery::Filter(overlaid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn refetch_prefers_identifier() {
        let query = refetch_filter(doc! { "id": "abc", "postId": "p1" }, doc! { "text": "hi" });

        assert_eq!(query, RecordQuery::Filter(doc! { "id": "abc" }));
    }

    #[test]
    fn refetch_keeps_criteria_when_identifier_is_an_operator() {
        let query = refetch_filter(
            doc! { "id": { "$in": ["a", "b"] }, "text": "target" },
            doc! { "text": "new" },
        );

        assert_eq!(query, RecordQuery::Filter(doc! { "id": { "$in": ["a", "b"] }, "text": "new" }));
    }

    #[test]
    fn refetch_overlays_written_values() {
        let query = refetch_filter(
            doc! { "postId": "p1", "text": { "$ne": "old" } },
            doc! { "text": "hi" },
        );

        assert_eq!(query, RecordQuery::Filter(doc! { "postId": "p1", "text": "hi" }));
    }
}
