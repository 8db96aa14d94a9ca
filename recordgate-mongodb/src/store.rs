use async_trait::async_trait;
use futures::TryStreamExt;
use bson::{Document, doc};
use mongodb::{Client, Collection as MongoCollection, options::ClientOptions};
use tracing::debug;

use recordgate_core::{
    backend::{StoreBackend, StoreBackendBuilder, UpdateOutcome},
    config::GatewayOptions,
    error::{GatewayError, GatewayResult},
    query::FindOptions,
};


fn backend_error(error: mongodb::error::Error) -> GatewayError {
    GatewayError::Backend(error.to_string())
}

/// Ascending sort specification on a single field.
fn sort_spec(field: &str) -> Document {
    doc! { field: 1 }
}


#[derive(Debug)]
pub struct MongoDbStore {
    client: Client,
    database: String,
}

impl MongoDbStore {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    pub fn builder(dsn: &str, database: &str) -> MongoDbStoreBuilder {
        MongoDbStoreBuilder::new(dsn, database)
    }

    /// Name of the database this store reads and writes.
    pub fn database(&self) -> &str {
        &self.database
    }

    fn get_collection(&self, collection_name: &str) -> MongoCollection<Document> {
        self.client
            .database(&self.database)
            .collection(collection_name)
    }
}

#[async_trait]
impl StoreBackend for MongoDbStore {
    async fn count_documents(&self, filter: Document, collection: &str) -> GatewayResult<u64> {
        self.get_collection(collection)
            .count_documents(filter)
            .await
            .map_err(backend_error)
    }

    async fn find_documents(
        &self,
        filter: Document,
        options: FindOptions,
        collection: &str,
    ) -> GatewayResult<Vec<Document>> {
        let limit = i64::try_from(options.limit).unwrap_or(i64::MAX);

        self.get_collection(collection)
            .find(filter)
            .sort(sort_spec(&options.sort))
            .skip(options.skip)
            .limit(limit)
            .await
            .map_err(backend_error)?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(backend_error)
    }

    async fn find_one_document(
        &self,
        filter: Document,
        collection: &str,
    ) -> GatewayResult<Option<Document>> {
        self.get_collection(collection)
            .find_one(filter)
            .await
            .map_err(backend_error)
    }

    async fn insert_document(&self, document: Document, collection: &str) -> GatewayResult<()> {
        let result = self.get_collection(collection)
            .insert_one(document)
            .await
            .map_err(backend_error)?;

        debug!(collection, id = %result.inserted_id, "inserted document");

        Ok(())
    }

    async fn update_one_document(
        &self,
        filter: Document,
        changes: Document,
        collection: &str,
    ) -> GatewayResult<UpdateOutcome> {
        let result = self.get_collection(collection)
            .update_one(filter, doc! { "$set": changes })
            .await
            .map_err(backend_error)?;

        Ok(UpdateOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    async fn shutdown(self) -> GatewayResult<()> {
        self.client.shutdown().await;

        Ok(())
    }
}

/// Builder that connects a [`MongoDbStore`] and checks the server answers a ping.
///
/// When no database name is given, the one named in the connection string is used.
#[derive(Debug, Clone)]
pub struct MongoDbStoreBuilder {
    dsn: String,
    database: Option<String>,
}

impl MongoDbStoreBuilder {
    pub fn new(dsn: &str, database: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: Some(database.to_string()),
        }
    }

    /// Creates a builder from the URL and database in `options`.
    pub fn from_options(options: &GatewayOptions) -> Self {
        Self {
            dsn: options.db_url.clone(),
            database: options.database.clone(),
        }
    }

    fn connection_error(&self, reason: impl ToString) -> GatewayError {
        GatewayError::Connection {
            url: self.dsn.clone(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl StoreBackendBuilder for MongoDbStoreBuilder {
    type Backend = MongoDbStore;

    fn target(&self) -> &str {
        &self.dsn
    }

    async fn build(self) -> GatewayResult<Self::Backend> {
        let options = ClientOptions::parse(&self.dsn)
            .await
            .map_err(|e| self.connection_error(e))?;

        let database = self.database
            .clone()
            .or_else(|| options.default_database.clone())
            .ok_or_else(|| self.connection_error("no database named in the URL or options"))?;

        let client = Client::with_options(options)
            .map_err(|e| self.connection_error(e))?;

        client
            .database(&database)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| self.connection_error(e))?;

        Ok(MongoDbStore::new(client, database))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_spec_is_ascending() {
        assert_eq!(sort_spec("_id"), doc! { "_id": 1 });
        assert_eq!(sort_spec("createdAt"), doc! { "createdAt": 1 });
    }

    #[test]
    fn builder_reads_options() {
        let options = GatewayOptions::new("mongodb://localhost:27017").with_database("blog");
        let builder = MongoDbStoreBuilder::from_options(&options);

        assert_eq!(builder.target(), "mongodb://localhost:27017");
        assert_eq!(builder.database.as_deref(), Some("blog"));
    }

    #[tokio::test]
    async fn malformed_urls_fail_as_connection_errors() {
        let result = MongoDbStoreBuilder::new("not-a-mongodb-url", "blog").build().await;

        assert!(matches!(result, Err(GatewayError::Connection { .. })));
    }
}
