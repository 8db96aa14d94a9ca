//! Main recordgate crate: a thin CRUD gateway over JSON document stores.
//!
//! This crate is the primary entry point for users of recordgate. It re-exports the
//! core gateway, schema and pagination types and provides access to the storage
//! backends.
//!
//! # Features
//!
//! - **Identifier translation** - Callers speak `id`, stores speak `_id`
//! - **Soft-deletion** - Removing a record flips its `active` flag and reads skip it
//! - **Audit defaults** - Creation fills `id`, `active`, `createdBy`, `createdAt` and friends
//! - **Pagination** - Lists return a page of records with the total match count
//!
//! # Quick Start
//!
//! ```ignore
//! use recordgate::{prelude::*, bson::{Bson, doc}};
//!
//! #[tokio::main]
//! async fn main() -> GatewayResult<()> {
//!     let domains = Domains::new().with("comment", Schema::new());
//!     let gateway = recordgate::connect_memory(domains, &GatewayOptions::default()).await?;
//!
//!     let user = Bson::String("u1".into());
//!     let comment = gateway.create("comment", &doc! { "text": "hello" }, Some(&user)).await?;
//!     let id = comment.get_str("id").unwrap_or_default().to_string();
//!
//!     let page = gateway.get_models("comment", doc! {}, &ListOptions::new()).await?;
//!     println!("{} comments", page.total);
//!
//!     gateway.remove("comment", id.as_str()).await?;
//!     gateway.shutdown().await
//! }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - In-memory storage for development and testing
//! - [`mongodb`] - MongoDB backend (requires `mongodb` feature)

pub mod prelude;

pub use recordgate_core::{backend, config, defaults, error, gateway, page, query, schema, translate};

// Re-export BSON types for convenience
pub use bson;

use recordgate_core::{config::GatewayOptions, error::GatewayResult, gateway::Gateway, schema::Domains};

/// In-memory storage backend implementations.
pub mod memory {
    pub use recordgate_memory::{InMemoryStore, InMemoryStoreBuilder};
}

/// MongoDB storage backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use recordgate_mongodb::{MongoDbStore, MongoDbStoreBuilder};
}

/// Builds a gateway over the in-memory backend targeted by `options.db_url`.
pub async fn connect_memory(
    domains: Domains,
    options: &GatewayOptions,
) -> GatewayResult<Gateway<memory::InMemoryStore>> {
    let builder = memory::InMemoryStoreBuilder::from_options(options);

    Ok(Gateway::init(domains, builder).await?.with_options(options))
}

/// Builds a gateway over the MongoDB deployment at `options.db_url`.
#[cfg(feature = "mongodb")]
pub async fn connect_mongodb(
    domains: Domains,
    options: &GatewayOptions,
) -> GatewayResult<Gateway<mongodb::MongoDbStore>> {
    let builder = mongodb::MongoDbStoreBuilder::from_options(options);

    Ok(Gateway::init(domains, builder).await?.with_options(options))
}
