//! In-memory document storage backend for recordgate.
//!
//! This crate provides a thread-safe, in-memory implementation of the `StoreBackend` trait.
//! It uses async-aware read-write locks for concurrent access and is meant for development,
//! tests, and small deployments.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using async-aware RwLock
//! - **MongoDB-style filters** - Equality, comparison, membership and logical operators
//! - **Sorted pagination** - Ascending sort with skip and limit
//!
//! # Quick Start
//!
//! ```ignore
//! use recordgate_core::{gateway::Gateway, schema::{Domains, Schema}};
//! use recordgate_memory::InMemoryStore;
//! use bson::doc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let domains = Domains::new().with("comment", Schema::new());
//!     let gateway = Gateway::init(domains, InMemoryStore::builder()).await?;
//!
//!     let comment = gateway.create("comment", &doc! { "text": "hello" }, None).await?;
//!     println!("{comment}");
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as recordgate_memory;

pub mod store;
pub mod evaluator;

pub use store::{InMemoryStore, InMemoryStoreBuilder};
