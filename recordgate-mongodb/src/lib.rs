//! MongoDB backend implementation for recordgate.
//!
//! This crate provides a MongoDB-based implementation of the `StoreBackend` trait.
//! Filters, sorting and pagination are delegated to the server as-is.
//!
//! To use this backend, include the `mongodb` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! recordgate = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Connection
//!
//! The builder parses the connection string, connects, and pings the database
//! before handing out a store. A failure at any of these steps is reported as a
//! connection error.
//!
//! # Example
//!
//! ```ignore
//! use recordgate::{backend::StoreBackendBuilder, mongodb::MongoDbStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MongoDbStore::builder("mongodb://localhost:27017", "blog")
//!         .build()
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as recordgate_mongodb;

pub mod store;

pub use store::{MongoDbStore, MongoDbStoreBuilder};
