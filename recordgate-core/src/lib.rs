//! A thin CRUD gateway over JSON document stores.
//!
//! This crate is the core of the recordgate project and provides:
//!
//! - **Identifier translation** ([`translate`]) - Rewrites `id` to `_id` and back at every depth
//! - **Schemas** ([`schema`]) - Field descriptors, default directives and the model registry
//! - **Default injection** ([`defaults`]) - Fills schema defaults and audit fields on create
//! - **Queries** ([`query`]) - Record selectors and backend find options
//! - **Pagination** ([`page`]) - Loose list options and result pages
//! - **Store backend abstraction** ([`backend`]) - Traits for implementing storage backends
//! - **Configuration** ([`config`]) - Connection and list defaults
//! - **The gateway** ([`gateway`]) - CRUD with soft-deletion over a backend
//! - **Error handling** ([`error`]) - Error types and result types
//!
//! # Example
//!
//! ```ignore
//! use recordgate_core::{gateway::Gateway, schema::{Domains, Schema}};
//! use bson::doc;
//!
//! let gateway = Gateway::init(Domains::new().with("comment", Schema::new()), builder).await?;
//! let comment = gateway.create("comment", &doc! { "text": "hello" }, None).await?;
//! assert!(comment.contains_key("id"));
//! ```

#[allow(unused_extern_crates)]
extern crate self as recordgate_core;

pub mod backend;
pub mod config;
pub mod defaults;
pub mod error;
pub mod gateway;
pub mod page;
pub mod query;
pub mod schema;
pub mod translate;
