//! Convenient re-exports of commonly used types from recordgate.
//!
//! ```ignore
//! use recordgate::prelude::*;
//! ```

pub use recordgate_core::{
    backend::{StoreBackend, StoreBackendBuilder, UpdateOutcome},
    config::GatewayOptions,
    error::{GatewayError, GatewayResult},
    gateway::Gateway,
    page::{ListOptions, Page, PaginationParams},
    query::{FindOptions, RecordQuery},
    schema::{DefaultDirective, Domain, Domains, FieldDescriptor, Schema},
    translate::Direction,
};
