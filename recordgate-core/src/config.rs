//! Gateway configuration.
//!
//! Options deserialize from the same camel-cased object applications already pass
//! around (`{ "dbUrl": "mongodb://..." }`) and can be overridden from the
//! environment with [`GatewayOptions::from_env`].

use serde::{Deserialize, Serialize};

use crate::page::{DEFAULT_LIMIT, DEFAULT_PAGE};

/// Environment variable holding the storage URL.
pub const DB_URL_ENV: &str = "RECORDGATE_DB_URL";

/// Environment variable holding the database name.
pub const DATABASE_ENV: &str = "RECORDGATE_DATABASE";

/// Options used to build a backend and configure list defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewayOptions {
    /// URL of the document store.
    pub db_url: String,
    /// Database to use when the URL does not name one.
    pub database: Option<String>,
    /// Page requested by list operations that do not ask for one.
    pub default_page: u64,
    /// Page size used by list operations that do not ask for one.
    pub default_limit: u64,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            db_url: "memory://".to_string(),
            database: None,
            default_page: DEFAULT_PAGE,
            default_limit: DEFAULT_LIMIT,
        }
    }
}

impl GatewayOptions {
    /// Creates options targeting `db_url` with default list settings.
    pub fn new(db_url: impl Into<String>) -> Self {
        Self {
            db_url: db_url.into(),
            ..Self::default()
        }
    }

    /// Sets the database name.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Sets the default page size for list operations. Zero is ignored.
    pub fn with_default_limit(mut self, limit: u64) -> Self {
        if limit > 0 {
            self.default_limit = limit;
        }
        self
    }

    /// Applies [`DB_URL_ENV`] and [`DATABASE_ENV`] on top of these options, when set.
    pub fn from_env(mut self) -> Self {
        if let Ok(url) = std::env::var(DB_URL_ENV) {
            self.db_url = url;
        }
        if let Ok(database) = std::env::var(DATABASE_ENV) {
            self.database = Some(database);
        }
        self
    }
}
