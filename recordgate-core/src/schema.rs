//! Schemas and the registry of models the gateway knows about.
//!
//! A [`Schema`] only matters to the gateway for the default values it declares;
//! any other descriptor keys supplied by the application are accepted and ignored.
//! Schemas are usually loaded from the same JSON the application already keeps:
//!
//! ```ignore
//! use recordgate_core::schema::Schema;
//! use serde_json::json;
//!
//! let schema = Schema::from_json(json!({
//!     "ownerId": { "defaultValue": "current-user-uuid" },
//!     "status": { "type": "string", "defaultValue": "draft" },
//! }))?;
//! ```

use bson::Bson;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    collections::{BTreeMap, HashMap},
    fmt::Debug,
};

use crate::error::{GatewayError, GatewayResult};

/// How a field's value is produced when the caller does not supply one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Bson", into = "Bson")]
pub enum DefaultDirective {
    /// A freshly generated identifier (`"uuid"`).
    Uuid,
    /// An identifier standing in for the acting user (`"current-user-uuid"`).
    CurrentUserUuid,
    /// Any other value, copied verbatim.
    Literal(Bson),
}

impl DefaultDirective {
    /// Tag recognized as [`DefaultDirective::Uuid`].
    pub const UUID_TAG: &'static str = "uuid";
    /// Tag recognized as [`DefaultDirective::CurrentUserUuid`].
    pub const CURRENT_USER_UUID_TAG: &'static str = "current-user-uuid";
}

impl From<Bson> for DefaultDirective {
    fn from(value: Bson) -> Self {
        match value.as_str() {
            Some(Self::UUID_TAG) => DefaultDirective::Uuid,
            Some(Self::CURRENT_USER_UUID_TAG) => DefaultDirective::CurrentUserUuid,
            _ => DefaultDirective::Literal(value),
        }
    }
}

impl From<DefaultDirective> for Bson {
    fn from(directive: DefaultDirective) -> Self {
        match directive {
            DefaultDirective::Uuid => Bson::String(DefaultDirective::UUID_TAG.to_string()),
            DefaultDirective::CurrentUserUuid => {
                Bson::String(DefaultDirective::CURRENT_USER_UUID_TAG.to_string())
            }
            DefaultDirective::Literal(value) => value,
        }
    }
}

/// Description of a single schema field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    /// Value used when a created record does not carry this field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<DefaultDirective>,
}

impl FieldDescriptor {
    /// Creates a descriptor with no default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default directive for this field.
    pub fn with_default(mut self, directive: impl Into<DefaultDirective>) -> Self {
        self.default_value = Some(directive.into());
        self
    }
}

/// A mapping from field name to [`FieldDescriptor`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    fields: BTreeMap<String, FieldDescriptor>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a field descriptor.
    pub fn with_field(mut self, name: impl Into<String>, descriptor: FieldDescriptor) -> Self {
        self.fields.insert(name.into(), descriptor);
        self
    }

    /// Parses a schema from its JSON form (`{ "<field>": { "defaultValue": ... } }`).
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Serialization`] if the value is not an object of descriptors.
    pub fn from_json(value: Value) -> GatewayResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Returns the descriptor for `name`, if declared.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    /// Iterates over every declared field that carries a default directive.
    pub fn defaults(&self) -> impl Iterator<Item = (&str, &DefaultDirective)> {
        self.fields
            .iter()
            .filter_map(|(name, descriptor)| {
                descriptor
                    .default_value
                    .as_ref()
                    .map(|directive| (name.as_str(), directive))
            })
    }
}

/// Anything that can describe the schema of a model.
///
/// Applications usually hand the gateway their own domain objects; a bare
/// [`Schema`] is itself a domain.
pub trait Domain: Send + Sync + Debug {
    /// Returns the schema of this model.
    fn schema(&self) -> &Schema;
}

impl Domain for Schema {
    fn schema(&self) -> &Schema {
        self
    }
}

/// Registry of models keyed by model (collection) name.
#[derive(Debug, Default)]
pub struct Domains {
    models: HashMap<String, Box<dyn Domain>>,
}

impl Domains {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a domain under `model`, consuming and returning the registry.
    pub fn with(mut self, model: impl Into<String>, domain: impl Domain + 'static) -> Self {
        self.register(model, domain);
        self
    }

    /// Registers a domain under `model`, replacing any previous registration.
    pub fn register(&mut self, model: impl Into<String>, domain: impl Domain + 'static) {
        self.models.insert(model.into(), Box::new(domain));
    }

    /// Returns the domain registered under `model`.
    pub fn get(&self, model: &str) -> Option<&dyn Domain> {
        self.models.get(model).map(|domain| domain.as_ref())
    }

    /// Returns the schema registered under `model`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UnknownModel`] if nothing is registered under that name.
    pub fn schema(&self, model: &str) -> GatewayResult<&Schema> {
        self.get(model)
            .map(|domain| domain.schema())
            .ok_or_else(|| GatewayError::UnknownModel(model.to_string()))
    }

    /// Names of all registered models.
    pub fn models(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }
}
