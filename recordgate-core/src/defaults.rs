//! Default-value injection for newly created records.
//!
//! Precedence, highest first: fields supplied by the caller, defaults declared by
//! the model's [`Schema`], then the standard audit fields every record carries
//! (see [`fields`]).

use bson::{Bson, DateTime, Document};
use chrono::Utc;
use uuid::Uuid;

use crate::schema::{DefaultDirective, Schema};

/// Names of the standard fields every record carries, in application space.
pub mod fields {
    /// Primary identifier.
    pub const ID: &str = crate::translate::APPLICATION_ID;
    /// Soft-delete marker; `false` once a record is removed.
    pub const ACTIVE: &str = "active";
    /// Identity of the user that created the record.
    pub const CREATED_BY: &str = "createdBy";
    /// Creation timestamp.
    pub const CREATED_AT: &str = "createdAt";
    /// Identity of the user that last touched the record.
    pub const UPDATED_BY: &str = "updatedBy";
    /// Timestamp of the last write.
    pub const UPDATED_AT: &str = "updatedAt";
}

impl DefaultDirective {
    /// Produces the value this directive stands for at write time.
    pub fn resolve(&self, _current_user: Option<&Bson>) -> Bson {
        match self {
            DefaultDirective::Uuid => Bson::String(generate_id()),
            // TODO: resolve to the acting user's id once callers pass a structured identity.
            DefaultDirective::CurrentUserUuid => Bson::String(generate_id()),
            DefaultDirective::Literal(value) => value.clone(),
        }
    }
}

/// Generates a fresh record identifier.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// The current time as stored in audit fields.
pub fn now() -> DateTime {
    DateTime::from_chrono(Utc::now())
}

/// Builds a complete record from caller-supplied `data`, leaving `data` untouched.
///
/// `current_user` becomes `createdBy`/`updatedBy`; when absent those fields are
/// stored as `null`. Literal defaults apply even when falsy (`false`, `0`, `""`),
/// so a schema can declare `active: false` for records created as drafts.
pub fn set_default_values(schema: &Schema, data: &Document, current_user: Option<&Bson>) -> Document {
    let mut record = data.clone();

    for (field, directive) in schema.defaults() {
        if !record.contains_key(field) {
            record.insert(field, directive.resolve(current_user));
        }
    }

    let user = current_user.cloned().unwrap_or(Bson::Null);
    let timestamp = now();
    let standard = [
        (fields::ID, Bson::String(generate_id())),
        (fields::CREATED_BY, user.clone()),
        (fields::CREATED_AT, Bson::DateTime(timestamp)),
        (fields::UPDATED_BY, user),
        (fields::UPDATED_AT, Bson::DateTime(timestamp)),
        (fields::ACTIVE, Bson::Boolean(true)),
    ];

    for (field, value) in standard {
        if !record.contains_key(field) {
            record.insert(field, value);
        }
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldDescriptor;
    use bson::doc;

    fn comment_schema() -> Schema {
        Schema::new()
            .with_field("slug", FieldDescriptor::new().with_default(DefaultDirective::Uuid))
            .with_field("ownerId", FieldDescriptor::new().with_default(DefaultDirective::CurrentUserUuid))
            .with_field("status", FieldDescriptor::new().with_default(Bson::String("draft".into())))
            .with_field("text", FieldDescriptor::new())
    }

    #[test]
    fn sets_standard_fields_when_absent() {
        let user = Bson::String("testUserUUID".into());
        let result = set_default_values(&Schema::new(), &doc! {}, Some(&user));

        assert!(!result.get_str(fields::ID).unwrap().is_empty());
        assert!(result.get_datetime(fields::CREATED_AT).is_ok());
        assert!(result.get_datetime(fields::UPDATED_AT).is_ok());
        assert_eq!(result.get(fields::CREATED_BY), Some(&user));
        assert_eq!(result.get(fields::UPDATED_BY), Some(&user));
        assert_eq!(result.get_bool(fields::ACTIVE).unwrap(), true);
    }

    #[test]
    fn retains_input_without_mutation() {
        let data = doc! { "someField": "test" };
        let result = set_default_values(&comment_schema(), &data, None);

        assert_eq!(data, doc! { "someField": "test" });
        assert_eq!(result.get_str("someField").unwrap(), "test");
        assert!(result.len() > 4);
        assert_eq!(result.get(fields::CREATED_BY), Some(&Bson::Null));
    }

    #[test]
    fn resolves_schema_directives() {
        let result = set_default_values(&comment_schema(), &doc! {}, None);

        assert!(uuid::Uuid::parse_str(result.get_str("slug").unwrap()).is_ok());
        assert!(uuid::Uuid::parse_str(result.get_str("ownerId").unwrap()).is_ok());
        assert_eq!(result.get_str("status").unwrap(), "draft");
        assert!(!result.contains_key("text"));
    }

    #[test]
    fn caller_fields_beat_schema_and_standard_defaults() {
        let data = doc! { "id": "abc123", "status": "published", "active": false };
        let result = set_default_values(&comment_schema(), &data, None);

        assert_eq!(result.get_str(fields::ID).unwrap(), "abc123");
        assert_eq!(result.get_str("status").unwrap(), "published");
        assert_eq!(result.get_bool(fields::ACTIVE).unwrap(), false);
    }

    #[test]
    fn schema_defaults_beat_standard_defaults() {
        let schema = Schema::new()
            .with_field("active", FieldDescriptor::new().with_default(Bson::Boolean(false)));
        let result = set_default_values(&schema, &doc! {}, None);

        assert_eq!(result.get_bool(fields::ACTIVE).unwrap(), false);
    }

    #[test]
    fn falsy_literal_defaults_are_applied() {
        let schema = Schema::new()
            .with_field("pinned", FieldDescriptor::new().with_default(Bson::Boolean(false)))
            .with_field("likes", FieldDescriptor::new().with_default(Bson::Int32(0)))
            .with_field("note", FieldDescriptor::new().with_default(Bson::String(String::new())));
        let result = set_default_values(&schema, &doc! {}, None);

        assert_eq!(result.get_bool("pinned").unwrap(), false);
        assert_eq!(result.get_i32("likes").unwrap(), 0);
        assert_eq!(result.get_str("note").unwrap(), "");
    }

    #[test]
    fn generated_ids_are_unique() {
        let first = set_default_values(&Schema::new(), &doc! {}, None);
        let second = set_default_values(&Schema::new(), &doc! {}, None);

        assert_ne!(first.get_str(fields::ID).unwrap(), second.get_str(fields::ID).unwrap());
    }
}
