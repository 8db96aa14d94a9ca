//! Filter evaluation for in-memory documents.
//!
//! This module evaluates MongoDB-style filter documents against stored BSON
//! documents. It understands plain equality (including membership in array
//! fields), dotted paths, the comparison operators `$eq`, `$ne`, `$gt`, `$gte`,
//! `$lt`, `$lte`, `$in`, `$nin`, `$exists`, and the logical operators `$and`,
//! `$or` and `$nor`. Any other operator is reported as a backend error.

use std::{cmp::Ordering, collections::HashMap};
use bson::{Bson, Document, datetime::DateTime, oid::ObjectId};

use recordgate_core::error::{GatewayError, GatewayResult};


/// Type-erased, comparable representation of BSON values.
///
/// Numeric types are normalized to f64 so that `Int32(1)`, `Int64(1)` and
/// `Double(1.0)` compare equal, as they do in MongoDB.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Numeric value (all integers and floats normalized to f64)
    Number(f64),
    /// DateTime value
    DateTime(DateTime),
    /// String value
    String(&'a str),
    /// ObjectId value, ordered by its bytes (timestamp first)
    ObjectId(ObjectId),
    /// Array of comparable values
    Array(Vec<Comparable<'a>>),
    /// Map/Object of comparable values
    Map(HashMap<&'a str, Comparable<'a>>),
    /// Any other BSON value, compared structurally
    Other(&'a Bson),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(*value as f64),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::ObjectId(value) => Comparable::ObjectId(*value),
            Bson::Array(arr) => Comparable::Array(
                arr
                    .iter()
                    .map(Comparable::from)
                    .collect::<Vec<_>>()
            ),
            Bson::Document(doc) => Comparable::Map(
                doc
                    .iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect::<HashMap<_, _>>()
            ),
            other => Comparable::Other(other),
        }
    }
}

impl<'a> Comparable<'a> {
    /// Position of this value's type in MongoDB's cross-type sort order.
    fn type_rank(&self) -> u8 {
        match self {
            Comparable::Null => 0,
            Comparable::Number(_) => 1,
            Comparable::String(_) => 2,
            Comparable::Map(_) => 3,
            Comparable::Array(_) => 4,
            Comparable::Other(_) => 5,
            Comparable::ObjectId(_) => 6,
            Comparable::Bool(_) => 7,
            Comparable::DateTime(_) => 8,
        }
    }

    /// Total ordering used when sorting; values of different types order by type.
    pub(crate) fn sort_cmp(&self, other: &Self) -> Ordering {
        self.type_rank()
            .cmp(&other.type_rank())
            .then_with(|| self.partial_cmp(other).unwrap_or(Ordering::Equal))
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::ObjectId(a), Comparable::ObjectId(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            (Comparable::Other(a), Comparable::Other(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => Some(Ordering::Equal),
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            (Comparable::ObjectId(a), Comparable::ObjectId(b)) => a.bytes().partial_cmp(&b.bytes()),
            _ => None,
        }
    }
}

/// Resolves a possibly dotted field path inside a document.
pub(crate) fn lookup<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut segments = path.split('.');
    let mut current = document.get(segments.next()?)?;

    for segment in segments {
        current = match current {
            Bson::Document(inner) => inner.get(segment)?,
            _ => return None,
        };
    }

    Some(current)
}


/// Evaluates filter documents against a single stored document.
pub struct DocumentEvaluator<'a> {
    document: &'a Document,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    /// Returns whether the document satisfies every criterion of `filter`.
    pub fn matches(&self, filter: &Document) -> GatewayResult<bool> {
        for (key, condition) in filter {
            let satisfied = match key.as_str() {
                "$and" => self.all(condition)?,
                "$or" => self.any(condition)?,
                "$nor" => !self.any(condition)?,
                op if op.starts_with('$') => {
                    return Err(GatewayError::Backend(format!("Unsupported top-level operator {op}")));
                },
                field => self.matches_field(lookup(self.document, field), condition)?,
            };

            if !satisfied {
                return Ok(false);
            }
        }

        Ok(true)
    }

    pub fn filter_documents(
        documents: impl IntoIterator<Item = &'a Document>,
        filter: &Document,
    ) -> GatewayResult<Vec<&'a Document>> {
        let mut matching = Vec::new();

        for document in documents {
            if DocumentEvaluator::new(document).matches(filter)? {
                matching.push(document);
            }
        }

        Ok(matching)
    }

    fn clauses(condition: &Bson) -> GatewayResult<Vec<&Document>> {
        condition
            .as_array()
            .ok_or_else(|| GatewayError::Backend("Logical operators require an array".to_string()))?
            .iter()
            .map(|clause| {
                clause
                    .as_document()
                    .ok_or_else(|| GatewayError::Backend("Logical operator clauses must be documents".to_string()))
            })
            .collect()
    }

    fn all(&self, condition: &Bson) -> GatewayResult<bool> {
        for clause in Self::clauses(condition)? {
            if !self.matches(clause)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn any(&self, condition: &Bson) -> GatewayResult<bool> {
        for clause in Self::clauses(condition)? {
            if self.matches(clause)? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn matches_field(&self, value: Option<&Bson>, condition: &Bson) -> GatewayResult<bool> {
        match condition {
            Bson::Document(operators) if is_operator_document(operators) => {
                for (op, operand) in operators {
                    if !apply_operator(value, op, operand)? {
                        return Ok(false);
                    }
                }

                Ok(true)
            },
            _ => Ok(equals(value, condition)),
        }
    }
}

fn is_operator_document(document: &Document) -> bool {
    !document.is_empty() && document.keys().all(|key| key.starts_with('$'))
}

/// Equality with MongoDB semantics: a missing field equals `null`, and an array
/// field matches a scalar it contains.
fn equals(value: Option<&Bson>, operand: &Bson) -> bool {
    let expected = Comparable::from(operand);

    match value {
        None => expected == Comparable::Null,
        Some(Bson::Array(items)) if !matches!(operand, Bson::Array(_)) => items
            .iter()
            .any(|item| Comparable::from(item) == expected),
        Some(found) => Comparable::from(found) == expected,
    }
}

fn compare(value: Option<&Bson>, operand: &Bson, accept: fn(Ordering) -> bool) -> bool {
    let expected = Comparable::from(operand);

    match value {
        Some(Bson::Array(items)) => items
            .iter()
            .any(|item| Comparable::from(item).partial_cmp(&expected).is_some_and(accept)),
        Some(found) => Comparable::from(found).partial_cmp(&expected).is_some_and(accept),
        None => false,
    }
}

fn apply_operator(value: Option<&Bson>, op: &str, operand: &Bson) -> GatewayResult<bool> {
    Ok(match op {
        "$eq" => equals(value, operand),
        "$ne" => !equals(value, operand),
        "$gt" => compare(value, operand, Ordering::is_gt),
        "$gte" => compare(value, operand, Ordering::is_ge),
        "$lt" => compare(value, operand, Ordering::is_lt),
        "$lte" => compare(value, operand, Ordering::is_le),
        "$in" => candidates(op, operand)?
            .iter()
            .any(|candidate| equals(value, candidate)),
        "$nin" => !candidates(op, operand)?
            .iter()
            .any(|candidate| equals(value, candidate)),
        "$exists" => value.is_some() == truthy(operand),
        _ => return Err(GatewayError::Backend(format!("Unsupported operator {op}"))),
    })
}

fn candidates<'b>(op: &str, operand: &'b Bson) -> GatewayResult<&'b Vec<Bson>> {
    operand
        .as_array()
        .ok_or_else(|| GatewayError::Backend(format!("{op} requires an array")))
}

fn truthy(value: &Bson) -> bool {
    match value {
        Bson::Boolean(flag) => *flag,
        Bson::Int32(n) => *n != 0,
        Bson::Int64(n) => *n != 0,
        Bson::Double(n) => *n != 0.0,
        Bson::Null => false,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn accepts(document: Document, filter: Document) -> bool {
        DocumentEvaluator::new(&document).matches(&filter).unwrap()
    }

    #[test]
    fn plain_equality_and_missing_fields() {
        let comment = doc! { "_id": "c1", "active": true, "score": 3 };

        assert!(accepts(comment.clone(), doc! { "_id": "c1", "active": true }));
        assert!(accepts(comment.clone(), doc! { "score": 3.0 }));
        assert!(!accepts(comment.clone(), doc! { "active": false }));
        assert!(accepts(comment.clone(), doc! { "deletedAt": Bson::Null }));
        assert!(accepts(comment, doc! {}));
    }

    #[test]
    fn array_fields_match_contained_scalars() {
        let post = doc! { "tags": ["rust", "db"] };

        assert!(accepts(post.clone(), doc! { "tags": "rust" }));
        assert!(accepts(post.clone(), doc! { "tags": ["rust", "db"] }));
        assert!(!accepts(post, doc! { "tags": "go" }));
    }

    #[test]
    fn comparison_and_membership_operators() {
        let comment = doc! { "_id": "c2", "score": 5, "author": { "_id": "u1" } };

        assert!(accepts(comment.clone(), doc! { "score": { "$gt": 4, "$lte": 5 } }));
        assert!(!accepts(comment.clone(), doc! { "score": { "$lt": 5 } }));
        assert!(accepts(comment.clone(), doc! { "_id": { "$in": ["c1", "c2"] } }));
        assert!(accepts(comment.clone(), doc! { "_id": { "$nin": ["c3"] } }));
        assert!(accepts(comment.clone(), doc! { "author._id": "u1" }));
        assert!(accepts(comment.clone(), doc! { "author": { "$exists": true } }));
        assert!(accepts(comment, doc! { "editedAt": { "$exists": false } }));
    }

    #[test]
    fn logical_operators() {
        let comment = doc! { "score": 5, "postId": "p1" };

        assert!(accepts(comment.clone(), doc! { "$or": [{ "score": 1 }, { "postId": "p1" }] }));
        assert!(!accepts(comment.clone(), doc! { "$and": [{ "score": 5 }, { "postId": "p2" }] }));
        assert!(accepts(comment, doc! { "$nor": [{ "score": 1 }] }));
    }

    #[test]
    fn unsupported_operators_are_errors() {
        let comment = doc! { "text": "hello" };
        let result = DocumentEvaluator::new(&comment).matches(&doc! { "text": { "$regex": "^h" } });

        assert!(matches!(result, Err(GatewayError::Backend(_))));
    }

    #[test]
    fn object_ids_order_by_bytes() {
        let early = Bson::ObjectId(ObjectId::from_bytes([0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 9]));
        let late = Bson::ObjectId(ObjectId::from_bytes([0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 0]));

        assert_eq!(Comparable::from(&early).sort_cmp(&Comparable::from(&late)), Ordering::Less);
        assert_eq!(Comparable::from(&late).sort_cmp(&Comparable::from(&early)), Ordering::Greater);
        assert!(accepts(doc! { "_id": late.clone() }, doc! { "_id": { "$gt": early } }));
    }

    #[test]
    fn sort_order_puts_missing_and_null_first() {
        let null = Bson::Null;
        let number = Bson::Int32(1);
        let text = Bson::String("a".into());

        assert_eq!(Comparable::from(&null).sort_cmp(&Comparable::from(&number)), Ordering::Less);
        assert_eq!(Comparable::from(&number).sort_cmp(&Comparable::from(&text)), Ordering::Less);
        assert_eq!(Comparable::from(&text).sort_cmp(&Comparable::from(&text)), Ordering::Equal);
    }
}
