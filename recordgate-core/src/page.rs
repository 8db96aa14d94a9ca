//! Pagination inputs and result pages for list operations.
//!
//! List options usually come straight from a request's query string, so
//! [`ListOptions`] keeps them as loose BSON values and coerces them when resolved:
//! numbers and numeric strings are accepted, and anything that does not coerce to
//! a positive whole number falls back to the default.

use bson::{Bson, Document};
use serde::{Deserialize, Serialize};

use crate::translate::{Direction, STORAGE_ID};

/// Page requested when none (or an invalid one) is given. Pages are 1-indexed.
pub const DEFAULT_PAGE: u64 = 1;

/// Page size used when none (or an invalid one) is given.
pub const DEFAULT_LIMIT: u64 = 20;

/// A single page of records along with the total number of matches.
///
/// # Example
///
/// ```ignore
/// use recordgate_core::page::Page;
///
/// let page: Page<String> = Page::builder(vec!["item1".to_string()])
///     .with_total(100)
///     .with_next_page(Some(2))
///     .build();
///
/// assert_eq!(page.records.len(), 1);
/// assert_eq!(page.total, 100);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Total number of matching records across all pages.
    pub total: u64,
    /// The records on this page.
    pub records: Vec<T>,
    /// The next page number, if more records follow.
    pub next_page: Option<u64>,
    /// The previous page number, if this is not the first page.
    pub previous_page: Option<u64>,
}

impl<T> Page<T> {
    /// Creates a new builder for constructing a page.
    pub fn builder(records: Vec<T>) -> PageBuilder<T> {
        PageBuilder::new(records)
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            total: 0,
            records: Vec::new(),
            next_page: None,
            previous_page: None,
        }
    }
}

/// Builder for constructing [`Page`] instances.
pub struct PageBuilder<T> {
    records: Vec<T>,
    total: u64,
    next_page: Option<u64>,
    previous_page: Option<u64>,
}

impl<T> PageBuilder<T> {
    /// Creates a new builder with the given records.
    pub fn new(records: Vec<T>) -> Self {
        Self {
            records,
            total: 0,
            next_page: None,
            previous_page: None,
        }
    }

    /// Sets the total number of matching records.
    pub fn with_total(mut self, total: u64) -> Self {
        self.total = total;
        self
    }

    /// Sets the next page number (or `None` if this is the last page).
    pub fn with_next_page(mut self, next_page: Option<u64>) -> Self {
        self.next_page = next_page;
        self
    }

    /// Sets the previous page number (or `None` if this is the first page).
    pub fn with_previous_page(mut self, previous_page: Option<u64>) -> Self {
        self.previous_page = previous_page;
        self
    }

    /// Builds and returns the final [`Page`].
    pub fn build(self) -> Page<T> {
        Page {
            total: self.total,
            records: self.records,
            next_page: self.next_page,
            previous_page: self.previous_page,
        }
    }
}

/// Raw, caller-supplied list options.
///
/// # Example
///
/// ```ignore
/// use recordgate_core::page::ListOptions;
///
/// let options = ListOptions::new().with_page("2").with_limit(50).with_sort("createdAt");
/// let params = options.resolve();
/// assert_eq!(params.offset(), 50);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ListOptions {
    /// Requested page (1-indexed).
    #[serde(default)]
    pub page: Option<Bson>,
    /// Requested page size.
    #[serde(default)]
    pub limit: Option<Bson>,
    /// Field to sort by, ascending, in application space.
    #[serde(default)]
    pub sort: Option<Bson>,
}

impl ListOptions {
    /// Creates empty options; every value resolves to its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `page`, `limit` and `sort` out of a parameter document, ignoring other keys.
    pub fn from_document(params: &Document) -> Self {
        Self {
            page: params.get("page").cloned(),
            limit: params.get("limit").cloned(),
            sort: params.get("sort").cloned(),
        }
    }

    /// Sets the requested page.
    pub fn with_page(mut self, page: impl Into<Bson>) -> Self {
        self.page = Some(page.into());
        self
    }

    /// Sets the requested page size.
    pub fn with_limit(mut self, limit: impl Into<Bson>) -> Self {
        self.limit = Some(limit.into());
        self
    }

    /// Sets the field to sort by.
    pub fn with_sort(mut self, sort: impl Into<Bson>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Resolves these options with the crate defaults.
    pub fn resolve(&self) -> PaginationParams {
        self.resolve_with(DEFAULT_PAGE, DEFAULT_LIMIT)
    }

    /// Resolves these options, falling back to the given defaults.
    pub fn resolve_with(&self, default_page: u64, default_limit: u64) -> PaginationParams {
        let sort = match &self.sort {
            Some(Bson::String(field)) if !field.is_empty() => {
                Direction::ToStorage.rename(field).to_string()
            }
            _ => STORAGE_ID.to_string(),
        };

        PaginationParams {
            page: self.page.as_ref().and_then(coerce_positive).unwrap_or(default_page),
            per_page: self.limit.as_ref().and_then(coerce_positive).unwrap_or(default_limit),
            sort,
        }
    }
}

/// Coerces a loose value to a positive whole number.
fn coerce_positive(value: &Bson) -> Option<u64> {
    let number = match value {
        Bson::Int32(n) => *n as f64,
        Bson::Int64(n) => *n as f64,
        Bson::Double(n) => *n,
        Bson::Boolean(true) => 1.0,
        Bson::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    let whole = number.trunc();
    if whole.is_finite() && whole >= 1.0 {
        Some(whole as u64)
    } else {
        None
    }
}

/// Resolved pagination: a 1-indexed page, a page size and a storage-space sort field.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PaginationParams {
    /// The page number (1-indexed).
    pub page: u64,
    /// Number of records per page.
    pub per_page: u64,
    /// Storage-space field to sort by, ascending.
    pub sort: String,
}

impl PaginationParams {
    /// Number of records to skip to reach this page.
    ///
    /// ```ignore
    /// let params = ListOptions::new().with_page(3).resolve();
    /// assert_eq!(params.offset(), 40);
    /// ```
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }

    /// Wraps the fetched `records` and the `total` match count into a [`Page`]
    /// with navigation metadata.
    pub fn page_of<T>(&self, total: u64, records: Vec<T>) -> Page<T> {
        let seen = self.offset().saturating_add(records.len() as u64);

        Page::builder(records)
            .with_total(total)
            .with_next_page(if seen < total { Some(self.page + 1) } else { None })
            .with_previous_page(if self.page > 1 { Some(self.page - 1) } else { None })
            .build()
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        ListOptions::new().resolve()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn empty_options_resolve_to_defaults() {
        let params = ListOptions::new().resolve();

        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 20);
        assert_eq!(params.sort, "_id");
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn numeric_strings_are_coerced() {
        let params = ListOptions::new().with_page("3").with_limit(" 10 ").resolve();

        assert_eq!(params.page, 3);
        assert_eq!(params.per_page, 10);
        assert_eq!(params.offset(), 20);
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let params = ListOptions::new()
            .with_page("abc")
            .with_limit(0)
            .with_sort(5)
            .resolve();

        assert_eq!(params, PaginationParams::default());

        let params = ListOptions::new().with_page(-2).with_limit(Bson::Null).resolve();
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 20);
    }

    #[test]
    fn fractional_values_are_truncated() {
        let params = ListOptions::new().with_page(2.7).with_limit(0.5).resolve();

        assert_eq!(params.page, 2);
        assert_eq!(params.per_page, 20);
    }

    #[test]
    fn id_sort_is_translated() {
        assert_eq!(ListOptions::new().with_sort("id").resolve().sort, "_id");
        assert_eq!(ListOptions::new().with_sort("createdAt").resolve().sort, "createdAt");
    }

    #[test]
    fn reads_options_from_parameter_document() {
        let options = ListOptions::from_document(&doc! { "page": "2", "limit": 5, "q": "ignored" });
        let params = options.resolve_with(1, 50);

        assert_eq!(params.page, 2);
        assert_eq!(params.per_page, 5);
    }

    #[test]
    fn page_navigation_metadata() {
        let params = ListOptions::new().with_page(2).with_limit(10).resolve();

        let middle = params.page_of(25, vec![0; 10]);
        assert_eq!(middle.next_page, Some(3));
        assert_eq!(middle.previous_page, Some(1));

        let last = ListOptions::new().with_page(3).with_limit(10).resolve().page_of(25, vec![0; 5]);
        assert_eq!(last.next_page, None);
        assert_eq!(last.previous_page, Some(2));
        assert_eq!(last.total, 25);
    }
}
