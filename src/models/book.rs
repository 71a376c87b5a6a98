//! Book model and related types

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use super::person::Person;

/// A lent-out book: who holds it and since when.
///
/// Owner and issuance time only ever exist together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issuance {
    pub owner: Person,
    pub issued_at: DateTime<Utc>,
}

/// Book record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    /// Assigned by the store on first insert
    pub id: Option<i32>,
    pub title: String,
    pub author_name: String,
    pub publish_year: i32,
    /// `None` while the book is on the shelf
    pub issuance: Option<Issuance>,
    /// Derived on read, never persisted
    pub overdue: bool,
}

impl Book {
    pub fn new(title: impl Into<String>, author_name: impl Into<String>, publish_year: i32) -> Self {
        Self {
            id: None,
            title: title.into(),
            author_name: author_name.into(),
            publish_year,
            issuance: None,
            overdue: false,
        }
    }

    pub fn owner(&self) -> Option<&Person> {
        self.issuance.as_ref().map(|i| &i.owner)
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.issuance.as_ref().map(|i| i.issued_at)
    }
}

/// Book row as read from the database (joined with its owner)
#[derive(Debug, FromRow)]
pub struct BookRow {
    pub id: i32,
    pub title: String,
    pub author_name: String,
    pub publish_year: i32,
    pub person_id: Option<i32>,
    pub person_name: Option<String>,
    pub issuance_time: Option<DateTime<Utc>>,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        let issuance = match (row.person_id, row.person_name, row.issuance_time) {
            (Some(id), Some(name), Some(issued_at)) => Some(Issuance {
                owner: Person { id, name },
                issued_at,
            }),
            _ => None,
        };

        Self {
            id: Some(row.id),
            title: row.title,
            author_name: row.author_name,
            publish_year: row.publish_year,
            issuance,
            overdue: false,
        }
    }
}

/// Create/update book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BookForm {
    #[validate(length(min = 2, max = 100, message = "Title should be between 2 and 100 characters"))]
    pub title: String,
    #[validate(length(min = 2, max = 100, message = "AuthorName should be between 2 and 100 characters"))]
    pub author_name: String,
    #[validate(range(max = 2023, message = "Publish year should be less than 2023"))]
    pub publish_year: i32,
}

impl From<BookForm> for Book {
    fn from(form: BookForm) -> Self {
        Book::new(form.title, form.author_name, form.publish_year)
    }
}

/// Book listing query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize, Validate, IntoParams)]
#[validate(schema(function = "validate_paging"))]
pub struct ListingQuery {
    /// Zero-based page index
    pub page: Option<u32>,
    /// Books per page, at least 1 when `page` is also given
    #[serde(alias = "books_per_page")]
    pub page_size: Option<u32>,
    /// Sort by publish year, oldest first
    pub sort_by_year: Option<bool>,
}

/// A page size is only checked when it is used, i.e. together with a page index
fn validate_paging(query: &ListingQuery) -> Result<(), ValidationError> {
    match (query.page, query.page_size) {
        (Some(_), Some(0)) => {
            let mut error = ValidationError::new("page_size");
            error.message = Some("Page size must be at least 1".into());
            Err(error)
        }
        _ => Ok(()),
    }
}

/// One page of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub index: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn offset(&self) -> i64 {
        i64::from(self.index) * i64::from(self.size)
    }
}

/// What the store should return for a listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindCriteria {
    pub page: Option<PageRequest>,
    pub sort_by_year: bool,
}
