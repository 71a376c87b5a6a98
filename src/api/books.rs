//! Book catalog and lending endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookForm, ListingQuery},
        person::Person,
    },
    AppState,
};

/// Book as exposed by the API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookResponse {
    pub id: Option<i32>,
    pub title: String,
    pub author_name: String,
    pub publish_year: i32,
    /// Current holder, null while on the shelf
    pub owner: Option<Person>,
    /// When the book was lent out, null while on the shelf
    pub issuance_time: Option<DateTime<Utc>>,
    /// Lent for longer than the lending period
    pub overdue: bool,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        let (owner, issuance_time) = match book.issuance {
            Some(issuance) => (Some(issuance.owner), Some(issuance.issued_at)),
            None => (None, None),
        };

        Self {
            id: book.id,
            title: book.title,
            author_name: book.author_name,
            publish_year: book.publish_year,
            owner,
            issuance_time,
            overdue: book.overdue,
        }
    }
}

/// Title search query
#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Title prefix; omit to skip the search
    pub query: Option<String>,
}

/// Title search response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TitleSearchResponse {
    /// Null when no search term was given, otherwise the matches
    pub books: Option<Vec<BookResponse>>,
}

/// Assign book request
#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignRequest {
    /// Person receiving the book
    pub person_id: i32,
}

fn responses(books: Vec<Book>) -> Vec<BookResponse> {
    books.into_iter().map(BookResponse::from).collect()
}

/// List books
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(
        ("page" = Option<u32>, Query, description = "Zero-based page index"),
        ("page_size" = Option<u32>, Query, description = "Books per page"),
        ("sort_by_year" = Option<bool>, Query, description = "Sort by publish year ascending")
    ),
    responses(
        (status = 200, description = "List of books", body = Vec<BookResponse>),
        (status = 400, description = "Invalid paging parameters")
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> AppResult<Json<Vec<BookResponse>>> {
    query.validate()?;

    let books = state.services.lending.find_all(&query).await?;
    Ok(Json(responses(books)))
}

/// Search books by title prefix
#[utoipa::path(
    get,
    path = "/books/search",
    tag = "books",
    params(
        ("query" = Option<String>, Query, description = "Title prefix")
    ),
    responses(
        (status = 200, description = "Search result", body = TitleSearchResponse)
    )
)]
pub async fn search_books(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<TitleSearchResponse>> {
    let result = state
        .services
        .lending
        .find_by_title(query.query.as_deref())
        .await?;

    Ok(Json(TitleSearchResponse {
        books: result.into_books().map(responses),
    }))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = BookResponse),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BookResponse>> {
    let book = state
        .services
        .lending
        .find_one(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

    Ok(Json(book.into()))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = BookForm,
    responses(
        (status = 201, description = "Book created", body = BookResponse),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    Json(form): Json<BookForm>,
) -> AppResult<(StatusCode, Json<BookResponse>)> {
    form.validate()?;

    let created = state.services.lending.save(Book::from(form)).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Update an existing book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = BookForm,
    responses(
        (status = 200, description = "Book updated", body = BookResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(form): Json<BookForm>,
) -> AppResult<Json<BookResponse>> {
    form.validate()?;

    let updated = state.services.lending.update(id, Book::from(form)).await?;
    Ok(Json(updated.into()))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book deleted")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.lending.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Get the current holder of a book
#[utoipa::path(
    get,
    path = "/books/{id}/owner",
    tag = "lending",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Holder, or null when the book is missing or on the shelf", body = Person)
    )
)]
pub async fn get_owner(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Option<Person>>> {
    let owner = state.services.lending.get_owner(id).await?;
    Ok(Json(owner))
}

/// Put a book back on the shelf
#[utoipa::path(
    post,
    path = "/books/{id}/release",
    tag = "lending",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book released")
    )
)]
pub async fn release_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.lending.release(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Lend a book to a person
#[utoipa::path(
    post,
    path = "/books/{id}/assign",
    tag = "lending",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = AssignRequest,
    responses(
        (status = 204, description = "Book assigned"),
        (status = 404, description = "Person not found")
    )
)]
pub async fn assign_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<AssignRequest>,
) -> AppResult<StatusCode> {
    let person = state.services.people.find_by_id(request.person_id).await?;

    state.services.lending.assign(id, person).await?;
    Ok(StatusCode::NO_CONTENT)
}
