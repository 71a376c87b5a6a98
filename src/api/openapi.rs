//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, health, people};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Book Lending API",
        version = "0.1.0",
        description = "Book catalog and lending records REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::list_books,
        books::search_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Lending
        books::get_owner,
        books::release_book,
        books::assign_book,
        // People
        people::find_person,
        people::get_person,
    ),
    components(
        schemas(
            books::BookResponse,
            books::TitleSearchResponse,
            books::AssignRequest,
            crate::models::book::BookForm,
            crate::models::person::Person,
            health::HealthResponse,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Book catalog management"),
        (name = "lending", description = "Lending and release of books"),
        (name = "people", description = "People directory lookups")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
