//! People directory lookups

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::person::{Person, PersonQuery},
    AppState,
};

/// Find a person by name
#[utoipa::path(
    get,
    path = "/people",
    tag = "people",
    params(
        ("name" = String, Query, description = "Exact name; the first match is returned")
    ),
    responses(
        (status = 200, description = "Person", body = Person),
        (status = 404, description = "Person not found")
    )
)]
pub async fn find_person(
    State(state): State<AppState>,
    Query(query): Query<PersonQuery>,
) -> AppResult<Json<Person>> {
    let person = state.services.people.find_by_name(&query.name).await?;
    Ok(Json(person))
}

/// Get person by ID
#[utoipa::path(
    get,
    path = "/people/{id}",
    tag = "people",
    params(
        ("id" = i32, Path, description = "Person ID")
    ),
    responses(
        (status = 200, description = "Person", body = Person),
        (status = 404, description = "Person not found")
    )
)]
pub async fn get_person(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Person>> {
    let person = state.services.people.find_by_id(id).await?;
    Ok(Json(person))
}
