//! Person model (borrowers)

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// Person from the people directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Person {
    pub id: i32,
    pub name: String,
}

/// Person query parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct PersonQuery {
    /// Exact name to look up
    pub name: String,
}
