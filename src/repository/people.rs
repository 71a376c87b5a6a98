//! People directory lookups

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{error::AppResult, models::person::Person};

/// Read access to people managed outside the lending core
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PersonDirectory: Send + Sync {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Person>>;
    /// First match (lowest id) when several people share a name
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Person>>;
}

#[derive(Clone)]
pub struct PeopleRepository {
    pool: Pool<Postgres>,
}

impl PeopleRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PersonDirectory for PeopleRepository {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Person>> {
        let person = sqlx::query_as::<_, Person>("SELECT id, name FROM person WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(person)
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Person>> {
        let person = sqlx::query_as::<_, Person>(
            "SELECT id, name FROM person WHERE name = $1 ORDER BY id LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(person)
    }
}
