//! People lookups used to resolve borrowers

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::person::Person,
    repository::PersonDirectory,
};

#[derive(Clone)]
pub struct PeopleService {
    directory: Arc<dyn PersonDirectory>,
}

impl PeopleService {
    pub fn new(directory: Arc<dyn PersonDirectory>) -> Self {
        Self { directory }
    }

    /// Get person by ID
    pub async fn find_by_id(&self, id: i32) -> AppResult<Person> {
        self.directory
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Person with id {} not found", id)))
    }

    /// Get the first person with the given name
    pub async fn find_by_name(&self, name: &str) -> AppResult<Person> {
        self.directory
            .find_by_name(name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Person named {} not found", name)))
    }
}
