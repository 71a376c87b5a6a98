//! Repository layer for database operations

pub mod books;
pub mod people;

use sqlx::{Pool, Postgres};

pub use books::{BookStore, BooksRepository};
pub use people::{PeopleRepository, PersonDirectory};

/// Per-table repositories sharing one connection pool
#[derive(Clone)]
pub struct Repository {
    pub books: BooksRepository,
    pub people: PeopleRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: BooksRepository::new(pool.clone()),
            people: PeopleRepository::new(pool),
        }
    }
}
