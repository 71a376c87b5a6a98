//! Business logic services

pub mod lending;
pub mod people;

use std::sync::Arc;

use crate::{
    repository::{BookStore, PersonDirectory, Repository},
};

pub use lending::{LendingService, OverduePolicy, TitleSearch};
pub use people::PeopleService;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub lending: LendingService,
    pub people: PeopleService,
}

impl Services {
    /// Create all services backed by the database repository
    pub fn new(repository: Repository, policy: OverduePolicy) -> Self {
        Self::with_stores(
            Arc::new(repository.books),
            Arc::new(repository.people),
            policy,
        )
    }

    /// Create all services over arbitrary store implementations
    pub fn with_stores(
        books: Arc<dyn BookStore>,
        people: Arc<dyn PersonDirectory>,
        policy: OverduePolicy,
    ) -> Self {
        Self {
            lending: LendingService::new(books, policy),
            people: PeopleService::new(people),
        }
    }
}
