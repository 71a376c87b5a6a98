//! In-memory stores for driving the service and router without a database

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use book_lending_server::{
    api,
    error::AppResult,
    models::{Book, FindCriteria, Issuance, Person},
    repository::{BookStore, PersonDirectory},
    services::{OverduePolicy, Services},
    AppState,
};

#[derive(Default)]
pub struct MemoryBookStore {
    books: Mutex<BTreeMap<i32, Book>>,
    next_id: Mutex<i32>,
    latency: Option<Duration>,
}

impl MemoryBookStore {
    /// Reads pause after taking their snapshot and targeted writes pause
    /// before applying, so concurrent operations interleave
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Default::default()
        }
    }

    async fn pause(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    pub fn snapshot(&self) -> Vec<Book> {
        self.books.lock().unwrap().values().cloned().collect()
    }

    pub fn get(&self, id: i32) -> Option<Book> {
        self.books.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn find_all(&self, criteria: FindCriteria) -> AppResult<Vec<Book>> {
        let mut books = self.snapshot();
        if criteria.sort_by_year {
            books.sort_by_key(|b| (b.publish_year, b.id));
        }
        if let Some(page) = criteria.page {
            books = books
                .into_iter()
                .skip(page.offset() as usize)
                .take(page.size as usize)
                .collect();
        }
        Ok(books)
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Book>> {
        let book = self.get(id);
        self.pause().await;
        Ok(book)
    }

    async fn find_by_title_prefix(&self, prefix: &str) -> AppResult<Vec<Book>> {
        Ok(self
            .snapshot()
            .into_iter()
            .filter(|b| b.title.starts_with(prefix))
            .collect())
    }

    async fn save(&self, mut book: Book) -> AppResult<Book> {
        let id = match book.id {
            Some(id) if self.get(id).is_some() => id,
            _ => {
                let mut next_id = self.next_id.lock().unwrap();
                *next_id += 1;
                *next_id
            }
        };
        book.id = Some(id);
        book.overdue = false;
        self.books.lock().unwrap().insert(id, book.clone());
        Ok(book)
    }

    async fn update_details(&self, id: i32, details: &Book) -> AppResult<Option<Book>> {
        self.pause().await;
        let mut books = self.books.lock().unwrap();
        Ok(books.get_mut(&id).map(|book| {
            book.title = details.title.clone();
            book.author_name = details.author_name.clone();
            book.publish_year = details.publish_year;
            book.clone()
        }))
    }

    async fn set_issuance(&self, id: i32, issuance: Option<Issuance>) -> AppResult<bool> {
        self.pause().await;
        let mut books = self.books.lock().unwrap();
        Ok(books
            .get_mut(&id)
            .map(|book| book.issuance = issuance)
            .is_some())
    }

    async fn delete_by_id(&self, id: i32) -> AppResult<()> {
        self.books.lock().unwrap().remove(&id);
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryDirectory {
    people: Vec<Person>,
}

impl MemoryDirectory {
    pub fn with(people: Vec<Person>) -> Self {
        Self { people }
    }
}

#[async_trait]
impl PersonDirectory for MemoryDirectory {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Person>> {
        Ok(self.people.iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Person>> {
        Ok(self.people.iter().find(|p| p.name == name).cloned())
    }
}

pub fn person(id: i32, name: &str) -> Person {
    Person {
        id,
        name: name.to_string(),
    }
}

pub fn people() -> Vec<Person> {
    vec![person(1, "Ann"), person(2, "Bob"), person(3, "Ann")]
}

pub fn services(store: Arc<MemoryBookStore>) -> Services {
    Services::with_stores(
        store,
        Arc::new(MemoryDirectory::with(people())),
        OverduePolicy::default(),
    )
}

pub fn router(store: Arc<MemoryBookStore>) -> axum::Router {
    api::create_router(AppState {
        services: Arc::new(services(store)),
    })
}

/// Owner and issuance time are either both present or both absent
pub fn issuance_pairs_hold(store: &MemoryBookStore) -> bool {
    store
        .snapshot()
        .iter()
        .all(|b| b.owner().is_some() == b.issued_at().is_some())
}
