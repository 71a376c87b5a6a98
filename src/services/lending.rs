//! Lending service: listings, ownership and issuance of books

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::{
    config::DEFAULT_PERIOD_DAYS,
    error::{AppError, AppResult},
    models::{
        book::{Book, FindCriteria, Issuance, ListingQuery, PageRequest},
        person::Person,
    },
    repository::BookStore,
};

/// Decides when an issued book counts as overdue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverduePolicy {
    pub lending_period: Duration,
}

impl OverduePolicy {
    pub fn new(lending_period: Duration) -> Self {
        Self { lending_period }
    }

    pub fn is_overdue(&self, book: &Book, now: DateTime<Utc>) -> bool {
        book.issued_at()
            .map(|issued_at| now - issued_at > self.lending_period)
            .unwrap_or(false)
    }
}

impl Default for OverduePolicy {
    fn default() -> Self {
        Self::new(Duration::days(DEFAULT_PERIOD_DAYS))
    }
}

/// Result of a title search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleSearch {
    /// No search term was given
    Unset,
    /// Books whose title starts with the term, possibly none
    Matches(Vec<Book>),
}

impl TitleSearch {
    pub fn into_books(self) -> Option<Vec<Book>> {
        match self {
            TitleSearch::Unset => None,
            TitleSearch::Matches(books) => Some(books),
        }
    }
}

type ListingRule = fn(&ListingQuery) -> Option<FindCriteria>;

/// Listing parameter interpretation, evaluated in order; the first rule that
/// yields criteria wins. Sorting with only one of page/page_size given falls
/// through to the unsorted full listing.
const LISTING_RULES: [ListingRule; 4] = [sorted_page, sorted_all, page_only, everything];

fn sorted(query: &ListingQuery) -> bool {
    query.sort_by_year.unwrap_or(false)
}

fn paging(query: &ListingQuery) -> Option<PageRequest> {
    match (query.page, query.page_size) {
        (Some(index), Some(size)) => Some(PageRequest { index, size }),
        _ => None,
    }
}

fn sorted_page(query: &ListingQuery) -> Option<FindCriteria> {
    if !sorted(query) {
        return None;
    }
    paging(query).map(|page| FindCriteria {
        page: Some(page),
        sort_by_year: true,
    })
}

fn sorted_all(query: &ListingQuery) -> Option<FindCriteria> {
    (sorted(query) && query.page.is_none() && query.page_size.is_none()).then_some(FindCriteria {
        page: None,
        sort_by_year: true,
    })
}

fn page_only(query: &ListingQuery) -> Option<FindCriteria> {
    paging(query).map(|page| FindCriteria {
        page: Some(page),
        sort_by_year: false,
    })
}

fn everything(_query: &ListingQuery) -> Option<FindCriteria> {
    Some(FindCriteria::default())
}

/// Resolve listing parameters to store criteria
pub fn listing_criteria(query: &ListingQuery) -> FindCriteria {
    LISTING_RULES
        .iter()
        .find_map(|rule| rule(query))
        .unwrap_or_default()
}

#[derive(Clone)]
pub struct LendingService {
    books: Arc<dyn BookStore>,
    policy: OverduePolicy,
}

impl LendingService {
    pub fn new(books: Arc<dyn BookStore>, policy: OverduePolicy) -> Self {
        Self { books, policy }
    }

    fn with_overdue(&self, mut book: Book, now: DateTime<Utc>) -> Book {
        book.overdue = self.policy.is_overdue(&book, now);
        book
    }

    fn all_with_overdue(&self, books: Vec<Book>) -> Vec<Book> {
        let now = Utc::now();
        books
            .into_iter()
            .map(|book| self.with_overdue(book, now))
            .collect()
    }

    /// List books, optionally paginated and/or sorted by publish year
    pub async fn find_all(&self, query: &ListingQuery) -> AppResult<Vec<Book>> {
        let criteria = listing_criteria(query);
        tracing::debug!(?criteria, "Listing books");
        let books = self.books.find_all(criteria).await?;
        Ok(self.all_with_overdue(books))
    }

    /// Get a book by ID, `None` when absent
    pub async fn find_one(&self, id: i32) -> AppResult<Option<Book>> {
        let book = self.books.find_by_id(id).await?;
        Ok(book.map(|b| self.with_overdue(b, Utc::now())))
    }

    /// Search books by title prefix
    pub async fn find_by_title(&self, prefix: Option<&str>) -> AppResult<TitleSearch> {
        let Some(prefix) = prefix else {
            return Ok(TitleSearch::Unset);
        };
        let books = self.books.find_by_title_prefix(prefix).await?;
        Ok(TitleSearch::Matches(self.all_with_overdue(books)))
    }

    /// Insert a new book or overwrite the one with the same ID
    pub async fn save(&self, book: Book) -> AppResult<Book> {
        let saved = self.books.save(book).await?;
        tracing::info!("Saved book id={:?} title={:?}", saved.id, saved.title);
        Ok(self.with_overdue(saved, Utc::now()))
    }

    /// Replace title, author and year of an existing book.
    ///
    /// The ID comes from the caller, never from `data`, and the current
    /// owner and issuance time are kept.
    pub async fn update(&self, id: i32, data: Book) -> AppResult<Book> {
        let updated = self
            .books
            .update_details(id, &data)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        tracing::info!("Updated book id={}", id);
        Ok(self.with_overdue(updated, Utc::now()))
    }

    /// Delete a book, succeeding when it does not exist
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.books.delete_by_id(id).await?;
        tracing::info!("Deleted book id={}", id);
        Ok(())
    }

    /// Current holder of a book, `None` when missing or on the shelf
    pub async fn get_owner(&self, id: i32) -> AppResult<Option<Person>> {
        let book = self.books.find_by_id(id).await?;
        Ok(book.and_then(|b| b.issuance).map(|i| i.owner))
    }

    /// Put a book back on the shelf
    pub async fn release(&self, id: i32) -> AppResult<()> {
        if self.books.set_issuance(id, None).await? {
            tracing::info!("Released book id={}", id);
        } else {
            tracing::debug!("Release of missing book id={} ignored", id);
        }
        Ok(())
    }

    /// Lend a book to a person, replacing any current holder
    pub async fn assign(&self, id: i32, person: Person) -> AppResult<()> {
        let person_id = person.id;
        let issuance = Issuance {
            owner: person,
            issued_at: Utc::now(),
        };

        if self.books.set_issuance(id, Some(issuance)).await? {
            tracing::info!("Assigned book id={} to person id={}", id, person_id);
        } else {
            tracing::debug!("Assignment of missing book id={} ignored", id);
        }
        Ok(())
    }

    /// Check that the store answers
    pub async fn ping(&self) -> AppResult<()> {
        self.books.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::books::MockBookStore;
    use mockall::predicate::eq;

    fn query(page: Option<u32>, page_size: Option<u32>, sort_by_year: Option<bool>) -> ListingQuery {
        ListingQuery {
            page,
            page_size,
            sort_by_year,
        }
    }

    fn stored(id: i32, title: &str, year: i32) -> Book {
        let mut book = Book::new(title, "Some Author", year);
        book.id = Some(id);
        book
    }

    fn person(id: i32, name: &str) -> Person {
        Person {
            id,
            name: name.to_string(),
        }
    }

    fn service(store: MockBookStore) -> LendingService {
        LendingService::new(Arc::new(store), OverduePolicy::default())
    }

    #[test]
    fn sorted_with_paging_is_a_sorted_page() {
        let criteria = listing_criteria(&query(Some(0), Some(2), Some(true)));
        assert_eq!(criteria.page, Some(PageRequest { index: 0, size: 2 }));
        assert!(criteria.sort_by_year);
    }

    #[test]
    fn sorted_without_paging_is_a_sorted_full_listing() {
        let criteria = listing_criteria(&query(None, None, Some(true)));
        assert_eq!(criteria, FindCriteria { page: None, sort_by_year: true });
    }

    #[test]
    fn paging_without_sort_is_unsorted_page() {
        let criteria = listing_criteria(&query(Some(1), Some(5), None));
        assert_eq!(criteria.page, Some(PageRequest { index: 1, size: 5 }));
        assert!(!criteria.sort_by_year);

        let criteria = listing_criteria(&query(Some(1), Some(5), Some(false)));
        assert!(!criteria.sort_by_year);
    }

    #[test]
    fn sorted_with_half_paging_falls_through_unsorted() {
        assert_eq!(listing_criteria(&query(Some(1), None, Some(true))), FindCriteria::default());
        assert_eq!(listing_criteria(&query(None, Some(3), Some(true))), FindCriteria::default());
    }

    #[test]
    fn no_parameters_is_everything() {
        assert_eq!(listing_criteria(&ListingQuery::default()), FindCriteria::default());
    }

    #[test]
    fn overdue_only_after_lending_period() {
        let policy = OverduePolicy::new(Duration::days(10));
        let now = Utc::now();

        let mut book = stored(1, "Dune", 1965);
        assert!(!policy.is_overdue(&book, now));

        book.issuance = Some(Issuance {
            owner: person(1, "Ann"),
            issued_at: now - Duration::days(10),
        });
        assert!(!policy.is_overdue(&book, now));

        book.issuance = Some(Issuance {
            owner: person(1, "Ann"),
            issued_at: now - Duration::days(11),
        });
        assert!(policy.is_overdue(&book, now));
    }

    #[tokio::test]
    async fn find_all_forwards_resolved_criteria() {
        let mut store = MockBookStore::new();
        store
            .expect_find_all()
            .with(eq(FindCriteria {
                page: Some(PageRequest { index: 0, size: 2 }),
                sort_by_year: true,
            }))
            .times(1)
            .returning(|_| Ok(vec![stored(2, "B", 1999), stored(3, "C", 2010)]));

        let books = service(store)
            .find_all(&query(Some(0), Some(2), Some(true)))
            .await
            .unwrap();
        assert_eq!(books.len(), 2);
    }

    #[tokio::test]
    async fn find_one_marks_overdue_books() {
        let mut store = MockBookStore::new();
        store.expect_find_by_id().with(eq(1)).returning(|_| {
            let mut book = stored(1, "Dune", 1965);
            book.issuance = Some(Issuance {
                owner: person(4, "Ann"),
                issued_at: Utc::now() - Duration::days(30),
            });
            Ok(Some(book))
        });

        let book = service(store).find_one(1).await.unwrap().unwrap();
        assert!(book.overdue);
    }

    #[tokio::test]
    async fn find_one_absent_is_none() {
        let mut store = MockBookStore::new();
        store.expect_find_by_id().returning(|_| Ok(None));

        assert!(service(store).find_one(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn title_search_without_term_does_not_hit_the_store() {
        let mut store = MockBookStore::new();
        store.expect_find_by_title_prefix().never();

        let result = service(store).find_by_title(None).await.unwrap();
        assert_eq!(result, TitleSearch::Unset);
    }

    #[tokio::test]
    async fn empty_title_term_is_forwarded() {
        let mut store = MockBookStore::new();
        store
            .expect_find_by_title_prefix()
            .withf(|prefix| prefix.is_empty())
            .times(1)
            .returning(|_| Ok(vec![]));

        let result = service(store).find_by_title(Some("")).await.unwrap();
        assert_eq!(result, TitleSearch::Matches(vec![]));
        assert_eq!(result.into_books(), Some(vec![]));
    }

    #[tokio::test]
    async fn update_missing_book_is_not_found() {
        let mut store = MockBookStore::new();
        store.expect_update_details().times(1).returning(|_, _| Ok(None));
        store.expect_save().never();

        let err = service(store)
            .update(7, Book::new("Dune", "Frank Herbert", 1965))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_writes_details_only_under_path_id() {
        let issued_at = Utc::now();
        let mut store = MockBookStore::new();
        store.expect_find_by_id().never();
        store.expect_save().never();
        store
            .expect_update_details()
            .withf(|id, details| *id == 7 && details.title == "New" && details.publish_year == 2001)
            .times(1)
            .returning(move |id, details| {
                let mut book = stored(id, &details.title, details.publish_year);
                book.issuance = Some(Issuance {
                    owner: person(1, "Ann"),
                    issued_at,
                });
                Ok(Some(book))
            });

        let mut data = stored(99, "New", 2001);
        data.issuance = Some(Issuance {
            owner: person(2, "Bob"),
            issued_at: Utc::now(),
        });

        let updated = service(store).update(7, data).await.unwrap();
        assert_eq!(updated.id, Some(7));
        assert_eq!(updated.owner().map(|p| p.name.as_str()), Some("Ann"));
        assert_eq!(updated.issued_at(), Some(issued_at));
    }

    #[tokio::test]
    async fn release_clears_owner_and_issuance_together() {
        let mut store = MockBookStore::new();
        store.expect_find_by_id().never();
        store.expect_save().never();
        store
            .expect_set_issuance()
            .withf(|id, issuance| *id == 3 && issuance.is_none())
            .times(1)
            .returning(|_, _| Ok(true));

        service(store).release(3).await.unwrap();
    }

    #[tokio::test]
    async fn release_and_assign_of_missing_book_are_noops() {
        let mut store = MockBookStore::new();
        store.expect_set_issuance().times(2).returning(|_, _| Ok(false));
        store.expect_save().never();

        let service = service(store);
        service.release(5).await.unwrap();
        service.assign(5, person(1, "Ann")).await.unwrap();
    }

    #[tokio::test]
    async fn assign_stamps_issuance_time() {
        let before = Utc::now();
        let mut store = MockBookStore::new();
        store.expect_find_by_id().never();
        store
            .expect_set_issuance()
            .withf(move |id, issuance| {
                *id == 3
                    && issuance
                        .as_ref()
                        .map(|i| i.owner.id == 8 && i.issued_at >= before)
                        .unwrap_or(false)
            })
            .times(1)
            .returning(|_, _| Ok(true));

        service(store).assign(3, person(8, "Cleo")).await.unwrap();
    }

    #[tokio::test]
    async fn get_owner_collapses_missing_and_unowned() {
        let mut store = MockBookStore::new();
        store.expect_find_by_id().with(eq(1)).returning(|_| Ok(None));
        store
            .expect_find_by_id()
            .with(eq(2))
            .returning(|_| Ok(Some(stored(2, "Dune", 1965))));

        let service = service(store);
        assert!(service.get_owner(1).await.unwrap().is_none());
        assert!(service.get_owner(2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn store_failures_propagate() {
        let mut store = MockBookStore::new();
        store
            .expect_delete_by_id()
            .returning(|_| Err(AppError::Database(sqlx::Error::PoolTimedOut)));

        let err = service(store).delete(1).await.unwrap_err();
        assert!(matches!(err, AppError::Database(sqlx::Error::PoolTimedOut)));
    }
}
