//! Book catalog store

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::book::{Book, BookRow, FindCriteria, Issuance},
};

const SELECT_BOOK: &str = r#"
    SELECT b.id, b.title, b.author_name, b.publish_year,
           b.person_id, p.name AS person_name, b.issuance_time
    FROM book b
    LEFT JOIN person p ON p.id = b.person_id
"#;

/// Escape LIKE wildcards so the prefix matches literally
fn escape_like(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Persistence capabilities the lending service relies on
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn find_all(&self, criteria: FindCriteria) -> AppResult<Vec<Book>>;
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Book>>;
    /// Case-sensitive title prefix match
    async fn find_by_title_prefix(&self, prefix: &str) -> AppResult<Vec<Book>>;
    /// Insert when `book.id` is `None`, otherwise overwrite every column
    async fn save(&self, book: Book) -> AppResult<Book>;
    /// Overwrite title, author and year only; `None` when no book has this id
    async fn update_details(&self, id: i32, details: &Book) -> AppResult<Option<Book>>;
    /// Set or clear owner and issuance time in one write; false when no book has this id
    async fn set_issuance(&self, id: i32, issuance: Option<Issuance>) -> AppResult<bool>;
    async fn delete_by_id(&self, id: i32) -> AppResult<()>;
    async fn ping(&self) -> AppResult<()>;
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn insert(&self, book: &Book) -> AppResult<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO book (title, author_name, publish_year, person_id, issuance_time)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&book.title)
        .bind(&book.author_name)
        .bind(book.publish_year)
        .bind(book.owner().map(|p| p.id))
        .bind(book.issued_at())
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn overwrite(&self, id: i32, book: &Book) -> AppResult<Option<i32>> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE book
            SET title = $2, author_name = $3, publish_year = $4,
                person_id = $5, issuance_time = $6
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(&book.title)
        .bind(&book.author_name)
        .bind(book.publish_year)
        .bind(book.owner().map(|p| p.id))
        .bind(book.issued_at())
        .fetch_optional(&self.pool)
        .await?;

        Ok(id)
    }
}

#[async_trait]
impl BookStore for BooksRepository {
    async fn find_all(&self, criteria: FindCriteria) -> AppResult<Vec<Book>> {
        let order = if criteria.sort_by_year {
            "b.publish_year, b.id"
        } else {
            "b.id"
        };

        let rows = match criteria.page {
            Some(page) => {
                sqlx::query_as::<_, BookRow>(&format!(
                    "{} ORDER BY {} LIMIT $1 OFFSET $2",
                    SELECT_BOOK, order
                ))
                .bind(i64::from(page.size))
                .bind(page.offset())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, BookRow>(&format!("{} ORDER BY {}", SELECT_BOOK, order))
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Book>> {
        let row = sqlx::query_as::<_, BookRow>(&format!("{} WHERE b.id = $1", SELECT_BOOK))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Book::from))
    }

    async fn find_by_title_prefix(&self, prefix: &str) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, BookRow>(&format!(
            r"{} WHERE b.title LIKE $1 || '%' ESCAPE '\' ORDER BY b.id",
            SELECT_BOOK
        ))
        .bind(escape_like(prefix))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn save(&self, mut book: Book) -> AppResult<Book> {
        let id = match book.id {
            Some(id) => match self.overwrite(id, &book).await? {
                Some(id) => id,
                None => self.insert(&book).await?,
            },
            None => self.insert(&book).await?,
        };

        book.id = Some(id);
        Ok(book)
    }

    async fn update_details(&self, id: i32, details: &Book) -> AppResult<Option<Book>> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            WITH updated AS (
                UPDATE book
                SET title = $2, author_name = $3, publish_year = $4
                WHERE id = $1
                RETURNING id, title, author_name, publish_year, person_id, issuance_time
            )
            SELECT u.id, u.title, u.author_name, u.publish_year,
                   u.person_id, p.name AS person_name, u.issuance_time
            FROM updated u
            LEFT JOIN person p ON p.id = u.person_id
            "#,
        )
        .bind(id)
        .bind(&details.title)
        .bind(&details.author_name)
        .bind(details.publish_year)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Book::from))
    }

    async fn set_issuance(&self, id: i32, issuance: Option<Issuance>) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE book SET person_id = $2, issuance_time = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(issuance.as_ref().map(|i| i.owner.id))
        .bind(issuance.as_ref().map(|i| i.issued_at))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_id(&self, id: i32) -> AppResult<()> {
        sqlx::query("DELETE FROM book WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
