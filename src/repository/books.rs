//! Book inventory repository for database operations

use sqlx::{Pool, Sqlite, SqliteConnection};

use super::returned_row;
use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook},
};

const BOOK_COLUMNS: &str =
    "isbn, lib_id, title, authors, publisher, version, total_copies, available_copies";

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Sqlite>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn get_by_isbn(&self, isbn: &str) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(&format!("SELECT {} FROM book_inventory WHERE isbn = ?", BOOK_COLUMNS))
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with ISBN {} not found", isbn)))
    }

    pub async fn isbn_exists(&self, isbn: &str) -> AppResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_inventory WHERE isbn = ?")
            .bind(isbn)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    pub async fn list(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(&format!("SELECT {} FROM book_inventory ORDER BY title", BOOK_COLUMNS))
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    /// Books with at least one copy on the shelf, optionally for one library
    pub async fn list_available(&self, lib_id: Option<i64>) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(&format!(
            r#"
            SELECT {} FROM book_inventory
            WHERE available_copies > 0 AND (? IS NULL OR lib_id = ?)
            ORDER BY title
            "#,
            BOOK_COLUMNS
        ))
        .bind(lib_id)
        .bind(lib_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// Insert a new title; a taken ISBN is reported as a conflict
    pub async fn create(&self, book: &CreateBook, available_copies: i64) -> AppResult<Book> {
        let result = sqlx::query_as::<_, Book>(&format!(
            r#"
            INSERT INTO book_inventory (isbn, lib_id, title, authors, publisher, version, total_copies, available_copies)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(&book.isbn)
        .bind(book.lib_id)
        .bind(&book.title)
        .bind(&book.authors)
        .bind(&book.publisher)
        .bind(&book.version)
        .bind(book.total_copies)
        .bind(available_copies)
        .fetch_all(&self.pool)
        .await;

        match result {
            Ok(rows) => returned_row(rows),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::Conflict(
                format!("Book with ISBN {} already exists", book.isbn),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Write `book` back only if its copy counts still match `expected`.
    /// Returns `None` when a concurrent change got there first.
    pub async fn update_if_unchanged(&self, book: &Book, expected: &Book) -> AppResult<Option<Book>> {
        let updated = sqlx::query_as::<_, Book>(&format!(
            r#"
            UPDATE book_inventory SET
                lib_id = ?, title = ?, authors = ?, publisher = ?, version = ?,
                total_copies = ?, available_copies = ?
            WHERE isbn = ? AND total_copies = ? AND available_copies = ?
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(book.lib_id)
        .bind(&book.title)
        .bind(&book.authors)
        .bind(&book.publisher)
        .bind(&book.version)
        .bind(book.total_copies)
        .bind(book.available_copies)
        .bind(&expected.isbn)
        .bind(expected.total_copies)
        .bind(expected.available_copies)
        .fetch_all(&self.pool)
        .await?;
        Ok(updated.into_iter().next())
    }

    pub async fn delete(&self, isbn: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM book_inventory WHERE isbn = ?")
            .bind(isbn)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with ISBN {} not found", isbn)));
        }
        Ok(())
    }

    /// Take one copy off the shelf. Returns false when none is available.
    pub async fn take_copy(conn: &mut SqliteConnection, isbn: &str) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE book_inventory SET available_copies = available_copies - 1
            WHERE isbn = ? AND available_copies > 0
            "#,
        )
        .bind(isbn)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Put one copy back, never exceeding `total_copies`. Returns false if the
    /// book no longer exists.
    pub async fn restore_copy(conn: &mut SqliteConnection, isbn: &str) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE book_inventory SET available_copies = MIN(available_copies + 1, total_copies)
            WHERE isbn = ?
            "#,
        )
        .bind(isbn)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
