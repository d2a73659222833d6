//! Book inventory service

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list().await
    }

    pub async fn list_available(&self, lib_id: Option<i64>) -> AppResult<Vec<Book>> {
        self.repository.books.list_available(lib_id).await
    }

    pub async fn get_by_isbn(&self, isbn: &str) -> AppResult<Book> {
        self.repository.books.get_by_isbn(isbn).await
    }

    pub async fn create(&self, book: CreateBook) -> AppResult<Book> {
        let available_copies = book.available_copies.unwrap_or(book.total_copies);
        check_copy_bounds(book.total_copies, available_copies)?;

        if self.repository.books.isbn_exists(&book.isbn).await? {
            return Err(AppError::Conflict(format!("Book with ISBN {} already exists", book.isbn)));
        }
        if !self.repository.libraries.exists(book.lib_id).await? {
            return Err(AppError::NotFound(format!("Library with id {} not found", book.lib_id)));
        }

        let created = self.repository.books.create(&book, available_copies).await?;
        tracing::info!(isbn = %created.isbn, copies = created.total_copies, "book created");
        Ok(created)
    }

    /// Apply a partial update. Changing only `total_copies` keeps the number
    /// of copies on loan and shifts `available_copies` by the same amount.
    pub async fn update(&self, isbn: &str, data: UpdateBook) -> AppResult<Book> {
        let current = self.repository.books.get_by_isbn(isbn).await?;

        if let Some(lib_id) = data.lib_id {
            if !self.repository.libraries.exists(lib_id).await? {
                return Err(AppError::NotFound(format!("Library with id {} not found", lib_id)));
            }
        }

        let updated = merge_update(&current, data);
        check_copy_bounds(updated.total_copies, updated.available_copies)?;

        self.repository
            .books
            .update_if_unchanged(&updated, &current)
            .await?
            .ok_or_else(|| {
                AppError::Conflict(format!(
                    "Copies of {} changed while updating, retry the request",
                    isbn
                ))
            })
    }

    /// Delete a book with no copy on loan
    pub async fn delete(&self, isbn: &str) -> AppResult<()> {
        self.repository.books.get_by_isbn(isbn).await?;

        let on_loan = self.repository.issues.count_on_loan_for_book(isbn).await?;
        if on_loan > 0 {
            return Err(AppError::Conflict(format!(
                "Book {} still has {} copy(ies) on loan",
                isbn, on_loan
            )));
        }

        self.repository.books.delete(isbn).await
    }
}

fn check_copy_bounds(total_copies: i64, available_copies: i64) -> AppResult<()> {
    if total_copies < 0 || available_copies < 0 || available_copies > total_copies {
        return Err(AppError::Validation(format!(
            "available_copies ({}) must be between 0 and total_copies ({})",
            available_copies, total_copies
        )));
    }
    Ok(())
}

fn merge_update(current: &Book, data: UpdateBook) -> Book {
    let total_copies = data.total_copies.unwrap_or(current.total_copies);
    let available_copies = data
        .available_copies
        .unwrap_or(total_copies - current.copies_on_loan());

    Book {
        isbn: current.isbn.clone(),
        lib_id: data.lib_id.unwrap_or(current.lib_id),
        title: data.title.unwrap_or_else(|| current.title.clone()),
        authors: data.authors.or_else(|| current.authors.clone()),
        publisher: data.publisher.or_else(|| current.publisher.clone()),
        version: data.version.or_else(|| current.version.clone()),
        total_copies,
        available_copies,
    }
}
