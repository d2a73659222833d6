//! Libraries repository for database operations

use sqlx::{Pool, Sqlite};

use super::returned_row;
use crate::{
    error::{AppError, AppResult},
    models::library::Library,
};

#[derive(Clone)]
pub struct LibrariesRepository {
    pool: Pool<Sqlite>,
}

impl LibrariesRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> AppResult<Vec<Library>> {
        let libraries = sqlx::query_as::<_, Library>("SELECT id, name FROM libraries ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(libraries)
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Library> {
        sqlx::query_as::<_, Library>("SELECT id, name FROM libraries WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Library with id {} not found", id)))
    }

    pub async fn exists(&self, id: i64) -> AppResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM libraries WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    pub async fn create(&self, name: &str) -> AppResult<Library> {
        let library = sqlx::query_as::<_, Library>(
            "INSERT INTO libraries (name) VALUES (?) RETURNING id, name",
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await?;
        returned_row(library)
    }

    pub async fn update(&self, id: i64, name: &str) -> AppResult<Library> {
        sqlx::query_as::<_, Library>("UPDATE libraries SET name = ? WHERE id = ? RETURNING id, name")
            .bind(name)
            .bind(id)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Library with id {} not found", id)))
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM libraries WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Library with id {} not found", id)));
        }
        Ok(())
    }

    /// Number of users and books attached to the library
    pub async fn count_dependents(&self, id: i64) -> AppResult<(i64, i64)> {
        let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE lib_id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        let books: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_inventory WHERE lib_id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok((users, books))
    }
}
