//! Users repository for database operations

use chrono::Utc;
use sqlx::{Pool, Sqlite, SqliteConnection};

use super::returned_row;
use crate::{
    error::{AppError, AppResult},
    models::{
        enums::Role,
        user::{CreateUser, UpdateUser, User},
    },
};

const USER_COLUMNS: &str =
    "id, name, email, contact, role, lib_id, password_hash, crea_date, modif_date";

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Sqlite>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<User> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get user by email (authentication lookup, case-insensitive)
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = ? COLLATE NOCASE ORDER BY id LIMIT 1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Check if email already exists
    pub async fn email_exists(&self, email: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE email = ? COLLATE NOCASE AND id != ?",
        )
        .bind(email)
        .bind(exclude_id.unwrap_or(0))
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    /// Find a user holding `role` in library `lib_id` with the given email
    pub async fn find_member(&self, email: &str, role: Role, lib_id: i64) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = ? COLLATE NOCASE AND role = ? AND lib_id = ?",
            USER_COLUMNS
        ))
        .bind(email)
        .bind(role)
        .bind(lib_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Role of user `id`, read inside the caller's transaction
    pub async fn role_of(conn: &mut SqliteConnection, id: i64) -> AppResult<Option<Role>> {
        let role: Vec<Role> = sqlx::query_scalar("SELECT role FROM users WHERE id = ?")
            .bind(id)
            .fetch_all(conn)
            .await?;
        Ok(role.into_iter().next())
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS))
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    /// Create a new user with an already hashed password
    pub async fn create(&self, user: &CreateUser, password_hash: &str) -> AppResult<User> {
        let now = Utc::now();

        let created = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, contact, role, lib_id, password_hash, crea_date, modif_date)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.contact)
        .bind(user.role)
        .bind(user.lib_id)
        .bind(password_hash)
        .bind(now)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        returned_row(created)
    }

    /// Update a user; `password_hash` replaces the stored hash when present
    pub async fn update(&self, id: i64, user: &UpdateUser, password_hash: Option<&str>) -> AppResult<User> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET
                name = COALESCE(?, name),
                email = COALESCE(?, email),
                contact = COALESCE(?, contact),
                role = COALESCE(?, role),
                lib_id = COALESCE(?, lib_id),
                password_hash = COALESCE(?, password_hash),
                modif_date = ?
            WHERE id = ?
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.contact)
        .bind(user.role)
        .bind(user.lib_id)
        .bind(password_hash)
        .bind(Utc::now())
        .bind(id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }
        Ok(())
    }
}
