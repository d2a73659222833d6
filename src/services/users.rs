//! User management service

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::Role,
        user::{CreateUser, ReaderDetails, UpdateUser, User},
    },
    repository::Repository,
    services::auth::AuthService,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    auth: AuthService,
}

impl UsersService {
    pub fn new(repository: Repository, auth: AuthService) -> Self {
        Self { repository, auth }
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        self.repository.users.list().await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    pub async fn create(&self, user: CreateUser) -> AppResult<User> {
        if self.repository.users.email_exists(&user.email, None).await? {
            return Err(AppError::Conflict(format!("Email {} is already in use", user.email)));
        }
        if !self.repository.libraries.exists(user.lib_id).await? {
            return Err(AppError::NotFound(format!("Library with id {} not found", user.lib_id)));
        }

        let password_hash = self.auth.hash_password(&user.password)?;
        let created = self.repository.users.create(&user, &password_hash).await?;

        tracing::info!(user_id = created.id, role = %created.role, "user created");
        Ok(created)
    }

    pub async fn update(&self, id: i64, user: UpdateUser) -> AppResult<User> {
        self.repository.users.get_by_id(id).await?;

        if let Some(ref email) = user.email {
            if self.repository.users.email_exists(email, Some(id)).await? {
                return Err(AppError::Conflict(format!("Email {} is already in use", email)));
            }
        }
        if let Some(lib_id) = user.lib_id {
            if !self.repository.libraries.exists(lib_id).await? {
                return Err(AppError::NotFound(format!("Library with id {} not found", lib_id)));
            }
        }

        let password_hash = user
            .password
            .as_deref()
            .map(|password| self.auth.hash_password(password))
            .transpose()?;

        self.repository
            .users
            .update(id, &user, password_hash.as_deref())
            .await
    }

    /// Delete a user with no book on loan and no pending request
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.repository.users.get_by_id(id).await?;

        let on_loan = self.repository.issues.count_on_loan_for_reader(id).await?;
        if on_loan > 0 {
            return Err(AppError::Conflict(format!(
                "User {} still has {} book(s) on loan",
                id, on_loan
            )));
        }

        let pending = self.repository.requests.count_pending_for_reader(id).await?;
        if pending > 0 {
            return Err(AppError::Conflict(format!(
                "User {} still has {} pending request(s)",
                id, pending
            )));
        }

        self.repository.users.delete(id).await
    }

    /// Reader record with their issues and requests
    pub async fn reader_details(&self, reader_id: i64) -> AppResult<ReaderDetails> {
        let reader = self.repository.users.get_by_id(reader_id).await?;
        if reader.role != Role::Reader {
            return Err(AppError::NotFound(format!("Reader with id {} not found", reader_id)));
        }

        let issues = self.repository.issues.list_by_reader(reader_id).await?;
        let requests = self.repository.requests.list_by_reader(reader_id).await?;

        Ok(ReaderDetails { reader, issues, requests })
    }
}
