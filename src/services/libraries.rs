//! Library management service

use crate::{
    error::{AppError, AppResult},
    models::library::{CreateLibrary, Library, UpdateLibrary},
    repository::Repository,
};

#[derive(Clone)]
pub struct LibrariesService {
    repository: Repository,
}

impl LibrariesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Library>> {
        self.repository.libraries.list().await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Library> {
        self.repository.libraries.get_by_id(id).await
    }

    pub async fn create(&self, data: &CreateLibrary) -> AppResult<Library> {
        let library = self.repository.libraries.create(data.name.trim()).await?;
        tracing::info!(library_id = library.id, "library created");
        Ok(library)
    }

    pub async fn update(&self, id: i64, data: &UpdateLibrary) -> AppResult<Library> {
        self.repository.libraries.update(id, data.name.trim()).await
    }

    /// Delete a library that no user or book refers to
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.repository.libraries.get_by_id(id).await?;

        let (users, books) = self.repository.libraries.count_dependents(id).await?;
        if users > 0 || books > 0 {
            return Err(AppError::Conflict(format!(
                "Library {} still has {} user(s) and {} book(s)",
                id, users, books
            )));
        }

        self.repository.libraries.delete(id).await
    }
}
