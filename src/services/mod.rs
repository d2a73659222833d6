//! Business logic services

pub mod auth;
pub mod books;
pub mod lending;
pub mod libraries;
pub mod users;

use crate::{config::AppConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub libraries: libraries::LibrariesService,
    pub users: users::UsersService,
    pub books: books::BooksService,
    pub lending: lending::LendingService,
    pub repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> AppResult<Self> {
        let auth = auth::AuthService::new(repository.clone(), &config.auth)?;

        Ok(Self {
            libraries: libraries::LibrariesService::new(repository.clone()),
            users: users::UsersService::new(repository.clone(), auth.clone()),
            books: books::BooksService::new(repository.clone()),
            lending: lending::LendingService::new(repository.clone(), &config.lending)?,
            auth,
            repository,
        })
    }
}
