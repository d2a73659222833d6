//! Book inventory model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// One title held by a library, keyed by ISBN
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub isbn: String,
    pub lib_id: i64,
    pub title: String,
    pub authors: Option<String>,
    pub publisher: Option<String>,
    pub version: Option<String>,
    pub total_copies: i64,
    /// Copies not currently on loan, `0 <= available_copies <= total_copies`
    pub available_copies: i64,
}

impl Book {
    pub fn copies_on_loan(&self) -> i64 {
        self.total_copies - self.available_copies
    }
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "ISBN is required"))]
    pub isbn: String,
    pub lib_id: i64,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub authors: Option<String>,
    pub publisher: Option<String>,
    pub version: Option<String>,
    #[validate(range(min = 0, message = "total_copies cannot be negative"))]
    pub total_copies: i64,
    /// Defaults to `total_copies`
    #[validate(range(min = 0, message = "available_copies cannot be negative"))]
    pub available_copies: Option<i64>,
}

/// Update book request; absent fields keep their value
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    pub lib_id: Option<i64>,
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,
    pub authors: Option<String>,
    pub publisher: Option<String>,
    pub version: Option<String>,
    #[validate(range(min = 0, message = "total_copies cannot be negative"))]
    pub total_copies: Option<i64>,
    #[validate(range(min = 0, message = "available_copies cannot be negative"))]
    pub available_copies: Option<i64>,
}

/// Book list filters
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct BookQuery {
    pub lib_id: Option<i64>,
}
