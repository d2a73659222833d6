//! User model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::{enums::Role, issue::Issue, request::RequestEvent};

/// Full user model from database
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct User {
    pub id: i64,
    pub name: String,
    /// Lookup key for authentication
    pub email: String,
    pub contact: Option<String>,
    pub role: Role,
    pub lib_id: i64,
    /// Argon2 PHC string
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub crea_date: Option<DateTime<Utc>>,
    pub modif_date: Option<DateTime<Utc>>,
}

/// Create user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    pub contact: Option<String>,
    pub role: Role,
    pub lib_id: i64,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Update user request; absent fields keep their value
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    pub contact: Option<String>,
    pub role: Option<Role>,
    pub lib_id: Option<i64>,
    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: Option<String>,
}

/// Reader profile with lending history, for admins
#[derive(Debug, Serialize, ToSchema)]
pub struct ReaderDetails {
    pub reader: User,
    pub issues: Vec<Issue>,
    pub requests: Vec<RequestEvent>,
}
