//! User management endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::user::{CreateUser, ReaderDetails, UpdateUser, User},
    AppState,
};

use super::{libraries::MessageResponse, PathParams, ValidatedJson};

/// List users
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("basic_auth" = [])),
    responses(
        (status = 200, description = "All users", body = Vec<User>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Owner role required")
    )
)]
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.services.users.list().await?))
}

/// Get user details by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    security(("basic_auth" = [])),
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = User),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(State(state): State<AppState>, PathParams(id): PathParams<i64>) -> AppResult<Json<User>> {
    Ok(Json(state.services.users.get_by_id(id).await?))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/owner/users",
    tag = "users",
    security(("basic_auth" = [])),
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Library not found"),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(user): ValidatedJson<CreateUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    let created = state.services.users.create(user).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update an existing user
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    security(("basic_auth" = [])),
    params(("id" = i64, Path, description = "User ID")),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    PathParams(id): PathParams<i64>,
    ValidatedJson(user): ValidatedJson<UpdateUser>,
) -> AppResult<Json<User>> {
    Ok(Json(state.services.users.update(id, user).await?))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    security(("basic_auth" = [])),
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 404, description = "User not found"),
        (status = 409, description = "User has books on loan")
    )
)]
pub async fn delete_user(State(state): State<AppState>, PathParams(id): PathParams<i64>) -> AppResult<Json<MessageResponse>> {
    state.services.users.delete(id).await?;
    Ok(MessageResponse::new("User deleted"))
}

/// Reader profile with issues and requests
#[utoipa::path(
    get,
    path = "/admin/readers/{reader_id}",
    tag = "users",
    security(("basic_auth" = [])),
    params(("reader_id" = i64, Path, description = "Reader user ID")),
    responses(
        (status = 200, description = "Reader details", body = ReaderDetails),
        (status = 404, description = "Reader not found")
    )
)]
pub async fn get_reader(
    State(state): State<AppState>,
    PathParams(reader_id): PathParams<i64>,
) -> AppResult<Json<ReaderDetails>> {
    Ok(Json(state.services.users.reader_details(reader_id).await?))
}
