//! Library management endpoints (owner)

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::library::{CreateLibrary, Library, UpdateLibrary},
    AppState,
};

use super::{PathParams, ValidatedJson};

/// Confirmation body for deletions
#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// Create a library
#[utoipa::path(
    post,
    path = "/owner/library",
    tag = "libraries",
    security(("basic_auth" = [])),
    request_body = CreateLibrary,
    responses(
        (status = 201, description = "Library created", body = Library),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Owner role required")
    )
)]
pub async fn create_library(
    State(state): State<AppState>,
    ValidatedJson(library): ValidatedJson<CreateLibrary>,
) -> AppResult<(StatusCode, Json<Library>)> {
    let created = state.services.libraries.create(&library).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// List libraries
#[utoipa::path(
    get,
    path = "/library",
    tag = "libraries",
    security(("basic_auth" = [])),
    responses(
        (status = 200, description = "All libraries", body = Vec<Library>)
    )
)]
pub async fn list_libraries(State(state): State<AppState>) -> AppResult<Json<Vec<Library>>> {
    Ok(Json(state.services.libraries.list().await?))
}

/// Get a library by ID
#[utoipa::path(
    get,
    path = "/library/{id}",
    tag = "libraries",
    security(("basic_auth" = [])),
    params(("id" = i64, Path, description = "Library ID")),
    responses(
        (status = 200, description = "Library", body = Library),
        (status = 404, description = "Library not found")
    )
)]
pub async fn get_library(State(state): State<AppState>, PathParams(id): PathParams<i64>) -> AppResult<Json<Library>> {
    Ok(Json(state.services.libraries.get_by_id(id).await?))
}

/// Rename a library
#[utoipa::path(
    put,
    path = "/library/{id}",
    tag = "libraries",
    security(("basic_auth" = [])),
    params(("id" = i64, Path, description = "Library ID")),
    request_body = UpdateLibrary,
    responses(
        (status = 200, description = "Library updated", body = Library),
        (status = 404, description = "Library not found")
    )
)]
pub async fn update_library(
    State(state): State<AppState>,
    PathParams(id): PathParams<i64>,
    ValidatedJson(library): ValidatedJson<UpdateLibrary>,
) -> AppResult<Json<Library>> {
    Ok(Json(state.services.libraries.update(id, &library).await?))
}

/// Delete a library without users or books
#[utoipa::path(
    delete,
    path = "/library/{id}",
    tag = "libraries",
    security(("basic_auth" = [])),
    params(("id" = i64, Path, description = "Library ID")),
    responses(
        (status = 200, description = "Library deleted", body = MessageResponse),
        (status = 404, description = "Library not found"),
        (status = 409, description = "Library still has users or books")
    )
)]
pub async fn delete_library(
    State(state): State<AppState>,
    PathParams(id): PathParams<i64>,
) -> AppResult<Json<MessageResponse>> {
    state.services.libraries.delete(id).await?;
    Ok(MessageResponse::new("Library deleted"))
}
