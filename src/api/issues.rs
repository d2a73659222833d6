//! Issue registry endpoints

use axum::{
    extract::State,
    Json,
};

use crate::{
    error::AppResult,
    models::issue::{Issue, OverdueSweep, UpdateIssue},
    AppState,
};

use super::{libraries::MessageResponse, CurrentUser, PathParams, ValidatedJson};

/// List every issue
#[utoipa::path(
    get,
    path = "/issues",
    tag = "issues",
    security(("basic_auth" = [])),
    responses(
        (status = 200, description = "All issues", body = Vec<Issue>)
    )
)]
pub async fn list_issues(State(state): State<AppState>) -> AppResult<Json<Vec<Issue>>> {
    Ok(Json(state.services.lending.list_issues().await?))
}

/// Get an issue by ID
#[utoipa::path(
    get,
    path = "/issues/{issue_id}",
    tag = "issues",
    security(("basic_auth" = [])),
    params(("issue_id" = i64, Path, description = "Issue ID")),
    responses(
        (status = 200, description = "Issue", body = Issue),
        (status = 404, description = "Issue not found")
    )
)]
pub async fn get_issue(State(state): State<AppState>, PathParams(issue_id): PathParams<i64>) -> AppResult<Json<Issue>> {
    Ok(Json(state.services.lending.get_issue(issue_id).await?))
}

/// Move the expected return date of an open issue
#[utoipa::path(
    put,
    path = "/issues/{issue_id}",
    tag = "issues",
    security(("basic_auth" = [])),
    params(("issue_id" = i64, Path, description = "Issue ID")),
    request_body = UpdateIssue,
    responses(
        (status = 200, description = "Issue updated", body = Issue),
        (status = 400, description = "Due date before issue date"),
        (status = 404, description = "Issue not found"),
        (status = 422, description = "Issue already returned")
    )
)]
pub async fn update_issue(
    State(state): State<AppState>,
    PathParams(issue_id): PathParams<i64>,
    ValidatedJson(data): ValidatedJson<UpdateIssue>,
) -> AppResult<Json<Issue>> {
    Ok(Json(state.services.lending.update_issue(issue_id, data).await?))
}

/// Delete a returned issue
#[utoipa::path(
    delete,
    path = "/issues/{issue_id}",
    tag = "issues",
    security(("basic_auth" = [])),
    params(("issue_id" = i64, Path, description = "Issue ID")),
    responses(
        (status = 200, description = "Issue deleted", body = MessageResponse),
        (status = 404, description = "Issue not found"),
        (status = 409, description = "Issue still on loan")
    )
)]
pub async fn delete_issue(
    State(state): State<AppState>,
    PathParams(issue_id): PathParams<i64>,
) -> AppResult<Json<MessageResponse>> {
    state.services.lending.delete_issue(issue_id).await?;
    Ok(MessageResponse::new("Issue deleted"))
}

/// Record a return at the desk without a reader request
#[utoipa::path(
    post,
    path = "/admin/issues/{issue_id}/return",
    tag = "issues",
    security(("basic_auth" = [])),
    params(("issue_id" = i64, Path, description = "Issue ID")),
    responses(
        (status = 200, description = "Issue returned", body = Issue),
        (status = 404, description = "Issue not found"),
        (status = 422, description = "Issue already returned")
    )
)]
pub async fn return_issue(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
    PathParams(issue_id): PathParams<i64>,
) -> AppResult<Json<Issue>> {
    Ok(Json(state.services.lending.return_issue(issue_id, admin.id).await?))
}

/// Flag issued loans past their expected return date
#[utoipa::path(
    post,
    path = "/admin/issues/overdue",
    tag = "issues",
    security(("basic_auth" = [])),
    responses(
        (status = 200, description = "Overdue sweep done", body = OverdueSweep)
    )
)]
pub async fn mark_overdue(State(state): State<AppState>) -> AppResult<Json<OverdueSweep>> {
    let marked_overdue = state.services.lending.mark_overdue().await?;
    Ok(Json(OverdueSweep { marked_overdue }))
}

/// Loans of the authenticated reader
#[utoipa::path(
    get,
    path = "/reader/issues",
    tag = "issues",
    security(("basic_auth" = [])),
    responses(
        (status = 200, description = "Own issues", body = Vec<Issue>)
    )
)]
pub async fn my_issues(
    State(state): State<AppState>,
    CurrentUser(reader): CurrentUser,
) -> AppResult<Json<Vec<Issue>>> {
    Ok(Json(state.services.lending.reader_issues(reader.id).await?))
}
