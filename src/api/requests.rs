//! Request event endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::request::{CreateRequest, ProcessOutcome, ProcessRequest, RequestEvent, RequestQuery},
    AppState,
};

use super::{libraries::MessageResponse, CurrentUser, PathParams, QueryParams, ValidatedJson};

/// File a borrow or return request as the authenticated reader
#[utoipa::path(
    post,
    path = "/reader/requests",
    tag = "requests",
    security(("basic_auth" = [])),
    request_body = CreateRequest,
    responses(
        (status = 201, description = "Request filed", body = RequestEvent),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Request filed for another reader"),
        (status = 404, description = "Book or issue not found"),
        (status = 422, description = "No open loan to return")
    )
)]
pub async fn create_request(
    State(state): State<AppState>,
    CurrentUser(reader): CurrentUser,
    ValidatedJson(request): ValidatedJson<CreateRequest>,
) -> AppResult<(StatusCode, Json<RequestEvent>)> {
    let created = state.services.lending.create_request(&reader, request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Requests filed by the authenticated reader
#[utoipa::path(
    get,
    path = "/reader/requests",
    tag = "requests",
    security(("basic_auth" = [])),
    responses(
        (status = 200, description = "Own requests", body = Vec<RequestEvent>)
    )
)]
pub async fn my_requests(
    State(state): State<AppState>,
    CurrentUser(reader): CurrentUser,
) -> AppResult<Json<Vec<RequestEvent>>> {
    Ok(Json(state.services.lending.reader_requests(reader.id).await?))
}

/// List request events, optionally by status
#[utoipa::path(
    get,
    path = "/admin/requests",
    tag = "requests",
    security(("basic_auth" = [])),
    params(RequestQuery),
    responses(
        (status = 200, description = "Request events", body = Vec<RequestEvent>)
    )
)]
pub async fn list_requests(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<RequestQuery>,
) -> AppResult<Json<Vec<RequestEvent>>> {
    Ok(Json(state.services.lending.list_requests(query.status).await?))
}

/// Approve or reject a pending request
#[utoipa::path(
    post,
    path = "/admin/requests/{req_id}",
    tag = "requests",
    security(("basic_auth" = [])),
    params(("req_id" = i64, Path, description = "Request ID")),
    request_body = ProcessRequest,
    responses(
        (status = 200, description = "Request processed", body = ProcessOutcome),
        (status = 404, description = "Request not found"),
        (status = 409, description = "No copies available"),
        (status = 422, description = "Request already processed")
    )
)]
pub async fn process_request(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
    PathParams(req_id): PathParams<i64>,
    ValidatedJson(body): ValidatedJson<ProcessRequest>,
) -> AppResult<Json<ProcessOutcome>> {
    let outcome = state
        .services
        .lending
        .process_request(req_id, body.action, &admin)
        .await?;
    Ok(Json(outcome))
}

/// Get a request event by ID
#[utoipa::path(
    get,
    path = "/requestevents/{id}",
    tag = "requests",
    security(("basic_auth" = [])),
    params(("id" = i64, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request event", body = RequestEvent),
        (status = 404, description = "Request not found")
    )
)]
pub async fn get_request(State(state): State<AppState>, PathParams(id): PathParams<i64>) -> AppResult<Json<RequestEvent>> {
    Ok(Json(state.services.lending.get_request(id).await?))
}

/// Delete a request event
#[utoipa::path(
    delete,
    path = "/requestevents/{id}",
    tag = "requests",
    security(("basic_auth" = [])),
    params(("id" = i64, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request deleted", body = MessageResponse),
        (status = 404, description = "Request not found")
    )
)]
pub async fn delete_request(State(state): State<AppState>, PathParams(id): PathParams<i64>) -> AppResult<Json<MessageResponse>> {
    state.services.lending.delete_request(id).await?;
    Ok(MessageResponse::new("Request deleted"))
}
