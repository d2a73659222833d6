//! API handlers for the Bibliotheca REST endpoints

pub mod books;
pub mod health;
pub mod issues;
pub mod libraries;
pub mod openapi;
pub mod requests;
pub mod users;

use std::time::Duration;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Query, Request, State},
    http::request::Parts,
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
    Json, Router,
};
use axum_extra::headers::{authorization::Basic, Authorization, HeaderMapExt};
use serde::de::DeserializeOwned;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{enums::Role, user::User},
    AppState,
};

/// User admitted by the role gate, stored in request extensions
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| AppError::Authentication("Authentication required".to_string()))
    }
}

/// JSON body that passed `validator` checks; malformed bodies become 400
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// Path parameters; unparsable segments become a JSON 400
pub struct PathParams<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for PathParams<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        Ok(PathParams(value))
    }
}

/// Query string filters; unknown or malformed values become a JSON 400
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        Ok(QueryParams(value))
    }
}

/// Check Basic credentials and the route group's role, then hand the
/// resolved user to the handler
async fn gate(state: &AppState, required: Role, mut request: Request, next: Next) -> AppResult<Response> {
    let credentials = request
        .headers()
        .typed_get::<Authorization<Basic>>()
        .ok_or_else(|| AppError::Authentication("Missing or malformed basic credentials".to_string()))?;

    let user = state
        .services
        .auth
        .authenticate(credentials.username(), credentials.password())
        .await?;
    state.services.auth.authorize(&user, required)?;

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

pub async fn require_owner(State(state): State<AppState>, request: Request, next: Next) -> AppResult<Response> {
    gate(&state, Role::Owner, request, next).await
}

pub async fn require_admin(State(state): State<AppState>, request: Request, next: Next) -> AppResult<Response> {
    gate(&state, Role::Admin, request, next).await
}

pub async fn require_reader(State(state): State<AppState>, request: Request, next: Next) -> AppResult<Response> {
    gate(&state, Role::Reader, request, next).await
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let owner = Router::new()
        .route("/owner/library", post(libraries::create_library))
        .route("/owner/users", post(users::create_user))
        .route("/library", get(libraries::list_libraries))
        .route(
            "/library/:id",
            get(libraries::get_library)
                .put(libraries::update_library)
                .delete(libraries::delete_library),
        )
        .route("/users", get(users::list_users))
        .route(
            "/users/:id",
            get(users::get_user).put(users::update_user).delete(users::delete_user),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_owner));

    let admin = Router::new()
        .route("/admin/books", post(books::create_book))
        .route(
            "/admin/books/:isbn",
            put(books::update_book).delete(books::delete_book),
        )
        .route("/admin/requests", get(requests::list_requests))
        .route("/admin/requests/:req_id", post(requests::process_request))
        .route("/admin/readers/:reader_id", get(users::get_reader))
        .route("/admin/issues/overdue", post(issues::mark_overdue))
        .route("/admin/issues/:issue_id/return", post(issues::return_issue))
        .route("/books", get(books::list_books))
        .route("/books/:isbn", get(books::get_book))
        .route("/requestevents", get(requests::list_requests))
        .route(
            "/requestevents/:id",
            get(requests::get_request).delete(requests::delete_request),
        )
        .route("/issues", get(issues::list_issues))
        .route(
            "/issues/:issue_id",
            get(issues::get_issue)
                .put(issues::update_issue)
                .delete(issues::delete_issue),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    let reader = Router::new()
        .route(
            "/reader/requests",
            post(requests::create_request).get(requests::my_requests),
        )
        .route("/reader/books", get(books::list_available_books))
        .route("/reader/issues", get(issues::my_issues))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_reader));

    let public = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/api-docs/openapi.json", get(openapi::openapi_json));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    Router::new()
        .merge(owner)
        .merge(admin)
        .merge(reader)
        .merge(public)
        .with_state(state)
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
