//! OpenAPI documentation

use axum::Json;
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};

use crate::api::{books, health, issues, libraries, requests, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bibliotheca API",
        version = "1.0.0",
        description = "Library lending REST API"
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Libraries
        libraries::create_library,
        libraries::list_libraries,
        libraries::get_library,
        libraries::update_library,
        libraries::delete_library,
        // Users
        users::create_user,
        users::list_users,
        users::get_user,
        users::update_user,
        users::delete_user,
        users::get_reader,
        // Books
        books::create_book,
        books::update_book,
        books::delete_book,
        books::list_books,
        books::get_book,
        books::list_available_books,
        // Requests
        requests::create_request,
        requests::my_requests,
        requests::list_requests,
        requests::process_request,
        requests::get_request,
        requests::delete_request,
        // Issues
        issues::list_issues,
        issues::get_issue,
        issues::update_issue,
        issues::delete_issue,
        issues::return_issue,
        issues::mark_overdue,
        issues::my_issues,
    ),
    components(
        schemas(
            crate::models::enums::Role,
            crate::models::enums::RequestType,
            crate::models::enums::RequestStatus,
            crate::models::enums::IssueStatus,
            crate::models::library::Library,
            crate::models::library::CreateLibrary,
            crate::models::library::UpdateLibrary,
            crate::models::user::User,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            crate::models::user::ReaderDetails,
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::request::RequestEvent,
            crate::models::request::CreateRequest,
            crate::models::request::RequestAction,
            crate::models::request::ProcessRequest,
            crate::models::request::ProcessOutcome,
            crate::models::issue::Issue,
            crate::models::issue::UpdateIssue,
            crate::models::issue::OverdueSweep,
            libraries::MessageResponse,
            health::HealthResponse,
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&BasicAuthAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "libraries", description = "Library management"),
        (name = "users", description = "User management"),
        (name = "books", description = "Book inventory"),
        (name = "requests", description = "Borrow and return requests"),
        (name = "issues", description = "Issue registry")
    )
)]
pub struct ApiDoc;

struct BasicAuthAddon;

impl Modify for BasicAuthAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme("basic_auth", SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)));
        }
    }
}

/// Serve the OpenAPI document
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
