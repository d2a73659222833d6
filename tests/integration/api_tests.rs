//! HTTP contract tests: role gate, lending walkthrough, error mapping

use axum::http::{Method, StatusCode};
use serde_json::json;

use crate::common::{spawn_app, ADMIN_EMAIL, ADMIN_PASSWORD, OWNER_EMAIL, OWNER_PASSWORD, READER_EMAIL};

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;

    let (status, body) = app.call(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = app.call(Method::GET, "/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_openapi_document_lists_routes() {
    let app = spawn_app().await;

    let (status, body) = app.call(Method::GET, "/api-docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/admin/requests/{req_id}"].is_object());
    assert_eq!(body["components"]["securitySchemes"]["basic_auth"]["scheme"], "basic");
}

#[tokio::test]
async fn test_missing_credentials_are_unauthorized() {
    let app = spawn_app().await;

    let (status, body) = app.call(Method::GET, "/library", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_wrong_password_and_unknown_email_are_unauthorized() {
    let app = spawn_app().await;

    let (status, _) = app
        .call(Method::GET, "/library", Some((OWNER_EMAIL, "wrong")), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .call(Method::GET, "/library", Some(("nobody@example.com", OWNER_PASSWORD)), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    // Same message either way, so accounts cannot be enumerated
    assert_eq!(body["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_wrong_role_is_forbidden() {
    let app = spawn_app().await;
    app.seed_staff().await;

    // Owner on an admin route
    let (status, body) = app.as_owner(Method::GET, "/admin/requests", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Forbidden");

    // Admin on an owner route
    let (status, _) = app.as_admin(Method::GET, "/users", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Reader on an admin mirror route
    let (status, _) = app.as_reader(Method::GET, "/books", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Admin on a reader route
    let (status, _) = app
        .as_admin(Method::POST, "/reader/requests", Some(json!({ "book_id": "X1" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_matching_role_is_admitted() {
    let app = spawn_app().await;
    app.seed_staff().await;

    let (status, body) = app.as_owner(Method::GET, "/users", None).await;
    assert_eq!(status, StatusCode::OK);
    let users = body.as_array().expect("user list");
    assert_eq!(users.len(), 3);
    // Hashes never leave the server
    assert!(users.iter().all(|u| u.get("password_hash").is_none() && u.get("password").is_none()));

    let (status, _) = app.as_admin(Method::GET, "/admin/requests", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.as_reader(Method::GET, "/reader/books", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_end_to_end_lending_walkthrough() {
    let app = spawn_app().await;

    let (status, library) = app
        .as_owner(Method::POST, "/owner/library", Some(json!({ "name": "Central" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(library["id"], 1);

    let (status, admin) = app
        .as_owner(
            Method::POST,
            "/owner/users",
            Some(json!({
                "name": "John",
                "email": ADMIN_EMAIL,
                "role": "admin",
                "lib_id": 1,
                "password": ADMIN_PASSWORD,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(admin["id"], 2);
    assert_eq!(admin["role"], "admin");

    let (status, book) = app
        .as_admin(
            Method::POST,
            "/admin/books",
            Some(json!({
                "isbn": "X1",
                "lib_id": 1,
                "title": "Dune",
                "total_copies": 2,
                "available_copies": 2,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(book["available_copies"], 2);

    let (status, reader) = app
        .as_owner(
            Method::POST,
            "/owner/users",
            Some(json!({
                "name": "Mary",
                "email": READER_EMAIL,
                "role": "reader",
                "lib_id": 1,
                "password": crate::common::READER_PASSWORD,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(reader["id"], 3);

    let (status, request) = app
        .as_reader(
            Method::POST,
            "/reader/requests",
            Some(json!({ "book_id": "X1", "reader_id": 3 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(request["status"], "pending");
    assert_eq!(request["request_type"], "borrow");
    let req_id = request["req_id"].as_i64().expect("req_id");

    let (status, outcome) = app
        .as_admin(
            Method::POST,
            &format!("/admin/requests/{req_id}"),
            Some(json!({ "action": "approve" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{outcome}");
    assert_eq!(outcome["request"]["status"], "approved");
    assert_eq!(outcome["request"]["approver_id"], 2);
    assert_eq!(outcome["issue"]["issue_status"], "issued");
    assert_eq!(outcome["issue"]["reader_id"], 3);
    let issue_id = outcome["issue"]["issue_id"].as_i64().expect("issue_id");

    let (_, book) = app.as_admin(Method::GET, "/books/X1", None).await;
    assert_eq!(book["available_copies"], 1);

    let (_, issues) = app.as_reader(Method::GET, "/reader/issues", None).await;
    assert_eq!(issues.as_array().map(Vec::len), Some(1));

    let (status, return_request) = app
        .as_reader(
            Method::POST,
            "/reader/requests",
            Some(json!({ "book_id": "X1", "request_type": "return" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{return_request}");
    assert_eq!(return_request["issue_id"], issue_id);
    let return_id = return_request["req_id"].as_i64().expect("req_id");

    let (status, outcome) = app
        .as_admin(
            Method::POST,
            &format!("/admin/requests/{return_id}"),
            Some(json!({ "action": "approve" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{outcome}");
    assert_eq!(outcome["issue"]["issue_status"], "returned");
    assert!(outcome["issue"]["return_date"].is_string());
    assert_eq!(outcome["issue"]["return_approver_id"], 2);

    let (_, book) = app.as_admin(Method::GET, "/books/X1", None).await;
    assert_eq!(book["available_copies"], 2);

    let (status, details) = app.as_admin(Method::GET, "/admin/readers/3", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(details["reader"]["email"], READER_EMAIL);
    assert_eq!(details["requests"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_reader_cannot_file_for_someone_else() {
    let app = spawn_app().await;
    app.seed_staff().await;
    app.seed_book("X1", 1).await;

    let (status, _) = app
        .as_reader(
            Method::POST,
            "/reader/requests",
            Some(json!({ "book_id": "X1", "reader_id": 2 })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_request_for_unknown_book_is_not_found() {
    let app = spawn_app().await;
    app.seed_staff().await;

    let (status, body) = app
        .as_reader(Method::POST, "/reader/requests", Some(json!({ "book_id": "nope" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NotFound");
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = spawn_app().await;

    let (status, body) = app
        .as_owner(Method::POST, "/owner/library", Some(json!({ "title": "Central" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let (status, _) = app
        .as_owner(Method::POST, "/owner/library", Some(json!({ "name": "" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_isbn_is_conflict() {
    let app = spawn_app().await;
    app.seed_staff().await;
    app.seed_book("X1", 2).await;

    let (status, body) = app
        .as_admin(
            Method::POST,
            "/admin/books",
            Some(json!({ "isbn": "X1", "lib_id": 1, "title": "Again", "total_copies": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Conflict");
}

#[tokio::test]
async fn test_book_copy_bounds_are_enforced() {
    let app = spawn_app().await;
    app.seed_staff().await;

    let (status, _) = app
        .as_admin(
            Method::POST,
            "/admin/books",
            Some(json!({
                "isbn": "X2",
                "lib_id": 1,
                "title": "Too many",
                "total_copies": 1,
                "available_copies": 3,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    app.seed_book("X1", 2).await;
    let (status, book) = app
        .as_admin(Method::PUT, "/admin/books/X1", Some(json!({ "total_copies": 5 })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(book["total_copies"], 5);
    assert_eq!(book["available_copies"], 5);
}

#[tokio::test]
async fn test_reject_leaves_inventory_alone() {
    let app = spawn_app().await;
    app.seed_staff().await;
    app.seed_book("X1", 1).await;

    let (_, request) = app
        .as_reader(Method::POST, "/reader/requests", Some(json!({ "book_id": "X1" })))
        .await;
    let req_id = request["req_id"].as_i64().expect("req_id");

    let (status, outcome) = app
        .as_admin(
            Method::POST,
            &format!("/admin/requests/{req_id}"),
            Some(json!({ "action": "reject" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["request"]["status"], "rejected");
    assert!(outcome["issue"].is_null());

    let (_, book) = app.as_admin(Method::GET, "/books/X1", None).await;
    assert_eq!(book["available_copies"], 1);

    // A processed request cannot be decided twice
    let (status, body) = app
        .as_admin(
            Method::POST,
            &format!("/admin/requests/{req_id}"),
            Some(json!({ "action": "approve" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "BusinessRule");

    let (_, pending) = app
        .as_admin(Method::GET, "/admin/requests?status=pending", None)
        .await;
    assert_eq!(pending.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_delete_guards() {
    let app = spawn_app().await;
    app.seed_staff().await;
    app.seed_book("X1", 1).await;

    let (status, _) = app.as_owner(Method::DELETE, "/library/1", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, request) = app
        .as_reader(Method::POST, "/reader/requests", Some(json!({ "book_id": "X1" })))
        .await;
    let req_id = request["req_id"].as_i64().expect("req_id");
    let (_, outcome) = app
        .as_admin(
            Method::POST,
            &format!("/admin/requests/{req_id}"),
            Some(json!({ "action": "approve" })),
        )
        .await;
    let issue_id = outcome["issue"]["issue_id"].as_i64().expect("issue_id");

    let (status, _) = app.as_admin(Method::DELETE, "/admin/books/X1", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = app.as_owner(Method::DELETE, "/users/3", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = app.as_admin(Method::DELETE, &format!("/issues/{issue_id}"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, issue) = app
        .as_admin(Method::POST, &format!("/admin/issues/{issue_id}/return"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(issue["issue_status"], "returned");

    let (status, _) = app.as_admin(Method::DELETE, &format!("/issues/{issue_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.as_admin(Method::DELETE, "/admin/books/X1", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.as_admin(Method::GET, "/books/X1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_owner_updates_user_and_new_password_works() {
    let app = spawn_app().await;
    app.seed_staff().await;

    let (status, user) = app
        .as_owner(Method::PUT, "/users/2", Some(json!({ "password": "rotated" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["email"], ADMIN_EMAIL);

    let (status, _) = app.as_admin(Method::GET, "/admin/requests", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app
        .call(Method::GET, "/admin/requests", Some((ADMIN_EMAIL, "rotated")), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .as_owner(Method::PUT, "/users/2", Some(json!({ "email": READER_EMAIL })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_bad_path_and_query_values_get_json_errors() {
    let app = spawn_app().await;
    app.seed_staff().await;

    let (status, body) = app.as_owner(Method::GET, "/library/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadRequest");
    assert!(body["message"].is_string());

    let (status, body) = app
        .as_admin(Method::GET, "/admin/requests?status=bogus", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadRequest");

    let (status, body) = app.as_reader(Method::GET, "/reader/books?lib_id=first", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadRequest");
}
