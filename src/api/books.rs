//! Book inventory endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::book::{Book, BookQuery, CreateBook, UpdateBook},
    AppState,
};

use super::{libraries::MessageResponse, PathParams, QueryParams, ValidatedJson};

/// Add a title to the inventory
#[utoipa::path(
    post,
    path = "/admin/books",
    tag = "books",
    security(("basic_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input or copy counts"),
        (status = 404, description = "Library not found"),
        (status = 409, description = "ISBN already exists")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    ValidatedJson(book): ValidatedJson<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let created = state.services.books.create(book).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a title
#[utoipa::path(
    put,
    path = "/admin/books/{isbn}",
    tag = "books",
    security(("basic_auth" = [])),
    params(("isbn" = String, Path, description = "ISBN")),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Copy counts out of bounds"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Concurrent change, retry")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    PathParams(isbn): PathParams<String>,
    ValidatedJson(book): ValidatedJson<UpdateBook>,
) -> AppResult<Json<Book>> {
    Ok(Json(state.services.books.update(&isbn, book).await?))
}

/// Remove a title with no copy on loan
#[utoipa::path(
    delete,
    path = "/admin/books/{isbn}",
    tag = "books",
    security(("basic_auth" = [])),
    params(("isbn" = String, Path, description = "ISBN")),
    responses(
        (status = 200, description = "Book deleted", body = MessageResponse),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Copies still on loan")
    )
)]
pub async fn delete_book(State(state): State<AppState>, PathParams(isbn): PathParams<String>) -> AppResult<Json<MessageResponse>> {
    state.services.books.delete(&isbn).await?;
    Ok(MessageResponse::new("Book deleted"))
}

/// List the whole inventory
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("basic_auth" = [])),
    responses(
        (status = 200, description = "All books", body = Vec<Book>)
    )
)]
pub async fn list_books(State(state): State<AppState>) -> AppResult<Json<Vec<Book>>> {
    Ok(Json(state.services.books.list().await?))
}

/// Get a book by ISBN
#[utoipa::path(
    get,
    path = "/books/{isbn}",
    tag = "books",
    security(("basic_auth" = [])),
    params(("isbn" = String, Path, description = "ISBN")),
    responses(
        (status = 200, description = "Book", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(State(state): State<AppState>, PathParams(isbn): PathParams<String>) -> AppResult<Json<Book>> {
    Ok(Json(state.services.books.get_by_isbn(&isbn).await?))
}

/// Books a reader can currently borrow
#[utoipa::path(
    get,
    path = "/reader/books",
    tag = "books",
    security(("basic_auth" = [])),
    params(BookQuery),
    responses(
        (status = 200, description = "Books with available copies", body = Vec<Book>)
    )
)]
pub async fn list_available_books(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<BookQuery>,
) -> AppResult<Json<Vec<Book>>> {
    Ok(Json(state.services.books.list_available(query.lib_id).await?))
}
