//! Book catalog endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::book::{Book, CreateBook, UpdateBook},
};

/// Search parameters; exactly one is honored, in this order.
#[derive(Deserialize, IntoParams)]
pub struct BookSearchQuery {
    /// Substring of the title
    pub title: Option<String>,
    /// Substring of the author
    pub author: Option<String>,
    /// Substring of the category
    pub category: Option<String>,
}

/// File path request for import/export
#[derive(Deserialize, ToSchema)]
pub struct FileRequest {
    /// Path of the JSON file on the server
    pub path: String,
}

/// Import/export result
#[derive(Serialize, ToSchema)]
pub struct FileResponse {
    /// Number of books processed
    pub count: usize,
}

/// List all books
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    responses(
        (status = 200, description = "List of books", body = Vec<Book>)
    )
)]
pub async fn list_books(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.books.list_all().await?;
    Ok(Json(books))
}

/// List books without an active loan
#[utoipa::path(
    get,
    path = "/books/available",
    tag = "books",
    responses(
        (status = 200, description = "Available books", body = Vec<Book>)
    )
)]
pub async fn list_available_books(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.books.list_available().await?;
    Ok(Json(books))
}

/// List books with an active loan
#[utoipa::path(
    get,
    path = "/books/on-loan",
    tag = "books",
    responses(
        (status = 200, description = "Books currently on loan", body = Vec<Book>)
    )
)]
pub async fn list_books_on_loan(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.books.list_on_loan().await?;
    Ok(Json(books))
}

/// Search books by title, author or category substring
#[utoipa::path(
    get,
    path = "/books/search",
    tag = "books",
    params(BookSearchQuery),
    responses(
        (status = 200, description = "Matching books (empty for blank input)", body = Vec<Book>)
    )
)]
pub async fn search_books(
    State(state): State<crate::AppState>,
    Query(query): Query<BookSearchQuery>,
) -> AppResult<Json<Vec<Book>>> {
    let books = if let Some(ref title) = query.title {
        state.services.books.search_by_title(title).await?
    } else if let Some(ref author) = query.author {
        state.services.books.search_by_author(author).await?
    } else if let Some(ref category) = query.category {
        state.services.books.search_by_category(category).await?
    } else {
        Vec::new()
    };
    Ok(Json(books))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Book>> {
    let book = state.services.books.find_by_id(id).await?;
    Ok(Json(book))
}

/// Add a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Missing title or author"),
        (status = 409, description = "ISBN already exists")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let book = state.services.books.add_book(request).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Update a book (absent or empty fields are kept unchanged)
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateBook>,
) -> AppResult<Json<Book>> {
    let book = state.services.books.update_book(id, request).await?;
    Ok(Json(book))
}

/// Remove a book and its loan history
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book removed"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.services.books.remove_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Export the catalog to a JSON file on the server
#[utoipa::path(
    post,
    path = "/books/export",
    tag = "books",
    request_body = FileRequest,
    responses(
        (status = 200, description = "Catalog exported", body = FileResponse)
    )
)]
pub async fn export_books(
    State(state): State<crate::AppState>,
    Json(request): Json<FileRequest>,
) -> AppResult<Json<FileResponse>> {
    let count = state
        .services
        .books
        .export_json(std::path::Path::new(&request.path))
        .await?;
    Ok(Json(FileResponse { count }))
}

/// Import books from a JSON file on the server
#[utoipa::path(
    post,
    path = "/books/import",
    tag = "books",
    request_body = FileRequest,
    responses(
        (status = 200, description = "Catalog imported (0 when the file is unreadable)", body = FileResponse),
        (status = 400, description = "Malformed import file")
    )
)]
pub async fn import_books(
    State(state): State<crate::AppState>,
    Json(request): Json<FileRequest>,
) -> AppResult<Json<FileResponse>> {
    let count = state
        .services
        .books
        .import_json(std::path::Path::new(&request.path))
        .await?;
    Ok(Json(FileResponse { count }))
}
