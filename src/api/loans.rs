//! Loan lifecycle endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::loan::{CreateLoan, Loan},
};

/// List all loans (full history)
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    responses(
        (status = 200, description = "All loans", body = Vec<Loan>)
    )
)]
pub async fn list_loans(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Loan>>> {
    let loans = state.services.loans.list_all().await?;
    Ok(Json(loans))
}

/// Start a loan (borrow a book)
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    request_body = CreateLoan,
    responses(
        (status = 201, description = "Loan started", body = Loan),
        (status = 404, description = "User or book not found"),
        (status = 409, description = "Book already on loan")
    )
)]
pub async fn create_loan(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateLoan>,
) -> AppResult<(StatusCode, Json<Loan>)> {
    let loan = state.services.loans.start_loan(request).await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

/// Return a book, closing its active loan
#[utoipa::path(
    post,
    path = "/books/{id}/return",
    tag = "loans",
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Loan closed", body = Loan),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book not currently on loan")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    Path(book_id): Path<i64>,
) -> AppResult<Json<Loan>> {
    let loan = state.services.loans.return_loan(book_id).await?;
    Ok(Json(loan))
}

/// Active loan of a book, if any
#[utoipa::path(
    get,
    path = "/books/{id}/active-loan",
    tag = "loans",
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Active loan, or null when none", body = Loan),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_active_loan(
    State(state): State<crate::AppState>,
    Path(book_id): Path<i64>,
) -> AppResult<Json<Option<Loan>>> {
    let loan = state.services.loans.active_loan_for(book_id).await?;
    Ok(Json(loan))
}

/// Loan history of a book
#[utoipa::path(
    get,
    path = "/books/{id}/loans",
    tag = "loans",
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Loans of the book", body = Vec<Loan>),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book_loans(
    State(state): State<crate::AppState>,
    Path(book_id): Path<i64>,
) -> AppResult<Json<Vec<Loan>>> {
    let loans = state.services.loans.list_by_book(book_id).await?;
    Ok(Json(loans))
}

/// Loan history of a user
#[utoipa::path(
    get,
    path = "/users/{id}/loans",
    tag = "loans",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Loans of the user", body = Vec<Loan>),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_loans(
    State(state): State<crate::AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<Vec<Loan>>> {
    let loans = state.services.loans.list_by_user(user_id).await?;
    Ok(Json(loans))
}
