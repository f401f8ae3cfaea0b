//! Borrower management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::AppResult,
    models::user::{CreateUser, UpdateUser, User},
};

/// Search parameters; exactly one is honored, in this order.
#[derive(Deserialize, IntoParams)]
pub struct UserSearchQuery {
    /// Substring of the last name
    pub last_name: Option<String>,
    /// Substring of the first name
    pub first_name: Option<String>,
    /// Exact email address
    pub email: Option<String>,
}

/// List all users
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    responses(
        (status = 200, description = "List of users", body = Vec<User>)
    )
)]
pub async fn list_users(State(state): State<crate::AppState>) -> AppResult<Json<Vec<User>>> {
    let users = state.services.users.list_all().await?;
    Ok(Json(users))
}

/// Search users by last name, first name or email
#[utoipa::path(
    get,
    path = "/users/search",
    tag = "users",
    params(UserSearchQuery),
    responses(
        (status = 200, description = "Matching users (empty for blank input)", body = Vec<User>)
    )
)]
pub async fn search_users(
    State(state): State<crate::AppState>,
    Query(query): Query<UserSearchQuery>,
) -> AppResult<Json<Vec<User>>> {
    let users = if let Some(ref last_name) = query.last_name {
        state.services.users.search_by_last_name(last_name).await?
    } else if let Some(ref first_name) = query.first_name {
        state.services.users.search_by_first_name(first_name).await?
    } else if let Some(ref email) = query.email {
        state
            .services
            .users
            .find_by_email(email)
            .await?
            .into_iter()
            .collect()
    } else {
        Vec::new()
    };
    Ok(Json(users))
}

/// Get user details by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User details", body = User),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<User>> {
    let user = state.services.users.find_by_id(id).await?;
    Ok(Json(user))
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Missing mandatory field"),
        (status = 409, description = "Email already exists")
    )
)]
pub async fn create_user(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    let user = state.services.users.add_user(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Update a user (absent or empty fields are kept unchanged)
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email belongs to another user")
    )
)]
pub async fn update_user(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateUser>,
) -> AppResult<Json<User>> {
    let user = state.services.users.update_user(id, request).await?;
    Ok(Json(user))
}

/// Remove a user
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User removed"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.services.users.remove_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
