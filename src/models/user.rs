//! User (borrower) model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// User model from database
///
/// The password is stored as a plain string. This is a known weakness
/// inherited from the original system; hardening it is out of scope.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i64,
    pub last_name: String,
    pub first_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
}

/// Create user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 1, message = "last name is mandatory"))]
    pub last_name: String,
    #[validate(length(min = 1, message = "first name is mandatory"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "email is mandatory"), email(message = "email is invalid"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is mandatory"))]
    pub password: String,
}

/// Update user request (absent or empty field = keep stored value)
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateUser {
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}
