//! User (borrower) management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, UpdateUser, User},
    repository::Repository,
};

use super::{is_blank, keep_if_blank};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Register a new borrower. Last name, first name, email and password
    /// are all mandatory; the email must not already be taken.
    pub async fn add_user(&self, user: CreateUser) -> AppResult<User> {
        let user = CreateUser {
            last_name: user.last_name.trim().to_string(),
            first_name: user.first_name.trim().to_string(),
            email: user.email.trim().to_string(),
            password: user.password,
        };

        if is_blank(&user.password) {
            return Err(AppError::Validation("password is mandatory".to_string()));
        }
        user.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self.repository.users.email_exists(&user.email, None).await? {
            return Err(AppError::Duplicate(
                "A user with this email already exists".to_string(),
            ));
        }

        let mut tx = self.repository.pool.begin().await?;
        let id = self.repository.users.insert(&mut tx, &user).await?;
        tx.commit().await?;

        tracing::info!(user_id = id, "user added");

        self.repository.users.get_by_id(id).await
    }

    /// Update an existing borrower. Absent or empty fields keep their
    /// stored value. Email uniqueness is re-checked only when the email
    /// actually changes; a collision with a different user is a duplicate.
    pub async fn update_user(&self, id: i64, update: UpdateUser) -> AppResult<User> {
        let current = self.repository.users.get_by_id(id).await?;

        let update = UpdateUser {
            last_name: keep_if_blank(update.last_name),
            first_name: keep_if_blank(update.first_name),
            email: keep_if_blank(update.email).map(|e| e.trim().to_string()),
            password: keep_if_blank(update.password),
        };

        if let Some(ref email) = update.email {
            if !email.eq_ignore_ascii_case(&current.email)
                && self.repository.users.email_exists(email, Some(id)).await?
            {
                return Err(AppError::Duplicate(
                    "A user with this email already exists".to_string(),
                ));
            }
        }

        let mut tx = self.repository.pool.begin().await?;
        self.repository.users.update(&mut tx, id, &update).await?;
        tx.commit().await?;

        self.repository.users.get_by_id(id).await
    }

    /// Remove a borrower
    pub async fn remove_user(&self, id: i64) -> AppResult<()> {
        self.repository.users.get_by_id(id).await?;

        let mut tx = self.repository.pool.begin().await?;
        self.repository.users.delete(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!(user_id = id, "user removed");

        Ok(())
    }

    /// Get a user by ID
    pub async fn find_by_id(&self, id: i64) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// List all users
    pub async fn list_all(&self) -> AppResult<Vec<User>> {
        self.repository.users.list_all().await
    }

    /// Search users by last name (blank input returns empty)
    pub async fn search_by_last_name(&self, last_name: &str) -> AppResult<Vec<User>> {
        if is_blank(last_name) {
            return Ok(Vec::new());
        }
        self.repository.users.search_by_last_name(last_name).await
    }

    /// Search users by first name (blank input returns empty)
    pub async fn search_by_first_name(&self, first_name: &str) -> AppResult<Vec<User>> {
        if is_blank(first_name) {
            return Ok(Vec::new());
        }
        self.repository.users.search_by_first_name(first_name).await
    }

    /// Get a user by email
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        if is_blank(email) {
            return Ok(None);
        }
        self.repository.users.find_by_email(email).await
    }

    /// Check whether an email is already taken
    pub async fn email_exists(&self, email: &str) -> AppResult<bool> {
        if is_blank(email) {
            return Ok(false);
        }
        self.repository.users.email_exists(email, None).await
    }
}
