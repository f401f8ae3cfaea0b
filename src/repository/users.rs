//! Users repository for database operations

use sqlx::{Pool, Sqlite, SqliteConnection};

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, UpdateUser, User},
};

/// Shared column list for user queries (historical column names).
const SELECT_USER: &str = "\
SELECT id, nom AS last_name, prenom AS first_name, email, mot_de_passe AS password \
FROM users";

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Sqlite>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<User> {
        sqlx::query_as::<_, User>(&format!("{} WHERE id = ?", SELECT_USER))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get user by email
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "{} WHERE LOWER(email) = LOWER(?)",
            SELECT_USER
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Check if an email already exists, optionally excluding one user id
    pub async fn email_exists(&self, email: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER(?) AND id != ?)",
            )
            .bind(email)
            .bind(id)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER(?))")
                .bind(email)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }

    /// List all users
    pub async fn list_all(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!("{} ORDER BY id", SELECT_USER))
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    /// Case-insensitive substring search on last name
    pub async fn search_by_last_name(&self, last_name: &str) -> AppResult<Vec<User>> {
        self.search_by("nom", last_name).await
    }

    /// Case-insensitive substring search on first name
    pub async fn search_by_first_name(&self, first_name: &str) -> AppResult<Vec<User>> {
        self.search_by("prenom", first_name).await
    }

    async fn search_by(&self, column: &str, pattern: &str) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "{} WHERE LOWER({}) LIKE ? ORDER BY id",
            SELECT_USER, column
        ))
        .bind(format!("%{}%", pattern.to_lowercase()))
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    /// Insert a new user, returning its id
    pub async fn insert(&self, conn: &mut SqliteConnection, user: &CreateUser) -> AppResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO users (nom, prenom, email, mot_de_passe) \
             VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(&user.last_name)
        .bind(&user.first_name)
        .bind(&user.email)
        .bind(&user.password)
        .fetch_one(&mut *conn)
        .await?;

        Ok(id)
    }

    /// Update an existing user. Only the fields present in `user` are
    /// written; the caller decides what "present" means.
    pub async fn update(
        &self,
        conn: &mut SqliteConnection,
        id: i64,
        user: &UpdateUser,
    ) -> AppResult<()> {
        let mut sets = Vec::new();

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ?", $name));
                }
            };
        }

        add_field!(user.last_name, "nom");
        add_field!(user.first_name, "prenom");
        add_field!(user.email, "email");
        add_field!(user.password, "mot_de_passe");

        if sets.is_empty() {
            return Ok(());
        }

        let query = format!("UPDATE users SET {} WHERE id = ?", sets.join(", "));
        let mut builder = sqlx::query(&query);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(user.last_name);
        bind_field!(user.first_name);
        bind_field!(user.email);
        bind_field!(user.password);

        builder.bind(id).execute(&mut *conn).await?;

        Ok(())
    }

    /// Delete a user
    pub async fn delete(&self, conn: &mut SqliteConnection, id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}
