//! Loans repository for database operations

use chrono::NaiveDate;
use sqlx::{Pool, Sqlite, SqliteConnection};

use crate::{
    error::{AppError, AppResult},
    models::loan::{Loan, LoanState},
};

/// Shared column list for loan queries (historical column names).
const SELECT_LOAN: &str = "\
SELECT id, user_id, book_id, date_emprunt AS loan_date, etat AS state \
FROM emprunts";

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Sqlite>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>(&format!("{} WHERE id = ?", SELECT_LOAN))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// List all loans (full history)
    pub async fn list_all(&self) -> AppResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>(&format!("{} ORDER BY id", SELECT_LOAN))
            .fetch_all(&self.pool)
            .await?;
        Ok(loans)
    }

    /// List loans for a user (full history)
    pub async fn list_by_user(&self, user_id: i64) -> AppResult<Vec<Loan>> {
        let loans =
            sqlx::query_as::<_, Loan>(&format!("{} WHERE user_id = ? ORDER BY id", SELECT_LOAN))
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(loans)
    }

    /// List loans for a book (full history)
    pub async fn list_by_book(&self, book_id: i64) -> AppResult<Vec<Loan>> {
        let loans =
            sqlx::query_as::<_, Loan>(&format!("{} WHERE book_id = ? ORDER BY id", SELECT_LOAN))
                .bind(book_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(loans)
    }

    /// Active loans for a book, lowest id first. The invariant allows at
    /// most one; callers treat more than one as a defect.
    pub async fn find_active_by_book(&self, book_id: i64) -> AppResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>(&format!(
            "{} WHERE book_id = ? AND etat = 'ACTIVE' ORDER BY id",
            SELECT_LOAN
        ))
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(loans)
    }

    /// Same as [`find_active_by_book`](Self::find_active_by_book), but on a
    /// caller-provided connection so the read shares the write transaction.
    pub async fn find_active_by_book_on(
        &self,
        conn: &mut SqliteConnection,
        book_id: i64,
    ) -> AppResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>(&format!(
            "{} WHERE book_id = ? AND etat = 'ACTIVE' ORDER BY id",
            SELECT_LOAN
        ))
        .bind(book_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(loans)
    }

    /// Insert a new ACTIVE loan, returning its id
    pub async fn insert(
        &self,
        conn: &mut SqliteConnection,
        user_id: i64,
        book_id: i64,
        loan_date: NaiveDate,
    ) -> AppResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO emprunts (user_id, book_id, date_emprunt, etat) \
             VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(user_id)
        .bind(book_id)
        .bind(loan_date)
        .bind(LoanState::Active)
        .fetch_one(&mut *conn)
        .await?;

        Ok(id)
    }

    /// Transition a loan to CLOSED
    pub async fn close(&self, conn: &mut SqliteConnection, loan_id: i64) -> AppResult<()> {
        sqlx::query("UPDATE emprunts SET etat = ? WHERE id = ?")
            .bind(LoanState::Closed)
            .bind(loan_id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Delete all loans of a book (cascade step of book deletion)
    pub async fn delete_by_book(&self, conn: &mut SqliteConnection, book_id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM emprunts WHERE book_id = ?")
            .bind(book_id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}
