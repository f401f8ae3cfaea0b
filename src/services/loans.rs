//! Loan management service: the ACTIVE/CLOSED state machine.

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::loan::{CreateLoan, Loan},
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Start a loan: user and book must exist and the book must have no
    /// ACTIVE loan. The availability check and the insert share one
    /// transaction; the partial unique index on active loans backstops any
    /// concurrent writer at commit time.
    pub async fn start_loan(&self, loan: CreateLoan) -> AppResult<Loan> {
        let user = self.repository.users.get_by_id(loan.user_id).await?;
        let book = self.repository.books.get_by_id(loan.book_id).await?;

        let mut tx = self.repository.pool.begin().await?;

        let active = self
            .repository
            .loans
            .find_active_by_book_on(&mut tx, book.id)
            .await?;
        if !active.is_empty() {
            return Err(AppError::Conflict("Book already on loan".to_string()));
        }

        let today = Utc::now().date_naive();
        let id = self
            .repository
            .loans
            .insert(&mut tx, user.id, book.id, today)
            .await?;

        tx.commit().await?;

        tracing::info!(loan_id = id, user_id = user.id, book_id = book.id, "loan started");

        self.repository.loans.get_by_id(id).await
    }

    /// Return a book: its active loan transitions to CLOSED.
    ///
    /// More than one ACTIVE loan per book should be impossible; if it is
    /// ever observed, the lowest id is closed and a warning is logged.
    pub async fn return_loan(&self, book_id: i64) -> AppResult<Loan> {
        let book = self.repository.books.get_by_id(book_id).await?;

        let mut tx = self.repository.pool.begin().await?;

        let active = self
            .repository
            .loans
            .find_active_by_book_on(&mut tx, book.id)
            .await?;
        let loan = match active.first() {
            Some(loan) => loan.clone(),
            None => {
                return Err(AppError::Conflict(
                    "Book not currently on loan".to_string(),
                ))
            }
        };
        if active.len() > 1 {
            tracing::warn!(
                book_id = book.id,
                count = active.len(),
                "multiple active loans for one book, closing the oldest"
            );
        }

        self.repository.loans.close(&mut tx, loan.id).await?;
        tx.commit().await?;

        tracing::info!(loan_id = loan.id, book_id = book.id, "loan returned");

        self.repository.loans.get_by_id(loan.id).await
    }

    /// The single active loan of a book, if any
    pub async fn active_loan_for(&self, book_id: i64) -> AppResult<Option<Loan>> {
        self.repository.books.get_by_id(book_id).await?;
        let active = self.repository.loans.find_active_by_book(book_id).await?;
        Ok(active.into_iter().next())
    }

    /// List all loans (full history)
    pub async fn list_all(&self) -> AppResult<Vec<Loan>> {
        self.repository.loans.list_all().await
    }

    /// List loans of a user (full history)
    pub async fn list_by_user(&self, user_id: i64) -> AppResult<Vec<Loan>> {
        self.repository.users.get_by_id(user_id).await?;
        self.repository.loans.list_by_user(user_id).await
    }

    /// List loans of a book (full history)
    pub async fn list_by_book(&self, book_id: i64) -> AppResult<Vec<Loan>> {
        self.repository.books.get_by_id(book_id).await?;
        self.repository.loans.list_by_book(book_id).await
    }
}
