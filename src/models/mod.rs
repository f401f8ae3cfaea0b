//! Data models for MyLibrary

pub mod book;
pub mod loan;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookJson, CreateBook, UpdateBook};
pub use loan::{CreateLoan, Loan, LoanState};
pub use user::{CreateUser, UpdateUser, User};
