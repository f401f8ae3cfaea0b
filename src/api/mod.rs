//! API handlers for MyLibrary REST endpoints
//!
//! Handlers only parse inputs and render results; every domain rule lives
//! in the services layer.

pub mod books;
pub mod health;
pub mod loans;
pub mod openapi;
pub mod users;
