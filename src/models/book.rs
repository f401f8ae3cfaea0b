//! Book model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub publication_date: Option<NaiveDate>,
    pub isbn: Option<String>,
    pub category: Option<String>,
    /// Derived: true iff the book has a loan in state ACTIVE
    pub is_on_loan: bool,
}

/// Create book request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBook {
    pub title: String,
    pub author: String,
    pub publication_date: Option<NaiveDate>,
    pub isbn: Option<String>,
    pub category: Option<String>,
}

/// Update book request
///
/// An absent or empty field means "keep the stored value". Clearing a field
/// is not expressible with this shape, matching the original convention.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub publication_date: Option<NaiveDate>,
    pub isbn: Option<String>,
    pub category: Option<String>,
}

/// Book shape used by the JSON import/export files.
///
/// Field names follow the historical export format.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookJson {
    pub titre: String,
    pub auteur: String,
    #[serde(rename = "datePublication", skip_serializing_if = "Option::is_none", default)]
    pub date_publication: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub isbn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub categorie: Option<String>,
}

impl From<&Book> for BookJson {
    fn from(book: &Book) -> Self {
        Self {
            titre: book.title.clone(),
            auteur: book.author.clone(),
            date_publication: book.publication_date,
            isbn: book.isbn.clone(),
            categorie: book.category.clone(),
        }
    }
}
