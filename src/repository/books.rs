//! Books repository for database operations

use sqlx::{Pool, Sqlite, SqliteConnection};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
};

/// Shared column list for book queries. Column names come from the
/// historical schema; `is_on_loan` is derived from the loans table, never
/// stored.
const SELECT_BOOK: &str = "\
SELECT b.id, b.title, b.author, b.date_publication AS publication_date, \
b.isbn, b.categorie AS category, \
EXISTS(SELECT 1 FROM emprunts e WHERE e.book_id = b.id AND e.etat = 'ACTIVE') AS is_on_loan \
FROM books b";

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Sqlite>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(&format!("{} WHERE b.id = ?", SELECT_BOOK))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// List all books
    pub async fn list_all(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(&format!("{} ORDER BY b.id", SELECT_BOOK))
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    /// List books without an active loan
    pub async fn list_available(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(&format!(
            "{} WHERE NOT EXISTS(SELECT 1 FROM emprunts e WHERE e.book_id = b.id AND e.etat = 'ACTIVE') ORDER BY b.id",
            SELECT_BOOK
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// List books with an active loan
    pub async fn list_on_loan(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(&format!(
            "{} WHERE EXISTS(SELECT 1 FROM emprunts e WHERE e.book_id = b.id AND e.etat = 'ACTIVE') ORDER BY b.id",
            SELECT_BOOK
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// Case-insensitive substring search on title
    pub async fn search_by_title(&self, title: &str) -> AppResult<Vec<Book>> {
        self.search_by("b.title", title).await
    }

    /// Case-insensitive substring search on author
    pub async fn search_by_author(&self, author: &str) -> AppResult<Vec<Book>> {
        self.search_by("b.author", author).await
    }

    /// Case-insensitive substring search on category
    pub async fn search_by_category(&self, category: &str) -> AppResult<Vec<Book>> {
        self.search_by("b.categorie", category).await
    }

    async fn search_by(&self, column: &str, pattern: &str) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(&format!(
            "{} WHERE LOWER({}) LIKE ? ORDER BY b.id",
            SELECT_BOOK, column
        ))
        .bind(format!("%{}%", pattern.to_lowercase()))
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// Check if a book with this ISBN already exists
    pub async fn isbn_exists(&self, isbn: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = ?)")
                .bind(isbn)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Same as [`isbn_exists`](Self::isbn_exists), but on a caller-provided
    /// connection so the probe sees the caller's uncommitted writes.
    pub async fn isbn_exists_on(&self, conn: &mut SqliteConnection, isbn: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = ?)")
                .bind(isbn)
                .fetch_one(&mut *conn)
                .await?;
        Ok(exists)
    }

    /// Insert a new book, returning its id
    pub async fn insert(&self, conn: &mut SqliteConnection, book: &CreateBook) -> AppResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO books (title, author, date_publication, isbn, categorie) \
             VALUES (?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.publication_date)
        .bind(&book.isbn)
        .bind(&book.category)
        .fetch_one(&mut *conn)
        .await?;

        Ok(id)
    }

    /// Update an existing book. Only the fields present in `book` are
    /// written; the caller decides what "present" means.
    pub async fn update(
        &self,
        conn: &mut SqliteConnection,
        id: i64,
        book: &UpdateBook,
    ) -> AppResult<()> {
        let mut sets = Vec::new();

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ?", $name));
                }
            };
        }

        add_field!(book.title, "title");
        add_field!(book.author, "author");
        add_field!(book.publication_date, "date_publication");
        add_field!(book.isbn, "isbn");
        add_field!(book.category, "categorie");

        if sets.is_empty() {
            return Ok(());
        }

        let query = format!("UPDATE books SET {} WHERE id = ?", sets.join(", "));
        let mut builder = sqlx::query(&query);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(book.title);
        bind_field!(book.author);
        bind_field!(book.publication_date);
        bind_field!(book.isbn);
        bind_field!(book.category);

        builder.bind(id).execute(&mut *conn).await?;

        Ok(())
    }

    /// Delete a book. Its loans must be deleted first (same transaction).
    pub async fn delete(&self, conn: &mut SqliteConnection, id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}
