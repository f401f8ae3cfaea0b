//! Book management service

use std::path::Path;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookJson, CreateBook, UpdateBook},
    repository::Repository,
};

use super::{is_blank, keep_if_blank};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Add a new book to the catalog.
    ///
    /// Title and author are mandatory; a non-empty ISBN must not already be
    /// present. The write is one transaction.
    pub async fn add_book(&self, book: CreateBook) -> AppResult<Book> {
        if is_blank(&book.title) {
            return Err(AppError::Validation("title is mandatory".to_string()));
        }
        if is_blank(&book.author) {
            return Err(AppError::Validation("author is mandatory".to_string()));
        }

        let book = CreateBook {
            title: book.title.trim().to_string(),
            author: book.author.trim().to_string(),
            publication_date: book.publication_date,
            isbn: keep_if_blank(book.isbn),
            category: keep_if_blank(book.category),
        };

        if let Some(ref isbn) = book.isbn {
            if self.repository.books.isbn_exists(isbn).await? {
                return Err(AppError::Duplicate(
                    "A book with this ISBN already exists".to_string(),
                ));
            }
        }

        let mut tx = self.repository.pool.begin().await?;
        let id = self.repository.books.insert(&mut tx, &book).await?;
        tx.commit().await?;

        tracing::info!(book_id = id, title = %book.title, "book added");

        self.repository.books.get_by_id(id).await
    }

    /// Update an existing book.
    ///
    /// Absent or empty fields keep their stored value. ISBN uniqueness is
    /// not re-checked here; a colliding ISBN is rejected by the UNIQUE
    /// column at commit time.
    pub async fn update_book(&self, id: i64, update: UpdateBook) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await?;

        let update = UpdateBook {
            title: keep_if_blank(update.title),
            author: keep_if_blank(update.author),
            publication_date: update.publication_date,
            isbn: keep_if_blank(update.isbn),
            category: keep_if_blank(update.category),
        };

        let mut tx = self.repository.pool.begin().await?;
        self.repository.books.update(&mut tx, id, &update).await?;
        tx.commit().await?;

        self.repository.books.get_by_id(id).await
    }

    /// Remove a book, cascading deletion of its loan history in the same
    /// transaction.
    pub async fn remove_book(&self, id: i64) -> AppResult<()> {
        self.repository.books.get_by_id(id).await?;

        let mut tx = self.repository.pool.begin().await?;
        self.repository.loans.delete_by_book(&mut tx, id).await?;
        self.repository.books.delete(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!(book_id = id, "book removed");

        Ok(())
    }

    /// Get a book by ID
    pub async fn find_by_id(&self, id: i64) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// List all books
    pub async fn list_all(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list_all().await
    }

    /// List books without an active loan
    pub async fn list_available(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list_available().await
    }

    /// List books with an active loan
    pub async fn list_on_loan(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list_on_loan().await
    }

    /// Search books by title. Blank input returns an empty list without
    /// touching storage.
    pub async fn search_by_title(&self, title: &str) -> AppResult<Vec<Book>> {
        if is_blank(title) {
            return Ok(Vec::new());
        }
        self.repository.books.search_by_title(title).await
    }

    /// Search books by author (blank input returns empty)
    pub async fn search_by_author(&self, author: &str) -> AppResult<Vec<Book>> {
        if is_blank(author) {
            return Ok(Vec::new());
        }
        self.repository.books.search_by_author(author).await
    }

    /// Search books by category (blank input returns empty)
    pub async fn search_by_category(&self, category: &str) -> AppResult<Vec<Book>> {
        if is_blank(category) {
            return Ok(Vec::new());
        }
        self.repository.books.search_by_category(category).await
    }

    /// Check whether an ISBN is already taken. Blank ISBN is never taken
    /// and is not looked up.
    pub async fn isbn_exists(&self, isbn: &str) -> AppResult<bool> {
        if is_blank(isbn) {
            return Ok(false);
        }
        self.repository.books.isbn_exists(isbn).await
    }

    /// Export the whole catalog to a pretty-printed JSON file. Returns the
    /// number of books exported.
    pub async fn export_json(&self, path: &Path) -> AppResult<usize> {
        let books = self.repository.books.list_all().await?;
        let dtos: Vec<BookJson> = books.iter().map(BookJson::from).collect();

        let json = serde_json::to_string_pretty(&dtos)
            .map_err(|e| AppError::Internal(format!("Failed to serialize books: {}", e)))?;

        tokio::fs::write(path, json)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write {}: {}", path.display(), e)))?;

        tracing::info!(count = dtos.len(), path = %path.display(), "catalog exported");

        Ok(dtos.len())
    }

    /// Import books from a JSON file. A missing or unreadable file counts
    /// as zero imported; entries whose ISBN is already present are skipped.
    /// All inserts of one import share a single transaction.
    pub async fn import_json(&self, path: &Path) -> AppResult<usize> {
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!(path = %path.display(), "cannot read import file: {}", e);
                return Ok(0);
            }
        };

        let dtos: Vec<BookJson> = serde_json::from_str(&contents)
            .map_err(|e| AppError::Validation(format!("Invalid import file: {}", e)))?;

        if dtos.is_empty() {
            return Ok(0);
        }

        let mut count = 0;
        let mut tx = self.repository.pool.begin().await?;

        for dto in dtos {
            if let Some(ref isbn) = dto.isbn {
                if !is_blank(isbn) && self.repository.books.isbn_exists_on(&mut tx, isbn).await? {
                    tracing::warn!(title = %dto.titre, "import skipped, ISBN already exists");
                    continue;
                }
            }

            let book = CreateBook {
                title: dto.titre,
                author: dto.auteur,
                publication_date: dto.date_publication,
                isbn: keep_if_blank(dto.isbn),
                category: keep_if_blank(dto.categorie),
            };

            self.repository.books.insert(&mut tx, &book).await?;
            count += 1;
        }

        tx.commit().await?;

        tracing::info!(count, path = %path.display(), "catalog imported");

        Ok(count)
    }
}
