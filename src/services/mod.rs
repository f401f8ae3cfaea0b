//! Business logic services: validation, uniqueness checks, the loan state
//! machine, and transaction management around repository calls.

pub mod books;
pub mod loans;
pub mod users;

use crate::repository::Repository;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BooksService,
    pub users: users::UsersService,
    pub loans: loans::LoansService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository) -> Self {
        Self {
            books: books::BooksService::new(repository.clone()),
            users: users::UsersService::new(repository.clone()),
            loans: loans::LoansService::new(repository),
        }
    }
}

/// True when a mandatory string input is missing
pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Partial-update convention: an absent or empty value means "keep the
/// stored field", never "clear it".
pub(crate) fn keep_if_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !is_blank(v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_detects_whitespace_only() {
        assert!(is_blank(""));
        assert!(is_blank("   \t"));
        assert!(!is_blank(" x "));
    }

    #[test]
    fn keep_if_blank_drops_empty_values() {
        assert_eq!(keep_if_blank(None), None);
        assert_eq!(keep_if_blank(Some("".into())), None);
        assert_eq!(keep_if_blank(Some("  ".into())), None);
        assert_eq!(keep_if_blank(Some("Dune".into())), Some("Dune".to_string()));
    }
}
