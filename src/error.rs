use thiserror::Error;

use crate::{catalog::BookId, patrons::PatronId, patrons::PatronKind};

/// Errors produced by circulation and persistence operations
#[derive(Error, Debug)]
pub enum LibraryError {
    /// No patron is registered under the requested id
    #[error("Patron {0} not found")]
    PatronNotFound(PatronId),

    /// No book with this id is available, either because none exists or because every copy is issued
    #[error("Book {0} is not available")]
    BookUnavailable(BookId),

    /// The patron already holds as many books as their quota allows
    #[error("Patron {patron_id} has reached the issue limit of {quota} books")]
    QuotaExceeded { patron_id: PatronId, quota: usize },

    /// The patron does not hold a book with this id
    #[error("Book {book_id} is not issued to patron {patron_id}")]
    BookNotIssuedByPatron { book_id: BookId, patron_id: PatronId },

    /// A patron with this id is already registered
    #[error("Patron {0} already exists")]
    DuplicatePatron(PatronId),

    /// The patron exists but is not of the expected kind
    #[error("Patron {patron_id} is not a {expected}")]
    RoleMismatch { patron_id: PatronId, expected: PatronKind },

    /// The persisted artifact could not be parsed or is internally inconsistent
    #[error("Corrupt library data: {0}")]
    CorruptData(String),

    /// Reading or writing the persisted artifact failed
    #[error("Persistence I/O error: {0}")]
    PersistenceIo(#[from] std::io::Error),

    /// The library could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, LibraryError>;
