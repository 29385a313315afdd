//! Library circulation system for tracking books, patrons and loans.
//!
//! This crate provides the issue/return state machine for library books,
//! the patron quotas and loan periods that constrain it, and a JSON
//! persistence layer for carrying the library between runs.

pub mod book_state;
pub mod catalog;
pub mod error;
pub mod events;
pub mod observers;
pub mod patrons;
pub mod persistence;
pub mod system;
pub mod visualization;

pub use book_state::BookState;
pub use catalog::{Book, BookId, Catalog};
pub use error::{LibraryError, Result};
pub use events::BookEvent;
pub use patrons::{Patron, PatronId, PatronKind, Registry};
pub use persistence::{DEFAULT_DATA_FILE, LoadOutcome};
pub use system::{Library, OVERDUE_FINE, OverdueNotice, ReturnReceipt};
pub use visualization::CatalogView;
