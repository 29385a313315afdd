use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{book_state::BookState, patrons::PatronId};

/// Identifier of a book. Not guaranteed unique within a catalog.
pub type BookId = u32;

/// A single book record
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Book {
    /// Catalog identifier
    id: BookId,
    /// Title of the book
    title: String,
    /// Author of the book
    author: String,
    /// Circulation state
    #[serde(default)]
    state: BookState,
}

impl Book {
    /// Create a new book in the `Available` state
    #[must_use]
    pub fn new(id: BookId, title: impl Into<String>, author: impl Into<String>) -> Self {
        Self { id, title: title.into(), author: author.into(), state: BookState::Available }
    }

    /// Catalog identifier
    #[must_use]
    pub const fn id(&self) -> BookId {
        self.id
    }

    /// Title of the book
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Author of the book
    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Current circulation state
    #[must_use]
    pub const fn state(&self) -> &BookState {
        &self.state
    }

    /// Whether the book can be issued
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.state.is_available()
    }

    /// The issue date, present only while the book is issued
    #[must_use]
    pub const fn issue_date(&self) -> Option<NaiveDate> {
        self.state.issue_date()
    }

    /// Replace the circulation state
    pub(crate) fn set_state(&mut self, state: BookState) {
        self.state = state;
    }
}

/// Ordered collection of every book known to the library
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    /// Books in insertion order
    books: Vec<Book>,
}

impl Catalog {
    /// Create an empty catalog
    #[must_use]
    pub const fn new() -> Self {
        Self { books: Vec::new() }
    }

    /// Append a new available book. Duplicate ids are accepted.
    pub fn add_book(
        &mut self,
        id: BookId,
        title: impl Into<String>,
        author: impl Into<String>,
    ) {
        self.books.push(Book::new(id, title, author));
    }

    /// First available book with the given id
    #[must_use]
    pub fn find_available_book(&self, id: BookId) -> Option<&Book> {
        self.books.iter().find(|book| book.id == id && book.is_available())
    }

    /// Mutable access to the first available book with the given id
    pub(crate) fn find_available_book_mut(&mut self, id: BookId) -> Option<&mut Book> {
        self.books.iter_mut().find(|book| book.id == id && book.is_available())
    }

    /// First book with the given id that is issued to `patron_id`
    #[must_use]
    pub fn find_issued_book(&self, id: BookId, patron_id: PatronId) -> Option<&Book> {
        self.books.iter().find(|book| book.id == id && book.state.holder() == Some(patron_id))
    }

    /// Mutable access to the first book with the given id issued to `patron_id`
    pub(crate) fn find_issued_book_mut(
        &mut self,
        id: BookId,
        patron_id: PatronId,
    ) -> Option<&mut Book> {
        self.books.iter_mut().find(|book| book.id == id && book.state.holder() == Some(patron_id))
    }

    /// All available books in insertion order
    pub fn list_available(&self) -> impl Iterator<Item = &Book> {
        self.books.iter().filter(|book| book.is_available())
    }

    /// Number of books currently available
    #[must_use]
    pub fn available_count(&self) -> usize {
        self.list_available().count()
    }

    /// Iterate over every book in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Book> {
        self.books.iter()
    }

    /// Total number of books
    #[must_use]
    pub fn len(&self) -> usize {
        self.books.len()
    }

    /// Whether the catalog holds no books
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}
