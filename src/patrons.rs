use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    catalog::BookId,
    error::{LibraryError, Result},
};

/// Identifier of a patron, unique within a registry
pub type PatronId = u32;

/// The two classes of patron, differing only in borrowing limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatronKind {
    /// Borrows up to 2 books for 5 days
    Learner,
    /// Borrows up to 5 books for 10 days
    Instructor,
}

impl PatronKind {
    /// Maximum number of books held at once
    #[must_use]
    pub const fn quota(self) -> usize {
        match self {
            Self::Learner => 2,
            Self::Instructor => 5,
        }
    }

    /// Days a book may be held before it is overdue
    #[must_use]
    pub const fn loan_period_days(self) -> u32 {
        match self {
            Self::Learner => 5,
            Self::Instructor => 10,
        }
    }
}

impl fmt::Display for PatronKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Learner => write!(f, "Learner"),
            Self::Instructor => write!(f, "Instructor"),
        }
    }
}

/// A registered borrower
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Patron {
    /// Patron identifier
    id: PatronId,
    /// Display name
    name: String,
    /// Learner or Instructor
    kind: PatronKind,
    /// Ids of books currently issued to this patron, in issue order
    #[serde(default)]
    held_books: Vec<BookId>,
}

impl Patron {
    /// Create a patron holding no books
    #[must_use]
    pub fn new(id: PatronId, name: impl Into<String>, kind: PatronKind) -> Self {
        Self { id, name: name.into(), kind, held_books: Vec::new() }
    }

    /// Create a learner
    #[must_use]
    pub fn learner(id: PatronId, name: impl Into<String>) -> Self {
        Self::new(id, name, PatronKind::Learner)
    }

    /// Create an instructor
    #[must_use]
    pub fn instructor(id: PatronId, name: impl Into<String>) -> Self {
        Self::new(id, name, PatronKind::Instructor)
    }

    /// Patron identifier
    #[must_use]
    pub const fn id(&self) -> PatronId {
        self.id
    }

    /// Display name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Learner or Instructor
    #[must_use]
    pub const fn kind(&self) -> PatronKind {
        self.kind
    }

    /// Maximum number of books held at once
    #[must_use]
    pub const fn quota(&self) -> usize {
        self.kind.quota()
    }

    /// Days a book may be held before it is overdue
    #[must_use]
    pub const fn loan_period_days(&self) -> u32 {
        self.kind.loan_period_days()
    }

    /// Ids of held books in the order they were issued
    #[must_use]
    pub fn held_books(&self) -> &[BookId] {
        &self.held_books
    }

    /// Whether another book can be issued without exceeding the quota
    #[must_use]
    pub fn can_issue_more(&self) -> bool {
        self.held_books.len() < self.quota()
    }

    /// Whether a book with this id is held
    #[must_use]
    pub fn holds(&self, book_id: BookId) -> bool {
        self.held_books.contains(&book_id)
    }

    /// Record a newly issued book
    pub(crate) fn hold(&mut self, book_id: BookId) {
        self.held_books.push(book_id);
    }

    /// Drop the first held entry for `book_id`. Returns whether one was found.
    pub(crate) fn release(&mut self, book_id: BookId) -> bool {
        match self.held_books.iter().position(|&held| held == book_id) {
            Some(pos) => self.held_books.remove(pos) == book_id,
            None => false,
        }
    }
}

/// Every patron known to the library
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Registry {
    /// Patrons in registration order
    patrons: Vec<Patron>,
}

impl Registry {
    /// Create an empty registry
    #[must_use]
    pub const fn new() -> Self {
        Self { patrons: Vec::new() }
    }

    /// Registry seeded with the default patrons used on first start
    #[must_use]
    pub fn with_default_patrons() -> Self {
        Self { patrons: vec![Patron::learner(1, "Alice"), Patron::instructor(2, "Bob")] }
    }

    /// Look up a patron by id
    #[must_use]
    pub fn find_patron(&self, id: PatronId) -> Option<&Patron> {
        self.patrons.iter().find(|patron| patron.id == id)
    }

    /// Mutable lookup by id
    pub(crate) fn find_patron_mut(&mut self, id: PatronId) -> Option<&mut Patron> {
        self.patrons.iter_mut().find(|patron| patron.id == id)
    }

    /// Register a new patron
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::DuplicatePatron` if the id is already taken
    pub fn add_patron(&mut self, patron: Patron) -> Result<()> {
        if self.find_patron(patron.id).is_some() {
            return Err(LibraryError::DuplicatePatron(patron.id));
        }
        debug!(patron_id = patron.id, kind = %patron.kind, "registering patron");
        self.patrons.push(patron);
        Ok(())
    }

    /// Resolve a patron and check it is of the expected kind
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::PatronNotFound` if no patron has this id, or
    /// `LibraryError::RoleMismatch` if the patron is of another kind
    pub fn authenticate(&self, id: PatronId, expected: PatronKind) -> Result<&Patron> {
        let patron = self.find_patron(id).ok_or(LibraryError::PatronNotFound(id))?;
        if patron.kind != expected {
            return Err(LibraryError::RoleMismatch { patron_id: id, expected });
        }
        Ok(patron)
    }

    /// Iterate over patrons in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Patron> {
        self.patrons.iter()
    }

    /// Number of registered patrons
    #[must_use]
    pub fn len(&self) -> usize {
        self.patrons.len()
    }

    /// Whether no patron is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patrons.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_follow_kind() {
        let alice = Patron::learner(1, "Alice");
        let bob = Patron::instructor(2, "Bob");
        assert_eq!((alice.quota(), alice.loan_period_days()), (2, 5));
        assert_eq!((bob.quota(), bob.loan_period_days()), (5, 10));
    }

    #[test]
    fn test_quota_check() {
        let mut alice = Patron::learner(1, "Alice");
        assert!(alice.can_issue_more());
        alice.hold(10);
        alice.hold(11);
        assert!(!alice.can_issue_more());
        assert!(alice.release(10));
        assert!(!alice.release(10));
        assert_eq!(alice.held_books(), &[11]);
    }

    #[test]
    fn test_duplicate_patron_rejected() {
        let mut registry = Registry::with_default_patrons();
        let result = registry.add_patron(Patron::learner(1, "Mallory"));
        assert!(matches!(result, Err(LibraryError::DuplicatePatron(1))));
        assert_eq!(registry.len(), 2);
        assert!(registry.find_patron(1).is_some_and(|patron| patron.name() == "Alice"));
    }

    #[test]
    fn test_authenticate_checks_kind() {
        let registry = Registry::with_default_patrons();
        assert!(registry.authenticate(1, PatronKind::Learner).is_ok());
        assert!(matches!(
            registry.authenticate(1, PatronKind::Instructor),
            Err(LibraryError::RoleMismatch { patron_id: 1, expected: PatronKind::Instructor })
        ));
        assert!(matches!(
            registry.authenticate(3, PatronKind::Learner),
            Err(LibraryError::PatronNotFound(3))
        ));
    }
}
