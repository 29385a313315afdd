use std::fmt;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::{
    catalog::{Book, BookId, Catalog},
    error::{LibraryError, Result},
    events::BookEvent,
    observers::{CirculationObserver, OverdueNotifier, TransitionLogger},
    patrons::{Patron, PatronId, PatronKind, Registry},
};

/// Flat fine, in dollars, reported for any late return
pub const OVERDUE_FINE: u32 = 10;

/// Advisory notice produced when a book comes back after its loan period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OverdueNotice {
    /// The returned book
    pub book_id: BookId,
    /// The patron who returned it
    pub patron_id: PatronId,
    /// Whole days past the loan period
    pub days_overdue: i64,
    /// Flat fine in dollars
    pub fine: u32,
}

/// Outcome of a successful return
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnReceipt {
    /// The book, now available again
    pub book: Book,
    /// Present when the return was late
    pub overdue: Option<OverdueNotice>,
}

/// The library: the catalog, the patron registry and the rules that tie them
pub struct Library {
    /// All books
    catalog: Catalog,
    /// All patrons
    registry: Registry,
    /// Registered circulation observers
    observers: Vec<Box<dyn CirculationObserver>>,
}

// Manual implementation of Debug for Library
impl fmt::Debug for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Library")
            .field("catalog", &self.catalog)
            .field("registry", &self.registry)
            .field("observers_count", &self.observers.len())
            .finish()
    }
}

impl Default for Library {
    fn default() -> Self {
        Self::new()
    }
}

/// Today's date on the local clock
fn today() -> NaiveDate {
    Local::now().date_naive()
}

impl Library {
    /// Create an empty library with the standard observers attached
    #[must_use]
    pub fn new() -> Self {
        Self::with_stores(Catalog::new(), Registry::new())
    }

    /// Create a library holding only the default patrons
    #[must_use]
    pub fn with_default_patrons() -> Self {
        Self::with_stores(Catalog::new(), Registry::with_default_patrons())
    }

    /// Assemble a library from previously stored parts, checking that
    /// every issued book is held by exactly the patron it names.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::CorruptData` if the parts are inconsistent
    pub fn from_parts(catalog: Catalog, registry: Registry) -> Result<Self> {
        check_consistency(&catalog, &registry)?;
        Ok(Self::with_stores(catalog, registry))
    }

    /// Wrap the stores and attach the standard observers
    fn with_stores(catalog: Catalog, registry: Registry) -> Self {
        let mut library = Self { catalog, registry, observers: Vec::new() };
        library.register_observer(Box::new(TransitionLogger));
        library.register_observer(Box::new(OverdueNotifier));
        library
    }

    /// Register an observer to be notified of circulation changes
    pub fn register_observer(&mut self, observer: Box<dyn CirculationObserver>) {
        self.observers.push(observer);
    }

    /// The book catalog
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The patron registry
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Add a new available book. Duplicate ids are accepted.
    pub fn add_book(&mut self, id: BookId, title: impl Into<String>, author: impl Into<String>) {
        self.catalog.add_book(id, title, author);
    }

    /// Register a new patron
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::DuplicatePatron` if the id is already taken
    pub fn add_patron(&mut self, patron: Patron) -> Result<()> {
        self.registry.add_patron(patron)
    }

    /// Look up a patron by id
    #[must_use]
    pub fn find_patron(&self, id: PatronId) -> Option<&Patron> {
        self.registry.find_patron(id)
    }

    /// Resolve a patron and check it is of the expected kind
    ///
    /// # Errors
    ///
    /// See [`Registry::authenticate`]
    pub fn authenticate(&self, id: PatronId, expected: PatronKind) -> Result<&Patron> {
        self.registry.authenticate(id, expected)
    }

    /// Issue a book to a patron, dated today
    ///
    /// # Errors
    ///
    /// See [`Library::issue_on`]
    pub fn issue(&mut self, book_id: BookId, patron_id: PatronId) -> Result<&Book> {
        self.issue_on(book_id, patron_id, today())
    }

    /// Issue the first available copy of `book_id` to a patron on `date`
    ///
    /// # Errors
    ///
    /// Returns, without changing any state:
    /// - `LibraryError::PatronNotFound` if the patron does not exist
    /// - `LibraryError::QuotaExceeded` if the patron already holds their quota
    /// - `LibraryError::BookUnavailable` if no copy of the book is available
    pub fn issue_on(
        &mut self,
        book_id: BookId,
        patron_id: PatronId,
        date: NaiveDate,
    ) -> Result<&Book> {
        let patron = self
            .registry
            .find_patron_mut(patron_id)
            .ok_or(LibraryError::PatronNotFound(patron_id))?;

        if !patron.can_issue_more() {
            return Err(LibraryError::QuotaExceeded { patron_id, quota: patron.quota() });
        }

        let book = self
            .catalog
            .find_available_book_mut(book_id)
            .ok_or(LibraryError::BookUnavailable(book_id))?;

        let event = BookEvent::Issue { patron_id, date };
        let from = *book.state();
        let next = from.next(&event).ok_or(LibraryError::BookUnavailable(book_id))?;

        book.set_state(next);
        patron.hold(book_id);
        debug!(book_id, patron_id, held = patron.held_books().len(), "book issued");

        for observer in &self.observers {
            observer.on_state_change(book, &from, &event);
        }

        Ok(book)
    }

    /// Return a book held by a patron, dated today
    ///
    /// # Errors
    ///
    /// See [`Library::return_on`]
    pub fn return_book(&mut self, book_id: BookId, patron_id: PatronId) -> Result<ReturnReceipt> {
        self.return_on(book_id, patron_id, today())
    }

    /// Return a book held by a patron on `date`, reporting an overdue notice
    /// when the loan period has elapsed
    ///
    /// # Errors
    ///
    /// Returns, without changing any state:
    /// - `LibraryError::PatronNotFound` if the patron does not exist
    /// - `LibraryError::BookNotIssuedByPatron` if the patron does not hold the book
    pub fn return_on(
        &mut self,
        book_id: BookId,
        patron_id: PatronId,
        date: NaiveDate,
    ) -> Result<ReturnReceipt> {
        let patron = self
            .registry
            .find_patron_mut(patron_id)
            .ok_or(LibraryError::PatronNotFound(patron_id))?;

        let not_held = LibraryError::BookNotIssuedByPatron { book_id, patron_id };
        if !patron.holds(book_id) {
            return Err(not_held);
        }

        let book = self.catalog.find_issued_book_mut(book_id, patron_id).ok_or(not_held)?;

        let event = BookEvent::Return { patron_id, date };
        let from = *book.state();
        let next =
            from.next(&event).ok_or(LibraryError::BookNotIssuedByPatron { book_id, patron_id })?;

        let overdue = from.issue_date().and_then(|issue_date| {
            let days_held = date.signed_duration_since(issue_date).num_days();
            let days_overdue = days_held.saturating_sub(i64::from(patron.loan_period_days()));
            (days_overdue > 0).then_some(OverdueNotice {
                book_id,
                patron_id,
                days_overdue,
                fine: OVERDUE_FINE,
            })
        });

        book.set_state(next);
        patron.release(book_id);
        debug!(book_id, patron_id, held = patron.held_books().len(), "book returned");

        for observer in &self.observers {
            observer.on_state_change(book, &from, &event);
            if let Some(notice) = &overdue {
                observer.on_overdue(book, notice);
            }
        }

        Ok(ReturnReceipt { book: book.clone(), overdue })
    }

    /// Books held by a patron, in the order they were issued
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::PatronNotFound` if the patron does not exist
    pub fn list_held(&self, patron_id: PatronId) -> Result<Vec<&Book>> {
        let patron =
            self.registry.find_patron(patron_id).ok_or(LibraryError::PatronNotFound(patron_id))?;

        let mut held: Vec<&Book> = Vec::with_capacity(patron.held_books().len());
        for &book_id in patron.held_books() {
            // Two copies sharing an id are both held under that id; pick the
            // next copy not already listed.
            let book = self.catalog.iter().find(|book| {
                book.id() == book_id
                    && book.state().holder() == Some(patron_id)
                    && !held.iter().any(|listed| std::ptr::eq(*listed, *book))
            });
            if let Some(book) = book {
                held.push(book);
            }
        }
        Ok(held)
    }

    /// All available books in insertion order
    #[must_use]
    pub fn list_available(&self) -> Vec<&Book> {
        self.catalog.list_available().collect()
    }
}

/// Verify the issue relation between books and patrons is one-to-one
fn check_consistency(catalog: &Catalog, registry: &Registry) -> Result<()> {
    let mut seen: Vec<PatronId> = Vec::with_capacity(registry.len());
    for patron in registry.iter() {
        if seen.contains(&patron.id()) {
            return Err(LibraryError::CorruptData(format!("duplicate patron id {}", patron.id())));
        }
        seen.push(patron.id());

        if patron.held_books().len() > patron.quota() {
            return Err(LibraryError::CorruptData(format!(
                "patron {} holds {} books, over the quota of {}",
                patron.id(),
                patron.held_books().len(),
                patron.quota()
            )));
        }

        for &book_id in patron.held_books() {
            let held = patron.held_books().iter().filter(|&&id| id == book_id).count();
            let issued = catalog
                .iter()
                .filter(|book| book.id() == book_id && book.state().holder() == Some(patron.id()))
                .count();
            if held != issued {
                return Err(LibraryError::CorruptData(format!(
                    "patron {} holds book {book_id} {held} time(s) but {issued} cop(ies) are issued to them",
                    patron.id()
                )));
            }
        }
    }

    let issued_total = catalog.iter().filter(|book| !book.is_available()).count();
    let held_total: usize = registry.iter().map(|patron| patron.held_books().len()).sum();
    if issued_total != held_total {
        return Err(LibraryError::CorruptData(format!(
            "{issued_total} books are issued but patrons hold {held_total}"
        )));
    }

    Ok(())
}

// Implementing display for nicer output
impl fmt::Display for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} books ({} available), {} patrons",
            self.catalog.len(),
            self.catalog.available_count(),
            self.registry.len()
        )
    }
}
