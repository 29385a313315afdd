use std::fmt::Write;

use crate::{
    catalog::Book,
    patrons::Patron,
    system::{OverdueNotice, ReturnReceipt},
};

/// Text rendering of library records for the command line
#[derive(Debug)]
pub struct CatalogView;

impl CatalogView {
    /// One line describing a book
    #[must_use]
    pub fn book_line(book: &Book) -> String {
        format!(
            "ID: {}, Title: {}, Author: {}, Available: {}",
            book.id(),
            book.title(),
            book.author(),
            if book.is_available() { "Yes" } else { "No" }
        )
    }

    /// The available books, one per line under a header
    #[must_use]
    pub fn available_books(books: &[&Book]) -> String {
        let mut out = String::from("Available Books:\n");
        for book in books {
            let _ = writeln!(out, "{}", Self::book_line(book));
        }
        out
    }

    /// The books a patron holds, with their issue dates
    #[must_use]
    pub fn held_books(patron: &Patron, books: &[&Book]) -> String {
        let mut out = format!("{} has issued the following books:\n", patron.name());
        for book in books {
            let _ = write!(out, "{}", Self::book_line(book));
            if let Some(date) = book.issue_date() {
                let _ = write!(out, ", Issued: {date}");
            }
            out.push('\n');
        }
        out
    }

    /// The overdue message shown on a late return
    #[must_use]
    pub fn overdue(notice: &OverdueNotice) -> String {
        format!(
            "Return overdue by {} days. Fine applied: ${}.",
            notice.days_overdue, notice.fine
        )
    }

    /// Everything shown after a return
    #[must_use]
    pub fn receipt(patron: &Patron, receipt: &ReturnReceipt) -> String {
        let returned = format!("Book returned successfully by {}.", patron.name());
        match &receipt.overdue {
            Some(notice) => format!("{}\n{returned}", Self::overdue(notice)),
            None => returned,
        }
    }
}
