use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::patrons::PatronId;

/// Events that can cause a book state transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum BookEvent {
    /// Issue a book to a patron
    Issue {
        /// Patron borrowing the book
        patron_id: PatronId,
        /// Day of the issue
        date: NaiveDate,
    },
    /// Return a book to the library
    Return {
        /// Patron bringing the book back
        patron_id: PatronId,
        /// Day of the return
        date: NaiveDate,
    },
}

impl BookEvent {
    /// Patron that triggered the event
    #[must_use]
    pub const fn patron_id(&self) -> PatronId {
        match self {
            Self::Issue { patron_id, .. } | Self::Return { patron_id, .. } => *patron_id,
        }
    }

    /// Day the event happened
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        match self {
            Self::Issue { date, .. } | Self::Return { date, .. } => *date,
        }
    }
}
