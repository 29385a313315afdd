use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{events::BookEvent, patrons::PatronId};

/// Represents the possible states of a library book
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum BookState {
    /// Book is on the shelf and can be issued
    #[default]
    Available,
    /// Book is issued to a patron
    Issued {
        /// Patron currently holding the book
        patron_id: PatronId,
        /// Day the book was issued
        issue_date: NaiveDate,
    },
}

impl BookState {
    /// Get a human-readable description of the current state
    #[must_use]
    pub fn get_description(&self) -> String {
        match self {
            Self::Available => "Book is available for issue".to_string(),
            Self::Issued { patron_id, issue_date } => {
                format!("Book is issued to patron {patron_id} since {issue_date}")
            }
        }
    }

    /// Whether the book can be issued
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }

    /// The issue date, present only while the book is issued
    #[must_use]
    pub const fn issue_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Available => None,
            Self::Issued { issue_date, .. } => Some(*issue_date),
        }
    }

    /// The patron holding the book, if any
    #[must_use]
    pub const fn holder(&self) -> Option<PatronId> {
        match self {
            Self::Available => None,
            Self::Issued { patron_id, .. } => Some(*patron_id),
        }
    }

    /// Compute the state reached by applying `event`, or `None` if the
    /// event is not valid from this state.
    ///
    /// A return is only accepted from the patron the book is issued to.
    #[must_use]
    pub fn next(&self, event: &BookEvent) -> Option<Self> {
        match (self, event) {
            (Self::Available, BookEvent::Issue { patron_id, date }) => {
                Some(Self::Issued { patron_id: *patron_id, issue_date: *date })
            }
            (Self::Issued { patron_id: holder, .. }, BookEvent::Return { patron_id, .. })
                if holder == patron_id =>
            {
                Some(Self::Available)
            }
            _ => None,
        }
    }
}
