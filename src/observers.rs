use tracing::{info, warn};

use crate::{book_state::BookState, catalog::Book, events::BookEvent, system::OverdueNotice};

/// Trait for circulation observation
pub trait CirculationObserver {
    /// Called after a book changes state. `book` already carries the new state.
    fn on_state_change(&self, book: &Book, from: &BookState, event: &BookEvent);

    /// Called when a return happens after the loan period elapsed
    fn on_overdue(&self, _book: &Book, _notice: &OverdueNotice) {}
}

/// Logs all transitions that occur in the system
#[derive(Debug)]
pub struct TransitionLogger;

impl CirculationObserver for TransitionLogger {
    fn on_state_change(&self, book: &Book, from: &BookState, event: &BookEvent) {
        info!(
            book_id = book.id(),
            title = book.title(),
            patron_id = event.patron_id(),
            date = %event.date(),
            "{} -> {}",
            from.get_description(),
            book.state().get_description()
        );
    }
}

/// Reports overdue returns
#[derive(Debug)]
pub struct OverdueNotifier;

impl CirculationObserver for OverdueNotifier {
    fn on_state_change(&self, _book: &Book, _from: &BookState, _event: &BookEvent) {}

    fn on_overdue(&self, book: &Book, notice: &OverdueNotice) {
        warn!(
            book_id = book.id(),
            patron_id = notice.patron_id,
            days_overdue = notice.days_overdue,
            fine = notice.fine,
            "Book returned late"
        );
    }
}
