#![allow(clippy::expect_used, clippy::panic)]

use std::fs;

use chrono::{Days, NaiveDate};
use circulation_system::{
    BookState, DEFAULT_DATA_FILE, Library, LibraryError, LoadOutcome, Patron, PatronKind,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

/// A fixed day used as "today" across the tests
fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 2, 14).expect("valid date")
}

/// A library with loans outstanding for both default patrons and a third patron
fn busy_library() -> Library {
    let mut library = Library::with_default_patrons();
    library.add_patron(Patron::learner(3, "Carol")).expect("new patron");
    library.add_book(1, "Dune", "Herbert");
    library.add_book(2, "Neuromancer", "Gibson");
    library.add_book(2, "Neuromancer", "Gibson");
    library.add_book(4, "Hyperion", "Simmons");
    library.add_book(5, "Emma", "Austen");

    let last_week = today().checked_sub_days(Days::new(7)).expect("valid date");
    library.issue_on(2, 2, last_week).expect("Bob borrows book 2");
    library.issue_on(5, 2, today()).expect("Bob borrows book 5");
    library.issue_on(2, 3, today()).expect("Carol borrows the other book 2");
    library.issue_on(1, 1, today()).expect("Alice borrows book 1");
    library
}

/// Load a library that must have been saved at `path`
fn load(path: &std::path::Path) -> Library {
    match Library::load_state_from_file(path).expect("load should succeed") {
        LoadOutcome::Restored(library) => library,
        LoadOutcome::NotFound => panic!("expected a saved library at {}", path.display()),
    }
}

#[test]
fn test_round_trip_reproduces_library() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join(DEFAULT_DATA_FILE);
    let library = busy_library();

    library.save_state_to_file(&path).expect("save should succeed");
    let loaded = load(&path);

    assert_eq!(loaded.catalog(), library.catalog());
    assert_eq!(loaded.registry(), library.registry());

    let bob = loaded.find_patron(2).expect("Bob exists");
    assert_eq!(bob.kind(), PatronKind::Instructor);
    assert_eq!((bob.quota(), bob.loan_period_days()), (5, 10));
    assert_eq!(bob.held_books(), &[2, 5]);

    let issued_on = today().checked_sub_days(Days::new(7)).expect("valid date");
    assert_eq!(
        *loaded.catalog().find_issued_book(2, 2).expect("Bob holds book 2").state(),
        BookState::Issued { patron_id: 2, issue_date: issued_on }
    );
    assert!(!fs::exists(dir.path().join("library_data.json.tmp")).expect("stat"));
}

#[test]
fn test_loaded_library_keeps_circulating() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join(DEFAULT_DATA_FILE);
    busy_library().save_state_to_file(&path).expect("save should succeed");

    let mut loaded = load(&path);
    let receipt = loaded.return_on(2, 3, today()).expect("Carol returns her copy");
    assert_eq!(receipt.overdue, None);
    assert!(matches!(loaded.issue_on(1, 3, today()), Err(LibraryError::BookUnavailable(1))));
    assert!(matches!(loaded.issue_on(4, 1, today()), Ok(_)));
    assert!(matches!(
        loaded.issue_on(2, 1, today()),
        Err(LibraryError::QuotaExceeded { patron_id: 1, quota: 2 })
    ));
}

#[test]
fn test_missing_file_is_not_found() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("nothing-here.json");

    let outcome = Library::load_state_from_file(&path).expect("missing file is not an error");
    assert!(matches!(outcome, LoadOutcome::NotFound));

    let library = Library::load_or_bootstrap(&path);
    assert!(library.catalog().is_empty());
    let names: Vec<&str> = library.registry().iter().map(Patron::name).collect();
    assert_eq!(names, vec!["Alice", "Bob"]);
}

#[test]
fn test_unparseable_file_is_corrupt() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join(DEFAULT_DATA_FILE);
    fs::write(&path, "{ not json").expect("write");

    let result = Library::load_state_from_file(&path);
    assert!(matches!(result, Err(LibraryError::CorruptData(_))));

    let library = Library::load_or_bootstrap(&path);
    assert!(library.catalog().is_empty());
    assert!(library.registry().is_empty());
}

#[test]
fn test_unreadable_file_degrades_to_empty_library() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join(DEFAULT_DATA_FILE);
    fs::create_dir(&path).expect("create directory in place of the data file");

    let result = Library::load_state_from_file(&path);
    assert!(matches!(result, Err(LibraryError::PersistenceIo(_))));

    let library = Library::load_or_bootstrap(&path);
    assert!(library.catalog().is_empty());
    assert!(library.registry().is_empty());
}

#[test]
fn test_inconsistent_file_is_corrupt() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join(DEFAULT_DATA_FILE);
    let snapshot = r#"{
        "books": [
            { "id": 1, "title": "Dune", "author": "Herbert", "state": "Available" }
        ],
        "patrons": [
            { "id": 1, "name": "Alice", "kind": "learner", "held_books": [1] }
        ]
    }"#;
    fs::write(&path, snapshot).expect("write");

    let result = Library::load_state_from_file(&path);
    assert!(matches!(result, Err(LibraryError::CorruptData(_))));
}

#[test]
fn test_over_quota_file_is_corrupt() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join(DEFAULT_DATA_FILE);
    let snapshot = r#"{
        "books": [
            { "id": 1, "title": "A", "author": "a", "state": { "Issued": { "patron_id": 1, "issue_date": "2025-01-01" } } },
            { "id": 2, "title": "B", "author": "b", "state": { "Issued": { "patron_id": 1, "issue_date": "2025-01-01" } } },
            { "id": 3, "title": "C", "author": "c", "state": { "Issued": { "patron_id": 1, "issue_date": "2025-01-01" } } }
        ],
        "patrons": [
            { "id": 1, "name": "Alice", "kind": "learner", "held_books": [1, 2, 3] }
        ]
    }"#;
    fs::write(&path, snapshot).expect("write");

    let result = Library::load_state_from_file(&path);
    assert!(matches!(result, Err(LibraryError::CorruptData(_))));
}

#[test]
fn test_save_into_missing_directory_fails_without_side_effects() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("no-such-dir").join(DEFAULT_DATA_FILE);
    let library = busy_library();

    let result = library.save_state_to_file(&path);
    assert!(matches!(result, Err(LibraryError::PersistenceIo(_))));
    assert_eq!(library.catalog().available_count(), 1);
}

#[test]
fn test_failed_rename_removes_staging_file() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join(DEFAULT_DATA_FILE);
    fs::create_dir(&path).expect("create directory in place of the data file");
    fs::write(path.join("occupant"), "keeps the directory non-empty").expect("write");

    let result = busy_library().save_state_to_file(&path);
    assert!(matches!(result, Err(LibraryError::PersistenceIo(_))));
    assert!(!fs::exists(dir.path().join("library_data.json.tmp")).expect("stat"));
    assert!(fs::exists(path.join("occupant")).expect("stat"));
}

#[test]
fn test_save_replaces_previous_snapshot() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join(DEFAULT_DATA_FILE);

    let mut library = Library::with_default_patrons();
    library.add_book(1, "Dune", "Herbert");
    library.save_state_to_file(&path).expect("first save");

    library.issue_on(1, 1, today()).expect("issue");
    library.save_state_to_file(&path).expect("second save");

    let loaded = load(&path);
    assert_eq!(loaded.list_held(1).expect("Alice exists").len(), 1);
    assert!(loaded.list_available().is_empty());
}
