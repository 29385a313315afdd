use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize, Serializer, ser::SerializeStruct};
use tracing::{debug, info, warn};

use crate::{
    catalog::Catalog,
    error::{LibraryError, Result},
    patrons::Registry,
    system::Library,
};

/// Well-known name of the data file, relative to the working directory
pub const DEFAULT_DATA_FILE: &str = "library_data.json";

/// Serializable representation of the library state
#[derive(Debug, Deserialize)]
struct SerializableLibrary {
    /// Every book, including its circulation state
    books: Catalog,
    /// Every patron, including held book ids
    patrons: Registry,
}

/// Borrowed view of a library, written in the `SerializableLibrary` layout
#[derive(Debug)]
struct LibrarySnapshot<'a> {
    /// Every book, including its circulation state
    books: &'a Catalog,
    /// Every patron, including held book ids
    patrons: &'a Registry,
}

impl Serialize for LibrarySnapshot<'_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("SerializableLibrary", 2)?;
        state.serialize_field("books", self.books)?;
        state.serialize_field("patrons", self.patrons)?;
        state.end()
    }
}

/// Result of reading the data file
#[derive(Debug)]
pub enum LoadOutcome {
    /// The file existed and held a consistent library
    Restored(Library),
    /// No data file exists yet
    NotFound,
}

impl LoadOutcome {
    /// The restored library, or an empty one when nothing was saved
    #[must_use]
    pub fn into_library(self) -> Library {
        match self {
            Self::Restored(library) => library,
            Self::NotFound => Library::new(),
        }
    }
}

/// Sibling path the snapshot is written to before being moved into place
fn staging_path(path: &Path) -> PathBuf {
    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    PathBuf::from(staging)
}

impl Library {
    /// Save the library to a JSON file
    ///
    /// The snapshot is written next to `path` and renamed over it, so a
    /// failed save leaves the previous file intact.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::Serialization` if the state cannot be encoded,
    /// or `LibraryError::PersistenceIo` if the file cannot be written
    pub fn save_state_to_file(&self, path: &Path) -> Result<()> {
        let snapshot = LibrarySnapshot { books: self.catalog(), patrons: self.registry() };

        let serialized = serde_json::to_string_pretty(&snapshot)?;

        let staging = staging_path(path);
        debug!(path = %staging.display(), "writing library snapshot");
        fs::write(&staging, serialized.as_bytes())?;
        if let Err(error) = fs::rename(&staging, path) {
            if let Err(cleanup) = fs::remove_file(&staging) {
                debug!(path = %staging.display(), %cleanup, "could not remove staging file");
            }
            return Err(error.into());
        }

        info!(
            path = %path.display(),
            books = self.catalog().len(),
            patrons = self.registry().len(),
            "library saved"
        );
        Ok(())
    }

    /// Load the library from a JSON file
    ///
    /// A missing file is not an error: it yields `LoadOutcome::NotFound`.
    ///
    /// # Errors
    ///
    /// Returns `LibraryError::PersistenceIo` if the file exists but cannot be
    /// read, or `LibraryError::CorruptData` if it cannot be parsed or
    /// describes an inconsistent library
    pub fn load_state_from_file(path: &Path) -> Result<LoadOutcome> {
        if !path.exists() {
            debug!(path = %path.display(), "no saved library found");
            return Ok(LoadOutcome::NotFound);
        }

        let contents = fs::read_to_string(path)?;

        let serializable_state: SerializableLibrary = serde_json::from_str(&contents)
            .map_err(|e| LibraryError::CorruptData(format!("Failed to parse JSON: {e}")))?;

        let library = Self::from_parts(serializable_state.books, serializable_state.patrons)?;
        info!(path = %path.display(), "{library}");
        Ok(LoadOutcome::Restored(library))
    }

    /// Load the library, falling back gracefully
    ///
    /// With no saved file the default patrons are seeded. An unreadable or
    /// corrupt file is logged and replaced by an empty library.
    #[must_use]
    pub fn load_or_bootstrap(path: &Path) -> Self {
        match Self::load_state_from_file(path) {
            Ok(LoadOutcome::Restored(library)) => library,
            Ok(LoadOutcome::NotFound) => {
                info!(path = %path.display(), "starting with the default patrons");
                Self::with_default_patrons()
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "could not load library, starting empty");
                Self::new()
            }
        }
    }
}
