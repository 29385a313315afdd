use std::path::PathBuf;

use anyhow::{Context, Result};
use circulation_system::{
    BookId, CatalogView, DEFAULT_DATA_FILE, Library, LibraryError, Patron, PatronId, PatronKind,
};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Library circulation manager
#[derive(Debug, Parser)]
#[command(name = "circulation", version, about)]
struct Cli {
    /// Path of the library data file
    #[arg(long, global = true, default_value = DEFAULT_DATA_FILE)]
    data_file: PathBuf,

    /// Log filter, e.g. `info` or `circulation_system=debug`
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Operation to perform
    #[command(subcommand)]
    command: Commands,
}

/// Patron kind as given on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    /// Borrows up to 2 books for 5 days
    Learner,
    /// Borrows up to 5 books for 10 days
    Instructor,
}

impl From<KindArg> for PatronKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Learner => Self::Learner,
            KindArg::Instructor => Self::Instructor,
        }
    }
}

/// Available subcommands
#[derive(Debug, Subcommand)]
enum Commands {
    /// Add a book to the catalog
    AddBook {
        /// Book id
        id: BookId,
        /// Title
        title: String,
        /// Author
        author: String,
    },
    /// Register a patron
    AddPatron {
        /// Patron id
        id: PatronId,
        /// Name
        name: String,
        /// Learner or instructor
        #[arg(long, value_enum)]
        kind: KindArg,
    },
    /// Issue a book to a patron
    Issue {
        /// Book id
        book_id: BookId,
        /// Patron id
        #[arg(long)]
        patron: PatronId,
        /// Require the patron to be of this kind
        #[arg(long = "as", value_enum)]
        role: Option<KindArg>,
    },
    /// Return a book held by a patron
    Return {
        /// Book id
        book_id: BookId,
        /// Patron id
        #[arg(long)]
        patron: PatronId,
        /// Require the patron to be of this kind
        #[arg(long = "as", value_enum)]
        role: Option<KindArg>,
    },
    /// List the books a patron holds
    Held {
        /// Patron id
        #[arg(long)]
        patron: PatronId,
    },
    /// List the books available for issue
    Available,
}

/// Apply one command. Returns whether the library changed and must be saved.
fn run(library: &mut Library, command: Commands) -> Result<bool> {
    match command {
        Commands::AddBook { id, title, author } => {
            library.add_book(id, title, author);
            println!("Book added successfully.");
            Ok(true)
        }
        Commands::AddPatron { id, name, kind } => {
            library.add_patron(Patron::new(id, name, kind.into()))?;
            println!("Patron added successfully.");
            Ok(true)
        }
        Commands::Issue { book_id, patron, role } => {
            if let Some(role) = role {
                library.authenticate(patron, role.into())?;
            }
            library.issue(book_id, patron)?;
            if let Some(patron) = library.find_patron(patron) {
                println!("Book issued successfully to {}.", patron.name());
            }
            Ok(true)
        }
        Commands::Return { book_id, patron, role } => {
            if let Some(role) = role {
                library.authenticate(patron, role.into())?;
            }
            let receipt = library.return_book(book_id, patron)?;
            if let Some(patron) = library.find_patron(patron) {
                println!("{}", CatalogView::receipt(patron, &receipt));
            }
            Ok(true)
        }
        Commands::Held { patron: patron_id } => {
            let patron =
                library.find_patron(patron_id).ok_or(LibraryError::PatronNotFound(patron_id))?;
            let books = library.list_held(patron_id)?;
            print!("{}", CatalogView::held_books(patron, &books));
            Ok(false)
        }
        Commands::Available => {
            print!("{}", CatalogView::available_books(&library.list_available()));
            Ok(false)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber for logging
    let filter = EnvFilter::try_new(&cli.log_level)
        .with_context(|| format!("invalid log level: {}", cli.log_level))?;
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let mut library = Library::load_or_bootstrap(&cli.data_file);

    if run(&mut library, cli.command)? {
        library
            .save_state_to_file(&cli.data_file)
            .with_context(|| format!("failed to save {}", cli.data_file.display()))?;
    }

    Ok(())
}
