// Wacai Importer - Core Library
// Maps Wacai xlsx exports to Beancount transactions; used by the CLI and tests

pub mod config;
pub mod error;
pub mod handlers;
pub mod importer;
pub mod ledger;
pub mod logging;
pub mod resolver;
pub mod sheet;
pub mod translit;

// Re-export commonly used types
pub use config::{ImporterConfig, LookupTable, LookupTables, SpecialAccounts};
pub use error::{ExtractError, ExtractResult};
pub use handlers::{get_handler, ExtractContext, RowHandler};
pub use importer::{book_name, book_tag, WacaiImporter};
pub use ledger::{print_entries, Amount, Flag, Posting, Source, Transaction};
pub use resolver::{Diagnostics, Resolver};
pub use sheet::{read_rows, GridSheet, Row, Sheet, SheetKind, WorksheetRange};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
