// Lottery Ledger - Core Library
// Exposes all modules for use in CLI, web server, and tests

pub mod availability;
pub mod bank;
pub mod config;
pub mod dates;
pub mod entry;
pub mod error;
pub mod export;
pub mod form;
pub mod ledger;
pub mod registry;
pub mod store;
pub mod summary;

#[cfg(feature = "server")]
pub mod pages;
#[cfg(feature = "server")]
pub mod server;

#[cfg(feature = "tui")]
pub mod ui;

// Re-export commonly used types
pub use availability::{available_banks, used_banks};
pub use bank::{Bank, FACE_VALUES};
pub use config::Config;
pub use dates::{current_week_range, resolve_range, DateRange, RangeResolution};
pub use entry::{Entry, SubEntry};
pub use error::LedgerError;
pub use export::{export_csv, write_csv};
pub use form::{create_entry, EntryForm};
pub use ledger::{filter_history, Ledger, Overview, OverviewQuery};
pub use registry::{UserRegistry, DEFAULT_USERS};
pub use store::{JsonFileStore, LedgerStore, MemoryStore};
pub use summary::{summarize, BankTotals, Summary};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
