//! Infrastructure layer - external adapters (database, filesystem, terminal).
//!
//! This layer handles all I/O operations and external dependencies.

pub mod config;
pub mod console_session;
pub mod sqlite_store;

pub use config::{ensure_config_exists, load_config, load_config_from_file, save_config};
pub use console_session::ConsoleSession;
pub use sqlite_store::SqliteRecordStore;
