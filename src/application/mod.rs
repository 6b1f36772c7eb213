//! Application layer - use cases and orchestration.
//!
//! This layer contains the plugin itself: message ingestion, the export
//! engine and the operator commands.

pub mod commands;
pub mod exporter;
pub mod formatter;
pub mod listener;
pub mod plugin;

pub use commands::{export_success, help_text, Command, CLEAR_SUCCESS};
pub use exporter::{export, export_at, export_filename, Cell, ExportDocument};
pub use formatter::format_records_table;
pub use listener::{format_capture_time, normalize_event};
pub use plugin::ChatLogPlugin;
