//! Domain layer - core types, configuration and host ports.
//!
//! This layer contains pure domain models and error types
//! without any I/O of its own.

pub mod config;
pub mod error;
pub mod models;
pub mod ports;

pub use config::{AppConfig, PluginConfig, StorageConfig};
pub use error::{AppError, ExportError, Result};
pub use models::{
    resolve_scope, ChatRecord, MessageEvent, NewChatRecord, RecordFilter, SCOPE_SENTINEL,
};
pub use ports::{MessageListener, RecordStore, Session};
