//! The chat log plugin instance.
//!
//! Ingestion lives in `listener`, the operator commands in `commands`.

use std::sync::Arc;

use chrono::FixedOffset;

use crate::domain::{PluginConfig, RecordStore, Result};

/// Chat log plugin bound to a record store and its configuration.
pub struct ChatLogPlugin<S> {
    pub(super) store: Arc<S>,
    pub(super) config: PluginConfig,
    pub(super) offset: FixedOffset,
}

impl<S: RecordStore> ChatLogPlugin<S> {
    /// Create a plugin instance.
    ///
    /// # Errors
    /// Returns error if the configured UTC offset is invalid.
    pub fn new(store: Arc<S>, config: PluginConfig) -> Result<Self> {
        let offset = config.time_offset()?;

        tracing::info!(
            save_directory = %config.save_directory.display(),
            auto_clear = config.auto_clear_data_table_enabled,
            send_file = config.send_file_to_group_enabled,
            "Chat log plugin ready"
        );

        Ok(Self {
            store,
            config,
            offset,
        })
    }

    /// The backing record store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &PluginConfig {
        &self.config
    }
}
