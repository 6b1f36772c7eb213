//! Plugin and application configuration models.
//!
//! The `[plugin]` section mirrors the options the host exposes for the
//! plugin; the camelCase host names are accepted as aliases.

use std::path::{Path, PathBuf};

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use super::error::{AppError, Result};

/// Options recognized by the chat log plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Directory for exported spreadsheets. Empty means the working directory.
    #[serde(default, alias = "saveDirectory")]
    pub save_directory: PathBuf,

    /// Clear the current scope's records after a scoped export.
    #[serde(default = "default_enabled", alias = "autoClearDataTableEnabled")]
    pub auto_clear_data_table_enabled: bool,

    /// Recognized for compatibility; exporting all scopes never clears.
    #[serde(default = "default_enabled", alias = "autoClearAllDataTableEnabled")]
    pub auto_clear_all_data_table_enabled: bool,

    /// Send the exported file back to the invoking scope.
    #[serde(default = "default_enabled", alias = "sendFileToGroupEnabled")]
    pub send_file_to_group_enabled: bool,

    /// Fixed UTC offset used to render capture times.
    #[serde(default = "default_utc_offset_hours", alias = "utcOffsetHours")]
    pub utc_offset_hours: i32,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            save_directory: PathBuf::new(),
            auto_clear_data_table_enabled: default_enabled(),
            auto_clear_all_data_table_enabled: default_enabled(),
            send_file_to_group_enabled: default_enabled(),
            utc_offset_hours: default_utc_offset_hours(),
        }
    }
}

const fn default_enabled() -> bool {
    true
}

const fn default_utc_offset_hours() -> i32 {
    8 // Asia/Shanghai
}

impl PluginConfig {
    /// Configured export directory, `None` when unset.
    #[must_use]
    pub fn save_directory(&self) -> Option<&Path> {
        if self.save_directory.as_os_str().is_empty() {
            None
        } else {
            Some(&self.save_directory)
        }
    }

    /// Timezone used for capture times.
    ///
    /// # Errors
    /// Returns error if the offset is outside ±23 hours.
    pub fn time_offset(&self) -> Result<FixedOffset> {
        self.utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| AppError::Config {
                message: format!("Invalid UTC offset: {} hours", self.utc_offset_hours),
            })
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// SQLite database file (optional, defaults to the data directory).
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Plugin behaviour.
    #[serde(default)]
    pub plugin: PluginConfig,

    /// Record store location.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".chat-log-excelizer")
    }

    /// Get the storage database path.
    #[must_use]
    pub fn storage_db_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join("storage.db"))
    }

    /// Get the config file path.
    #[must_use]
    pub fn config_file_path() -> PathBuf {
        Self::default_data_dir().join("config.toml")
    }
}
