//! Configuration file management.
//!
//! Handles loading and saving TOML configuration files.

use std::fs;
use std::path::Path;

use crate::domain::{AppConfig, AppError, Result};

/// Default configuration file content.
const DEFAULT_CONFIG: &str = r#"# Chat Log Excelizer Configuration
# Auto-generated - edit as needed

[plugin]
# Directory for exported spreadsheets (empty = current directory)
save_directory = ""

# Clear the current group's records after exporting it
auto_clear_data_table_enabled = true

# Kept for compatibility: exporting every group never clears records
auto_clear_all_data_table_enabled = true

# Send the exported file back to the group that asked for it
send_file_to_group_enabled = true

# Fixed UTC offset (hours) used for message timestamps
utc_offset_hours = 8

[storage]
# Custom database file (optional, defaults to ~/.chat-log-excelizer/storage.db)
# database_path = "/custom/path/storage.db"
"#;

/// Load configuration from the default location, or defaults if absent.
///
/// # Errors
/// Returns error if file exists but cannot be read or parsed.
pub fn load_config() -> Result<AppConfig> {
    let config_path = AppConfig::config_file_path();

    if config_path.exists() {
        load_config_from_file(&config_path)
    } else {
        Ok(AppConfig::default())
    }
}

/// Load configuration from a specific file.
///
/// # Errors
/// Returns error if file cannot be read or parsed.
pub fn load_config_from_file(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::io(format!("Failed to read config file: {}", path.display()), e))?;

    toml::from_str(&content).map_err(|e| AppError::Config {
        message: format!("Failed to parse config file: {e}"),
    })
}

/// Save configuration to a file.
///
/// # Errors
/// Returns error if file cannot be written.
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::io("Failed to create config directory", e))?;
    }

    let content = toml::to_string_pretty(config).map_err(|e| AppError::Config {
        message: format!("Failed to serialize config: {e}"),
    })?;

    fs::write(path, content)
        .map_err(|e| AppError::io(format!("Failed to write config file: {}", path.display()), e))?;

    tracing::info!(path = %path.display(), "Configuration saved");

    Ok(())
}

/// Create the default configuration file at `path` if it doesn't exist.
///
/// Returns whether a file was written.
///
/// # Errors
/// Returns error if file cannot be created.
pub fn ensure_config_exists(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::io("Failed to create config directory", e))?;
    }

    fs::write(path, DEFAULT_CONFIG)
        .map_err(|e| AppError::io("Failed to create default config", e))?;

    tracing::info!(path = %path.display(), "Created default configuration");

    Ok(true)
}
