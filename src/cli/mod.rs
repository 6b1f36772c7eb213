//! CLI interface using clap.
//!
//! The binary plays the host framework: it feeds message events to the
//! plugin and runs the plugin's commands from the terminal.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Chat Log Excelizer - record chat messages and export them to Excel.
#[derive(Parser, Debug)]
#[command(name = "chat-log-excelizer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (use multiple times for more verbosity).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file (defaults to ~/.chat-log-excelizer/config.toml).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Database file, overriding the configured one.
    #[arg(long)]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record a single inbound message.
    Record {
        /// Group/channel id (omit for a direct message).
        #[arg(short, long)]
        scope: Option<String>,

        /// Author id.
        #[arg(short, long)]
        user: String,

        /// Author display name.
        #[arg(short = 'n', long, default_value = "")]
        username: String,

        /// Capture time in epoch milliseconds (defaults to now).
        #[arg(short, long)]
        timestamp: Option<i64>,

        /// Message body.
        #[arg(short, long)]
        content: String,
    },

    /// Record messages from stdin, one JSON event per line.
    Ingest,

    /// Show the plugin's command help (chatLogExcelizer).
    Usage,

    /// Export chat logs of every group (chatLogExcelizer.exporterAll).
    ExporterAll {
        /// Group the command is invoked from.
        #[arg(short, long)]
        scope: Option<String>,
    },

    /// Export chat logs of one group (chatLogExcelizer.exporter).
    Exporter {
        /// Group to export (omit for direct messages).
        #[arg(short, long)]
        scope: Option<String>,
    },

    /// Clear every group's chat logs (chatLogExcelizer.clearAllData).
    ClearAllData,

    /// Clear one group's chat logs (chatLogExcelizer.clearData).
    ClearData {
        /// Group to clear (omit for direct messages).
        #[arg(short, long)]
        scope: Option<String>,
    },

    /// Run a plugin command by its registered name.
    Run {
        /// Command name, e.g. chatLogExcelizer.exporter.
        name: String,

        /// Group the command is invoked from.
        #[arg(short, long)]
        scope: Option<String>,
    },

    /// List stored chat records.
    List {
        /// Only show one group.
        #[arg(short, long)]
        scope: Option<String>,

        /// Maximum number of records to show (0 = all).
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Write the default configuration file.
    InitConfig {
        /// Overwrite with the currently loaded configuration.
        #[arg(long)]
        force: bool,
    },
}
