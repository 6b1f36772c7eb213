//! Chat Log Excelizer - command-line host for the chat log plugin.
//!
//! Feeds message events to the plugin and runs its commands from a terminal,
//! with the terminal standing in for the chat group.
//!
//! QUICK START:
//!   chat-log-excelizer record -s g1 -u 10001 -n alice -c "hello"
//!   some-bot --events | chat-log-excelizer ingest
//!   chat-log-excelizer exporter -s g1          # export + clear group g1
//!   chat-log-excelizer exporter-all            # export everything
//!   chat-log-excelizer run chatLogExcelizer.clearData -s g1

mod cli;

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use clap::Parser;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use chat_log_excelizer::application::{format_records_table, ChatLogPlugin, Command};
use chat_log_excelizer::domain::{
    self, AppConfig, AppError, MessageEvent, MessageListener, RecordFilter, RecordStore,
};
use chat_log_excelizer::infrastructure::{
    ensure_config_exists, load_config, load_config_from_file, save_config, ConsoleSession,
    SqliteRecordStore,
};
use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Main application logic.
async fn run(cli: Cli) -> domain::Result<()> {
    let Cli {
        config: config_path,
        database,
        command,
        ..
    } = cli;

    let config = match &config_path {
        Some(path) => load_config_from_file(path)?,
        None => load_config()?,
    };

    match command {
        Commands::InitConfig { force } => {
            cmd_init_config(config_path.as_deref(), &config, force)?;
        }
        Commands::Record {
            scope,
            user,
            username,
            timestamp,
            content,
        } => {
            let plugin = open_plugin(database.as_deref(), config)?;
            let event = MessageEvent {
                scope_id: scope,
                user_id: user,
                username,
                timestamp: timestamp.unwrap_or_else(|| Utc::now().timestamp_millis()),
                content,
            };
            plugin.on_message(event).await?;
            println!("{} Message recorded", "✓".green().bold());
        }
        Commands::Ingest => {
            let plugin = open_plugin(database.as_deref(), config)?;
            cmd_ingest(&plugin).await?;
        }
        Commands::Usage => {
            let plugin = open_plugin(database.as_deref(), config)?;
            invoke(&plugin, Command::Help, None).await?;
        }
        Commands::ExporterAll { scope } => {
            let plugin = open_plugin(database.as_deref(), config)?;
            invoke(&plugin, Command::ExportAll, scope).await?;
        }
        Commands::Exporter { scope } => {
            let plugin = open_plugin(database.as_deref(), config)?;
            invoke(&plugin, Command::Export, scope).await?;
        }
        Commands::ClearAllData => {
            let plugin = open_plugin(database.as_deref(), config)?;
            invoke(&plugin, Command::ClearAll, None).await?;
        }
        Commands::ClearData { scope } => {
            let plugin = open_plugin(database.as_deref(), config)?;
            invoke(&plugin, Command::Clear, scope).await?;
        }
        Commands::Run { name, scope } => {
            let command: Command = name.parse()?;
            let plugin = open_plugin(database.as_deref(), config)?;
            invoke(&plugin, command, scope).await?;
        }
        Commands::List { scope, limit } => {
            let plugin = open_plugin(database.as_deref(), config)?;
            cmd_list(&plugin, scope, limit).await?;
        }
    }

    Ok(())
}

/// Open the record store and build the plugin on top of it.
///
/// `database` overrides the configured store path.
fn open_plugin(
    database: Option<&Path>,
    config: AppConfig,
) -> domain::Result<ChatLogPlugin<SqliteRecordStore>> {
    let db_path = database.map_or_else(|| config.storage_db_path(), Path::to_path_buf);
    let store = Arc::new(SqliteRecordStore::open(&db_path)?);
    ChatLogPlugin::new(store, config.plugin)
}

/// Dispatch a plugin command from a console session and print its reply.
async fn invoke<S: RecordStore>(
    plugin: &ChatLogPlugin<S>,
    command: Command,
    scope: Option<String>,
) -> domain::Result<()> {
    let session = ConsoleSession::new(scope);

    match plugin.dispatch(command, &session).await? {
        Some(reply) => println!("{reply}"),
        None => tracing::warn!(%command, "Command produced no reply"),
    }

    Ok(())
}

/// Feed JSON-lines message events from stdin to the plugin.
async fn cmd_ingest<S: RecordStore>(plugin: &ChatLogPlugin<S>) -> domain::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut count = 0usize;

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| AppError::io("Failed to read stdin", e))?
    {
        if line.trim().is_empty() {
            continue;
        }

        let event: MessageEvent = serde_json::from_str(&line).map_err(AppError::json_parse)?;
        plugin.on_message(event).await?;
        count += 1;
    }

    println!("{} Recorded {} messages", "✓".green().bold(), count);
    Ok(())
}

/// List stored records.
async fn cmd_list<S: RecordStore>(
    plugin: &ChatLogPlugin<S>,
    scope: Option<String>,
    limit: usize,
) -> domain::Result<()> {
    let filter = scope.map_or_else(RecordFilter::all, RecordFilter::scope);
    let mut records = plugin.store().get(&filter).await?;
    let total = records.len();

    if limit > 0 {
        records.truncate(limit);
    }

    println!("{}", format_records_table(&records));
    println!("Showing {} of {} record(s)", records.len(), total);

    Ok(())
}

/// Write the configuration file.
fn cmd_init_config(path: Option<&Path>, config: &AppConfig, force: bool) -> domain::Result<()> {
    let path = path.map_or_else(AppConfig::config_file_path, Path::to_path_buf);

    if force {
        save_config(config, &path)?;
    } else if !ensure_config_exists(&path)? {
        println!("Configuration already exists: {}", path.display());
        return Ok(());
    }

    println!("{} Configuration written to {}", "✓".green().bold(), path.display());
    Ok(())
}

/// Setup tracing/logging based on verbosity level.
fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_config_does_not_open_store() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        let config = AppConfig::default();

        cmd_init_config(Some(&config_path), &config, false).unwrap();
        assert!(config_path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);

        let written = std::fs::read_to_string(&config_path).unwrap();
        cmd_init_config(Some(&config_path), &config, false).unwrap();
        assert_eq!(std::fs::read_to_string(&config_path).unwrap(), written);
    }

    #[tokio::test]
    async fn test_open_plugin_uses_database_override() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("data").join("chat.db");

        let plugin = open_plugin(Some(&db_path), AppConfig::default()).unwrap();
        assert!(db_path.exists());
        assert!(plugin
            .store()
            .get(&RecordFilter::all())
            .await
            .unwrap()
            .is_empty());
    }
}
