//! Operator commands: export and clear, per scope or for every scope.
//!
//! | Command      | Reads         | Clears afterwards                     |
//! |--------------|---------------|---------------------------------------|
//! | exporterAll  | every record  | never                                 |
//! | exporter     | current scope | current scope, if auto-clear enabled  |
//! | clearAllData | -             | every record                          |
//! | clearData    | -             | current scope                         |
//!
//! Nothing here serializes overlapping commands: two exports of the same
//! scope may read and clear the same rows.

use std::path::Path;

use crate::domain::{
    resolve_scope, AppError, ChatRecord, ExportError, RecordFilter, RecordStore, Result, Session,
};

use super::exporter;
use super::plugin::ChatLogPlugin;

/// Reply sent after a successful clear.
pub const CLEAR_SUCCESS: &str = "Cleared successfully!";

/// Host-visible commands of the plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    ExportAll,
    Export,
    ClearAll,
    Clear,
}

impl Command {
    /// Every command, in help order.
    pub const ALL: [Self; 5] = [
        Self::Help,
        Self::ExportAll,
        Self::Export,
        Self::ClearAll,
        Self::Clear,
    ];

    /// Name the command is registered under.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Help => "chatLogExcelizer",
            Self::ExportAll => "chatLogExcelizer.exporterAll",
            Self::Export => "chatLogExcelizer.exporter",
            Self::ClearAll => "chatLogExcelizer.clearAllData",
            Self::Clear => "chatLogExcelizer.clearData",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Help => "Show help for the chat log commands",
            Self::ExportAll => "Export chat logs of every group (never clears the table)",
            Self::Export => "Export chat logs of the current group",
            Self::ClearAll => "Clear the chat log table for every group",
            Self::Clear => "Clear the chat log table for the current group",
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Command {
    type Err = AppError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::InvalidData {
                message: format!("Unknown command: {s}. Use `{}` for help", Self::Help.name()),
            })
    }
}

/// Usage text listing every command.
#[must_use]
pub fn help_text() -> String {
    let width = Command::ALL
        .iter()
        .map(|c| c.name().len())
        .max()
        .unwrap_or_default();

    let mut out = String::from("Chat Log Excelizer\n\nCommands:\n");
    for command in Command::ALL {
        out.push_str(&format!(
            "  {:<width$}  {}\n",
            command.name(),
            command.description()
        ));
    }
    out
}

/// Reply sent after a successful export.
#[must_use]
pub fn export_success(path: &Path) -> String {
    format!("Export succeeded!\nFile path: {}", path.display())
}

impl<S: RecordStore> ChatLogPlugin<S> {
    /// Run a command from `session`, returning the reply if there is one.
    ///
    /// # Errors
    /// Returns error on store or delivery failure.
    pub async fn dispatch(&self, command: Command, session: &dyn Session) -> Result<Option<String>> {
        tracing::info!(%command, scope = ?session.scope_id(), "Dispatching command");

        match command {
            Command::Help => Ok(Some(help_text())),
            Command::ExportAll => self.export_all(session).await,
            Command::Export => self.export(session).await,
            Command::ClearAll => self.clear_all().await.map(Some),
            Command::Clear => self.clear(session).await.map(Some),
        }
    }

    /// Export every scope. Never clears, whatever the flags say.
    ///
    /// # Errors
    /// Returns error on store or delivery failure.
    pub async fn export_all(&self, session: &dyn Session) -> Result<Option<String>> {
        if self.config.auto_clear_all_data_table_enabled {
            tracing::debug!("Auto-clear-all is set but exporting all scopes never clears");
        }

        let records = self.store.get(&RecordFilter::all()).await?;
        self.export_records(records, session, None).await
    }

    /// Export the invoking scope, clearing it afterwards when auto-clear is on.
    ///
    /// # Errors
    /// Returns error on store or delivery failure.
    pub async fn export(&self, session: &dyn Session) -> Result<Option<String>> {
        let filter = RecordFilter::scope(resolve_scope(session.scope_id()));
        let records = self.store.get(&filter).await?;

        let clear = self.config.auto_clear_data_table_enabled.then_some(filter);
        self.export_records(records, session, clear).await
    }

    /// Remove every record.
    ///
    /// # Errors
    /// Returns error if the store fails.
    pub async fn clear_all(&self) -> Result<String> {
        let removed = self.store.remove(&RecordFilter::all()).await?;
        tracing::info!(removed, "Cleared all chat logs");
        Ok(CLEAR_SUCCESS.to_string())
    }

    /// Remove the invoking scope's records.
    ///
    /// # Errors
    /// Returns error if the store fails.
    pub async fn clear(&self, session: &dyn Session) -> Result<String> {
        let scope = resolve_scope(session.scope_id());
        let removed = self.store.remove(&RecordFilter::scope(&scope)).await?;
        tracing::info!(removed, %scope, "Cleared chat logs");
        Ok(CLEAR_SUCCESS.to_string())
    }

    /// Write `records`, then deliver and clear as configured.
    ///
    /// A failed write is logged and yields no reply.
    async fn export_records(
        &self,
        records: Vec<ChatRecord>,
        session: &dyn Session,
        clear: Option<RecordFilter>,
    ) -> Result<Option<String>> {
        let count = records.len();
        let directory = self.config.save_directory().map(Path::to_path_buf);

        let outcome = tokio::task::spawn_blocking(move || {
            exporter::export(&records, directory.as_deref())
        })
        .await
        .unwrap_or_else(|e| Err(ExportError::Task(e.to_string())));

        let path = match outcome {
            Ok(path) => path,
            Err(e) => {
                tracing::error!(error = %e, "Failed to export chat logs");
                return Ok(None);
            }
        };

        tracing::info!(path = %path.display(), records = count, "Exported chat logs");

        if self.config.send_file_to_group_enabled {
            session.send_file(&path).await?;
        }

        if let Some(filter) = clear {
            let removed = self.store.remove(&filter).await?;
            tracing::info!(removed, scope = ?filter.scope_id, "Cleared exported chat logs");
        }

        Ok(Some(export_success(&path)))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use calamine::{open_workbook, Data, Reader, Xlsx};
    use tempfile::{tempdir, TempDir};

    use super::*;
    use crate::domain::{MessageEvent, MessageListener, PluginConfig};
    use crate::infrastructure::SqliteRecordStore;

    /// Session that remembers delivered files.
    struct RecordingSession {
        scope: Option<String>,
        sent: Mutex<Vec<PathBuf>>,
    }

    impl RecordingSession {
        fn new(scope: Option<&str>) -> Self {
            Self {
                scope: scope.map(str::to_string),
                sent: Mutex::new(Vec::new()),
            }
        }

        fn sent(&self) -> Vec<PathBuf> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Session for RecordingSession {
        fn scope_id(&self) -> Option<&str> {
            self.scope.as_deref()
        }

        async fn send_file(&self, path: &Path) -> Result<()> {
            self.sent.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }
    }

    fn config(dir: &TempDir) -> PluginConfig {
        PluginConfig {
            save_directory: dir.path().to_path_buf(),
            ..PluginConfig::default()
        }
    }

    async fn seeded(config: PluginConfig) -> ChatLogPlugin<SqliteRecordStore> {
        let store = Arc::new(SqliteRecordStore::open_in_memory().unwrap());
        let plugin = ChatLogPlugin::new(store, config).unwrap();

        for (scope, content) in [
            (Some("g1"), "one"),
            (Some("g2"), "two"),
            (Some("g1"), "three"),
            (None, "direct"),
        ] {
            plugin
                .on_message(MessageEvent {
                    scope_id: scope.map(str::to_string),
                    user_id: "u1".into(),
                    username: "alice".into(),
                    timestamp: 1_704_412_989_000,
                    content: content.into(),
                })
                .await
                .unwrap();
        }

        plugin
    }

    async fn scopes(plugin: &ChatLogPlugin<SqliteRecordStore>) -> Vec<String> {
        plugin
            .store()
            .get(&RecordFilter::all())
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.scope_id)
            .collect()
    }

    #[test]
    fn test_command_names_round_trip() {
        for command in Command::ALL {
            assert_eq!(command.name().parse::<Command>().unwrap(), command);
        }
        assert!("chatLogExcelizer.unknown".parse::<Command>().is_err());
    }

    #[test]
    fn test_help_lists_every_command() {
        let help = help_text();
        for command in Command::ALL {
            assert!(help.contains(command.name()));
            assert!(help.contains(command.description()));
        }
    }

    #[tokio::test]
    async fn test_export_clears_only_current_scope() {
        let dir = tempdir().unwrap();
        let plugin = seeded(config(&dir)).await;
        let session = RecordingSession::new(Some("g1"));

        let reply = plugin.export(&session).await.unwrap().unwrap();

        let sent = session.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].exists());
        assert!(sent[0].starts_with(dir.path()));
        assert!(reply.starts_with("Export succeeded!"));
        assert!(reply.contains(&sent[0].display().to_string()));
        assert_eq!(scopes(&plugin).await, vec!["g2", "N/A"]);

        let mut workbook: Xlsx<_> = open_workbook(&sent[0]).unwrap();
        let range = workbook.worksheet_range(exporter::SHEET_NAME).unwrap();
        let rows: Vec<Vec<Data>> = range.rows().map(<[Data]>::to_vec).collect();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][1], Data::String("scopeId".into()));
        assert_eq!(rows[1][0], Data::Float(1.0));
        assert_eq!(rows[2][0], Data::Float(3.0));
        for (row, content) in rows[1..].iter().zip(["one", "three"]) {
            assert_eq!(row[1], Data::String("g1".into()));
            assert_eq!(row[4], Data::String(content.into()));
        }
    }

    #[tokio::test]
    async fn test_export_keeps_records_without_auto_clear() {
        let dir = tempdir().unwrap();
        let plugin = seeded(PluginConfig {
            auto_clear_data_table_enabled: false,
            send_file_to_group_enabled: false,
            ..config(&dir)
        })
        .await;
        let session = RecordingSession::new(Some("g1"));

        assert!(plugin.export(&session).await.unwrap().is_some());
        assert!(session.sent().is_empty());
        assert_eq!(scopes(&plugin).await.len(), 4);
    }

    #[tokio::test]
    async fn test_export_from_direct_session_uses_sentinel_scope() {
        let dir = tempdir().unwrap();
        let plugin = seeded(config(&dir)).await;

        assert!(plugin
            .export(&RecordingSession::new(None))
            .await
            .unwrap()
            .is_some());
        assert_eq!(scopes(&plugin).await, vec!["g1", "g2", "g1"]);
    }

    #[tokio::test]
    async fn test_export_of_empty_scope_succeeds() {
        let dir = tempdir().unwrap();
        let plugin = seeded(config(&dir)).await;
        let session = RecordingSession::new(Some("nobody-here"));

        assert!(plugin.export(&session).await.unwrap().is_some());
        assert_eq!(session.sent().len(), 1);
        assert_eq!(scopes(&plugin).await.len(), 4);
    }

    #[tokio::test]
    async fn test_export_all_never_clears() {
        let dir = tempdir().unwrap();
        let plugin = seeded(PluginConfig {
            auto_clear_data_table_enabled: true,
            auto_clear_all_data_table_enabled: true,
            ..config(&dir)
        })
        .await;
        let session = RecordingSession::new(Some("g1"));

        let reply = plugin.export_all(&session).await.unwrap();

        assert!(reply.is_some());
        assert_eq!(session.sent().len(), 1);
        assert_eq!(scopes(&plugin).await.len(), 4);
    }

    #[tokio::test]
    async fn test_failed_export_is_silent_and_keeps_records() {
        let dir = tempdir().unwrap();
        let plugin = seeded(PluginConfig {
            save_directory: dir.path().join("does-not-exist"),
            ..PluginConfig::default()
        })
        .await;
        let session = RecordingSession::new(Some("g1"));

        let reply = plugin.export(&session).await.unwrap();

        assert!(reply.is_none());
        assert!(session.sent().is_empty());
        assert_eq!(scopes(&plugin).await.len(), 4);
    }

    #[tokio::test]
    async fn test_clear_and_clear_all() {
        let dir = tempdir().unwrap();
        let plugin = seeded(config(&dir)).await;

        let reply = plugin.clear(&RecordingSession::new(Some("g2"))).await.unwrap();
        assert_eq!(reply, CLEAR_SUCCESS);
        assert_eq!(scopes(&plugin).await, vec!["g1", "g1", "N/A"]);

        assert_eq!(plugin.clear_all().await.unwrap(), CLEAR_SUCCESS);
        assert!(scopes(&plugin).await.is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_routes_by_name() {
        let dir = tempdir().unwrap();
        let plugin = seeded(config(&dir)).await;
        let session = RecordingSession::new(Some("g1"));

        let help = plugin
            .dispatch("chatLogExcelizer".parse().unwrap(), &session)
            .await
            .unwrap();
        assert_eq!(help, Some(help_text()));

        let cleared = plugin
            .dispatch("chatLogExcelizer.clearData".parse().unwrap(), &session)
            .await
            .unwrap();
        assert_eq!(cleared.as_deref(), Some(CLEAR_SUCCESS));
        assert_eq!(scopes(&plugin).await, vec!["g2", "N/A"]);
    }
}
