//! `SQLite` record store for captured chat messages.
//!
//! One append-only table; ids come from `AUTOINCREMENT` so they are never
//! reused after a clear. Statements run on tokio's blocking pool.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, params_from_iter, Connection};

use crate::domain::{AppError, ChatRecord, NewChatRecord, RecordFilter, RecordStore, Result};

/// Table holding one row per observed message.
pub const TABLE: &str = "chat_log_excelizer_table";

/// Record store backed by a single `SQLite` connection.
pub struct SqliteRecordStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRecordStore {
    /// Opens or creates the store database.
    ///
    /// # Errors
    /// Returns error if database cannot be opened or schema creation fails.
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::io("Failed to create storage directory", e))?;
        }

        let conn = Connection::open(path).map_err(AppError::database)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(AppError::database)?;

        tracing::debug!(path = %path.display(), "Opened chat log store");
        Self::with_connection(conn)
    }

    /// Opens a private in-memory store.
    ///
    /// # Errors
    /// Returns error if schema creation fails.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(AppError::database)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Initialize database schema.
    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(&format!(
            r"
            CREATE TABLE IF NOT EXISTS {TABLE} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                scope_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                username TEXT NOT NULL,
                time TEXT NOT NULL,
                content TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_chat_log_scope
                ON {TABLE}(scope_id);
            "
        ))
        .map_err(AppError::database)
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|_| AppError::Database {
                message: "Connection lock poisoned".into(),
                source: None,
            })?;
            f(&conn)
        })
        .await
        .map_err(|e| AppError::Database {
            message: format!("Store task failed: {e}"),
            source: Some(Box::new(e)),
        })?
    }

    /// Convert a row to a `ChatRecord`.
    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<ChatRecord> {
        let id: i64 = row.get(0)?;

        Ok(ChatRecord {
            id: u64::try_from(id).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(0, id))?,
            scope_id: row.get(1)?,
            user_id: row.get(2)?,
            username: row.get(3)?,
            time: row.get(4)?,
            content: row.get(5)?,
        })
    }
}

/// Convert a `SQLite` rowid to a record id.
fn record_id(rowid: i64) -> Result<u64> {
    u64::try_from(rowid).map_err(|_| AppError::InvalidData {
        message: format!("Negative record id: {rowid}"),
    })
}

/// Build a `WHERE` clause and its bound values for an equality filter.
fn where_clause(filter: &RecordFilter) -> (String, Vec<&str>) {
    let mut clauses = Vec::new();
    let mut values = Vec::new();

    if let Some(scope) = &filter.scope_id {
        clauses.push("scope_id = ?");
        values.push(scope.as_str());
    }
    if let Some(user) = &filter.user_id {
        clauses.push("user_id = ?");
        values.push(user.as_str());
    }

    if clauses.is_empty() {
        (String::new(), values)
    } else {
        (format!(" WHERE {}", clauses.join(" AND ")), values)
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn create(&self, record: NewChatRecord) -> Result<ChatRecord> {
        self.with_conn(move |conn| {
            conn.execute(
                &format!(
                    "INSERT INTO {TABLE} (scope_id, user_id, username, time, content)
                     VALUES (?1, ?2, ?3, ?4, ?5)"
                ),
                params![
                    &record.scope_id,
                    &record.user_id,
                    &record.username,
                    &record.time,
                    &record.content,
                ],
            )
            .map_err(AppError::database)?;

            let id = record_id(conn.last_insert_rowid())?;
            Ok(record.with_id(id))
        })
        .await
    }

    async fn get(&self, filter: &RecordFilter) -> Result<Vec<ChatRecord>> {
        let filter = filter.clone();

        self.with_conn(move |conn| {
            let (clause, values) = where_clause(&filter);

            let mut stmt = conn
                .prepare(&format!(
                    "SELECT id, scope_id, user_id, username, time, content
                     FROM {TABLE}{clause} ORDER BY id ASC"
                ))
                .map_err(AppError::database)?;

            let records = stmt
                .query_map(params_from_iter(values), Self::row_to_record)
                .map_err(AppError::database)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(AppError::database)?;

            tracing::debug!(count = records.len(), ?filter, "Fetched chat records");
            Ok(records)
        })
        .await
    }

    async fn remove(&self, filter: &RecordFilter) -> Result<usize> {
        let filter = filter.clone();

        self.with_conn(move |conn| {
            let (clause, values) = where_clause(&filter);

            conn.execute(&format!("DELETE FROM {TABLE}{clause}"), params_from_iter(values))
                .map_err(AppError::database)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn new_record(scope: &str, user: &str, content: &str) -> NewChatRecord {
        NewChatRecord {
            scope_id: scope.into(),
            user_id: user.into(),
            username: format!("{user}-name"),
            time: "2024-01-05 08:03:09".into(),
            content: content.into(),
        }
    }

    #[test]
    fn test_where_clause() {
        assert_eq!(where_clause(&RecordFilter::all()), (String::new(), vec![]));

        let filter = RecordFilter {
            scope_id: Some("g1".into()),
            user_id: Some("u1".into()),
        };
        let (clause, values) = where_clause(&filter);
        assert_eq!(clause, " WHERE scope_id = ? AND user_id = ?");
        assert_eq!(values, vec!["g1", "u1"]);
    }

    #[test]
    fn test_record_id_rejects_negative_rowid() {
        assert_eq!(record_id(42).unwrap(), 42);
        assert!(matches!(
            record_id(-1).unwrap_err(),
            AppError::InvalidData { .. }
        ));
    }

    #[test]
    fn test_open_creates_schema() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("test.db");

        let store = SqliteRecordStore::open(&db_path).unwrap();
        assert!(db_path.exists());

        let conn = store.conn.lock().unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                [TABLE],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_create_get_remove() {
        let store = SqliteRecordStore::open_in_memory().unwrap();

        let first = store.create(new_record("g1", "u1", "a")).await.unwrap();
        let second = store.create(new_record("g2", "u1", "b")).await.unwrap();
        store.create(new_record("g1", "u2", "c")).await.unwrap();
        assert!(second.id > first.id);

        let g1 = store.get(&RecordFilter::scope("g1")).await.unwrap();
        let contents: Vec<_> = g1.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, vec!["a", "c"]);

        let by_user = RecordFilter {
            user_id: Some("u1".into()),
            ..RecordFilter::default()
        };
        assert_eq!(store.get(&by_user).await.unwrap().len(), 2);

        assert_eq!(store.remove(&RecordFilter::scope("g1")).await.unwrap(), 2);
        let rest = store.get(&RecordFilter::all()).await.unwrap();
        assert_eq!(rest, vec![second]);

        assert_eq!(store.remove(&RecordFilter::all()).await.unwrap(), 1);
        assert!(store.get(&RecordFilter::all()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_clear() {
        let store = SqliteRecordStore::open_in_memory().unwrap();

        let a = store.create(new_record("g1", "u1", "a")).await.unwrap();
        store.remove(&RecordFilter::all()).await.unwrap();
        let b = store.create(new_record("g1", "u1", "b")).await.unwrap();

        assert!(b.id > a.id);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_creates_on_worker_threads() {
        let store = std::sync::Arc::new(SqliteRecordStore::open_in_memory().unwrap());

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let store = std::sync::Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .create(new_record("g1", "u1", &format!("m{i}")))
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut ids = Vec::new();
        for task in tasks {
            ids.push(task.await.unwrap().id);
        }
        ids.sort_unstable();
        ids.dedup();

        assert_eq!(ids.len(), 8);
        assert_eq!(store.get(&RecordFilter::all()).await.unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_records_persist_across_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("store.db");

        {
            let store = SqliteRecordStore::open(&db_path).unwrap();
            store.create(new_record("g1", "u1", "kept")).await.unwrap();
        }

        let store = SqliteRecordStore::open(&db_path).unwrap();
        let records = store.get(&RecordFilter::all()).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content, "kept");
    }
}
