//! Ports to the host framework.
//!
//! The plugin only talks to the host through these traits, so any storage
//! backend or chat platform can drive it.

use std::path::Path;

use async_trait::async_trait;

use super::error::Result;
use super::models::{ChatRecord, MessageEvent, NewChatRecord, RecordFilter};

/// Append-only table of chat records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a record and return it with its assigned id.
    async fn create(&self, record: NewChatRecord) -> Result<ChatRecord>;

    /// Records matching `filter`, in ascending id order.
    async fn get(&self, filter: &RecordFilter) -> Result<Vec<ChatRecord>>;

    /// Delete records matching `filter`, returning how many were removed.
    async fn remove(&self, filter: &RecordFilter) -> Result<usize>;
}

/// Receives every inbound message the host observes.
#[async_trait]
pub trait MessageListener: Send + Sync {
    async fn on_message(&self, event: MessageEvent) -> Result<()>;
}

/// The chat context a command was invoked from.
#[async_trait]
pub trait Session: Send + Sync {
    /// Group/channel of the invocation; `None` for direct messages.
    fn scope_id(&self) -> Option<&str>;

    /// Push a file reference back to the invoking scope.
    async fn send_file(&self, path: &Path) -> Result<()>;
}
