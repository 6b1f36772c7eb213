//! Domain models for captured chat messages.
//!
//! These models represent the rows of the chat log table and the events
//! the host delivers for every inbound message.

use serde::{Deserialize, Serialize};

/// Scope stored for messages that arrive without a group/channel.
pub const SCOPE_SENTINEL: &str = "N/A";

/// Maps an optional scope id to its stored form.
///
/// Absent and empty scopes both become [`SCOPE_SENTINEL`].
#[must_use]
pub fn resolve_scope(scope_id: Option<&str>) -> String {
    match scope_id {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => SCOPE_SENTINEL.to_string(),
    }
}

/// One stored chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRecord {
    /// Store-assigned identifier, never reused.
    pub id: u64,
    /// Group/channel the message belongs to, or [`SCOPE_SENTINEL`].
    pub scope_id: String,
    /// Author identifier within the host.
    pub user_id: String,
    /// Author display name at capture time.
    pub username: String,
    /// Capture time, already rendered as `YYYY-MM-DD HH:mm:ss`.
    pub time: String,
    /// Message body.
    pub content: String,
}

/// A chat record that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChatRecord {
    pub scope_id: String,
    pub user_id: String,
    pub username: String,
    pub time: String,
    pub content: String,
}

impl NewChatRecord {
    /// Attach a store-assigned id.
    #[must_use]
    pub fn with_id(self, id: u64) -> ChatRecord {
        ChatRecord {
            id,
            scope_id: self.scope_id,
            user_id: self.user_id,
            username: self.username,
            time: self.time,
            content: self.content,
        }
    }
}

/// Equality filter over chat records. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub scope_id: Option<String>,
    pub user_id: Option<String>,
}

impl RecordFilter {
    /// Filter matching every record.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Filter matching a single scope.
    #[must_use]
    pub fn scope(scope_id: impl Into<String>) -> Self {
        Self {
            scope_id: Some(scope_id.into()),
            ..Self::default()
        }
    }
}

/// Inbound message as delivered by the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    /// Group/channel id; absent for direct messages.
    #[serde(default, alias = "scope_id", alias = "guildId")]
    pub scope_id: Option<String>,
    #[serde(alias = "user_id")]
    pub user_id: String,
    #[serde(default)]
    pub username: String,
    /// Capture instant in milliseconds since the Unix epoch.
    pub timestamp: i64,
    #[serde(default)]
    pub content: String,
}
