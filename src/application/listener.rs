//! Message ingestion.
//!
//! Every inbound message becomes exactly one stored record.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};

use crate::domain::{
    resolve_scope, AppError, MessageEvent, MessageListener, NewChatRecord, RecordStore, Result,
};

use super::plugin::ChatLogPlugin;

/// Stored format of capture times.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render an epoch-millisecond timestamp in a fixed timezone.
///
/// # Errors
/// Returns error if the timestamp is outside the representable range.
pub fn format_capture_time(timestamp_ms: i64, offset: FixedOffset) -> Result<String> {
    let instant =
        DateTime::from_timestamp_millis(timestamp_ms).ok_or_else(|| AppError::InvalidData {
            message: format!("Timestamp out of range: {timestamp_ms}"),
        })?;

    Ok(instant.with_timezone(&offset).format(TIME_FORMAT).to_string())
}

/// Normalize a message event into an insertable record.
///
/// # Errors
/// Returns error if the timestamp cannot be rendered.
pub fn normalize_event(event: MessageEvent, offset: FixedOffset) -> Result<NewChatRecord> {
    Ok(NewChatRecord {
        time: format_capture_time(event.timestamp, offset)?,
        scope_id: resolve_scope(event.scope_id.as_deref()),
        user_id: event.user_id,
        username: event.username,
        content: event.content,
    })
}

#[async_trait]
impl<S: RecordStore> MessageListener for ChatLogPlugin<S> {
    async fn on_message(&self, event: MessageEvent) -> Result<()> {
        let record = normalize_event(event, self.offset)?;
        let stored = self.store.create(record).await?;

        tracing::debug!(id = stored.id, scope = %stored.scope_id, user = %stored.user_id, "Recorded message");
        Ok(())
    }
}
