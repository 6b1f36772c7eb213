//! Chat Log Excelizer - record chat messages and export them to Excel.
//!
//! The plugin listens to every inbound message of a chat-bot host, stores
//! it in a `SQLite` table, and on command writes the accumulated records to
//! an `.xlsx` spreadsheet, optionally sending the file back to the group
//! and clearing the exported rows.
//!
//! Hosts integrate through the ports in [`domain::ports`]:
//! [`RecordStore`](domain::RecordStore), [`MessageListener`](domain::MessageListener)
//! and [`Session`](domain::Session).

pub mod application;
pub mod domain;
pub mod infrastructure;
