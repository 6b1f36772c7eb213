//! Terminal-backed session for the command-line host.

use std::path::Path;

use async_trait::async_trait;
use colored::Colorize;

use crate::domain::{Result, Session};

/// Session whose "group" is the terminal; delivered files are printed.
#[derive(Debug, Clone, Default)]
pub struct ConsoleSession {
    scope_id: Option<String>,
}

impl ConsoleSession {
    #[must_use]
    pub const fn new(scope_id: Option<String>) -> Self {
        Self { scope_id }
    }
}

#[async_trait]
impl Session for ConsoleSession {
    fn scope_id(&self) -> Option<&str> {
        self.scope_id.as_deref()
    }

    async fn send_file(&self, path: &Path) -> Result<()> {
        println!("{} {}", "📎".bold(), path.display().to_string().cyan());
        Ok(())
    }
}
