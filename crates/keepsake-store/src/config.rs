use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// SQLite journal mode applied when the database is opened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalMode {
    Wal,
    Delete,
    Memory,
}

impl JournalMode {
    pub fn as_pragma(&self) -> &'static str {
        match self {
            Self::Wal => "WAL",
            Self::Delete => "DELETE",
            Self::Memory => "MEMORY",
        }
    }
}

/// Configuration for a [`crate::SqliteStore`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database file. `None` opens a private in-memory database.
    pub path: Option<PathBuf>,
    /// How long SQLite waits on a locked database file before failing.
    pub busy_timeout_ms: u64,
    /// Journal mode for file databases. In-memory databases ignore it.
    pub journal_mode: JournalMode,
    /// Name of the record table.
    pub table: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: 5_000,
            journal_mode: JournalMode::Wal,
            table: "records".into(),
        }
    }
}

impl StoreConfig {
    /// An in-memory database with default settings.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// A file database at `path` with default settings.
    pub fn at(path: impl AsRef<Path>) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
            ..Default::default()
        }
    }

    /// Parse a TOML document. Missing keys take their defaults.
    ///
    /// ```toml
    /// path = "data/app.db"
    /// busy_timeout_ms = 2000
    /// journal_mode = "delete"
    /// table = "objects"
    /// ```
    pub fn from_toml_str(text: &str) -> StoreResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Check that the table name is a plain SQL identifier.
    pub fn validate(&self) -> StoreResult<()> {
        let mut chars = self.table.chars();
        let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(StoreError::InvalidConfig(format!(
                "table name {:?} is not a plain identifier",
                self.table
            )));
        }
        Ok(())
    }
}
