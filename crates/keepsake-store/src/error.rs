use keepsake_codec::CodecError;
use keepsake_types::TypeError;

/// Errors from record store operations.
///
/// These surface from constructors and from [`crate::StorageBackend`]
/// implementations. The public [`crate::PersistenceEngine`] operations log
/// them and report failure through their return values instead.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The SQLite engine rejected a statement.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A payload could not be encoded or a row could not be restored.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// A row holds an invalid id or timestamp.
    #[error("invalid row value: {0}")]
    Type(#[from] TypeError),

    /// A thread panicked while holding the engine lock.
    #[error("engine lock poisoned")]
    LockPoisoned,

    /// The configuration cannot be used.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configuration text is not valid TOML for [`crate::StoreConfig`].
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
