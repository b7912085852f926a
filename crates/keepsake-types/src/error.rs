use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("record id must not be empty")]
    EmptyId,

    #[error("invalid timestamp {text:?}: {reason}")]
    InvalidTimestamp { text: String, reason: String },

    #[error("timestamp out of range: {0} ms")]
    TimestampOutOfRange(i64),
}
