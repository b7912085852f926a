use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("write failed for record {0}")]
    WriteFailed(String),

    #[error("a transaction is already open")]
    TransactionBusy,

    #[error("transaction could not be committed")]
    CommitFailed,

    #[error("transaction rollback failed after: {0}")]
    RollbackFailed(Box<SdkError>),

    #[error("store error: {0}")]
    Store(#[from] keepsake_store::StoreError),

    #[error("codec error: {0}")]
    Codec(#[from] keepsake_codec::CodecError),
}

pub type SdkResult<T> = Result<T, SdkError>;
