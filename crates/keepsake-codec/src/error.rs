use keepsake_types::TypeError;

/// Errors from encoding, decoding and reconstructing documents.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// A required field is absent under its key and every legacy key.
    #[error("{discriminator}: missing field {key:?}")]
    MissingField { discriminator: String, key: String },

    /// A field is present but holds a value of the wrong shape.
    #[error("{discriminator}: field {key:?} is not a valid {expected}")]
    FieldType {
        discriminator: String,
        key: String,
        expected: &'static str,
    },

    /// Document text has no type discriminator.
    #[error("document has no {0:?} discriminator")]
    MissingDiscriminator(&'static str),

    /// No factory is registered for the (resolved) discriminator.
    #[error("unknown discriminator {0:?}")]
    UnknownDiscriminator(String),

    /// The rename table loops back on itself.
    #[error("refactor cycle while resolving {start:?}: {}", chain.join(" -> "))]
    RefactorCycle { start: String, chain: Vec<String> },

    /// The factory produced a different type than the caller asked for.
    #[error("expected {expected}, document restored as {found:?}")]
    UnexpectedType { expected: &'static str, found: String },

    /// A second Rust type tried to claim an already registered name.
    #[error("type name {name:?} already registered to {existing}")]
    DuplicateType { name: String, existing: &'static str },

    /// JSON cannot represent NaN or infinities.
    #[error("field {key:?} holds a non-finite float")]
    NonFiniteFloat { key: String },

    /// Document text is valid JSON but not a document.
    #[error("malformed document: {0}")]
    Malformed(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Type(#[from] TypeError),
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
