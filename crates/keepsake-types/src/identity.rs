use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Primary key of a persisted record.
///
/// A `RecordId` is any non-empty string. Records created without an explicit
/// id receive a random UUID (v4) rendered in its hyphenated form. Writing a
/// second record under the same id replaces the first.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(String);

impl RecordId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Wrap an application-chosen id.
    pub fn parse(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        if id.is_empty() {
            return Err(TypeError::EmptyId);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short identifier (first 8 characters) for log lines.
    pub fn short_id(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<String> for RecordId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<&str> for RecordId {
    type Error = TypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let id1 = RecordId::new();
        let id2 = RecordId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn generated_id_is_uuid() {
        let id = RecordId::new();
        assert!(uuid::Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn empty_id_rejected() {
        assert_eq!(RecordId::parse(""), Err(TypeError::EmptyId));
    }

    #[test]
    fn explicit_id_preserved() {
        let id = RecordId::parse("user-42").unwrap();
        assert_eq!(id.as_str(), "user-42");
        assert_eq!(format!("{id}"), "user-42");
    }

    #[test]
    fn short_id_handles_short_and_multibyte() {
        assert_eq!(RecordId::parse("abc").unwrap().short_id(), "abc");
        assert_eq!(RecordId::parse("ééééééééé").unwrap().short_id(), "éééééééé");
    }

    #[test]
    fn serde_is_plain_string() {
        let id = RecordId::parse("x").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"x\"");
        let parsed: RecordId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
        assert!(serde_json::from_str::<RecordId>("\"\"").is_err());
    }
}
