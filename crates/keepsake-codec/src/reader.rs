use std::ops::Deref;

use tracing::{debug, warn};

use crate::codec::Codec;
use crate::document::Document;
use crate::error::{CodecError, CodecResult};
use crate::storable::Storable;
use crate::value::Value;

/// A document scoped together with the codec that is restoring it.
///
/// Factories receive a reader rather than a bare [`Document`] so nested
/// objects restore through the same legacy resolver and type registry as
/// their parent. Scalar getters are reachable through `Deref`.
#[derive(Clone, Copy)]
pub struct DocumentReader<'a> {
    document: &'a Document,
    codec: &'a Codec,
}

impl<'a> DocumentReader<'a> {
    pub fn new(document: &'a Document, codec: &'a Codec) -> Self {
        Self { document, codec }
    }

    pub fn document(&self) -> &'a Document {
        self.document
    }

    pub fn codec(&self) -> &'a Codec {
        self.codec
    }

    /// Restore a required nested object. Any failure is an error.
    pub fn get_nested_object<T: Storable>(&self, key: &str, legacy: &[&str]) -> CodecResult<T> {
        let nested = self.find(key, legacy, Value::as_document, "document")?;
        self.codec.restore(nested)
    }

    /// Restore an optional nested object.
    ///
    /// Absent or null fields are `None`. So is a nested document that fails
    /// to restore: optional data never fails its parent.
    pub fn get_optional_nested_object<T: Storable>(&self, key: &str, legacy: &[&str]) -> Option<T> {
        match self.document.lookup(key, legacy) {
            None | Some((_, Value::Null)) => return None,
            Some(_) => {}
        }
        match self
            .find(key, legacy, Value::as_document, "document")
            .and_then(|nested| self.codec.restore(nested))
        {
            Ok(v) => Some(v),
            Err(e) => {
                debug!(parent = self.document.discriminator(), key, error = %e, "optional nested object dropped");
                None
            }
        }
    }

    /// Restore a required array of nested objects.
    ///
    /// A missing or non-list field is an error. Elements that are not
    /// documents or fail to restore are skipped; the rest are returned in
    /// order.
    pub fn get_nested_array<T: Storable>(&self, key: &str, legacy: &[&str]) -> CodecResult<Vec<T>> {
        let items = self.find(key, legacy, Value::as_list, "list")?;
        Ok(self.restore_elements(key, items))
    }

    /// Like [`DocumentReader::get_nested_array`], with absent, null or
    /// non-list fields yielding `None`.
    pub fn get_optional_nested_array<T: Storable>(&self, key: &str, legacy: &[&str]) -> Option<Vec<T>> {
        let items = self.find(key, legacy, Value::as_list, "list").ok()?;
        Some(self.restore_elements(key, items))
    }

    fn restore_elements<T: Storable>(&self, key: &str, items: &[Value]) -> Vec<T> {
        let mut restored = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let result = match item.as_document() {
                Some(doc) => self.codec.restore(doc),
                None => Err(CodecError::FieldType {
                    discriminator: self.document.discriminator().to_string(),
                    key: format!("{key}[{index}]"),
                    expected: "document",
                }),
            };
            match result {
                Ok(v) => restored.push(v),
                Err(e) => warn!(
                    parent = self.document.discriminator(),
                    key,
                    index,
                    error = %e,
                    "skipping unreadable array element"
                ),
            }
        }
        restored
    }

    /// First value under `key` or `legacy` that `project` accepts.
    fn find<T: ?Sized>(
        &self,
        key: &str,
        legacy: &[&str],
        project: fn(&Value) -> Option<&T>,
        expected: &'static str,
    ) -> CodecResult<&'a T> {
        let doc: &'a Document = self.document;
        let mut present = false;
        for k in std::iter::once(key).chain(legacy.iter().copied()) {
            if let Some(value) = doc.raw(k) {
                present = true;
                if let Some(projected) = project(value) {
                    return Ok(projected);
                }
            }
        }
        if present {
            Err(CodecError::FieldType {
                discriminator: doc.discriminator().to_string(),
                key: key.to_string(),
                expected,
            })
        } else {
            Err(CodecError::MissingField {
                discriminator: doc.discriminator().to_string(),
                key: key.to_string(),
            })
        }
    }
}

impl Deref for DocumentReader<'_> {
    type Target = Document;

    fn deref(&self) -> &Document {
        self.document
    }
}

impl std::fmt::Debug for DocumentReader<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentReader")
            .field("discriminator", &self.document.discriminator())
            .finish()
    }
}
