use std::any::Any;
use std::sync::Arc;

use crate::document::Document;
use crate::error::{CodecError, CodecResult};
use crate::legacy::LegacyResolver;
use crate::reader::DocumentReader;
use crate::registry::TypeRegistry;
use crate::storable::Storable;

/// Converts typed objects to documents and back.
///
/// A codec is a cheap handle over a shared [`LegacyResolver`] and
/// [`TypeRegistry`]; clones see the same registrations.
#[derive(Clone, Debug, Default)]
pub struct Codec {
    legacy: Arc<LegacyResolver>,
    registry: Arc<TypeRegistry>,
}

impl Codec {
    pub fn new(legacy: Arc<LegacyResolver>, registry: Arc<TypeRegistry>) -> Self {
        Self { legacy, registry }
    }

    pub fn legacy(&self) -> &LegacyResolver {
        &self.legacy
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Shorthand for `self.registry().register::<T>()`.
    pub fn register<T: Storable>(&self) -> CodecResult<()> {
        self.registry.register::<T>()
    }

    /// Encode `value` into a document tagged with its current type name.
    pub fn encode<T: Storable>(&self, value: &T) -> Document {
        value.to_document()
    }

    /// Restore a typed object from `document`.
    ///
    /// The discriminator is resolved through the rename chain to pick the
    /// factory, but the factory reads the document exactly as written.
    pub fn restore<T: Storable>(&self, document: &Document) -> CodecResult<T> {
        let (resolved, boxed) = self.restore_any(document)?;
        boxed
            .downcast::<T>()
            .map(|v| *v)
            .map_err(|_| CodecError::UnexpectedType {
                expected: T::TYPE_NAME,
                found: resolved,
            })
    }

    /// Restore without naming the target type. Returns the resolved type
    /// name with the type-erased object.
    pub fn restore_any(&self, document: &Document) -> CodecResult<(String, Box<dyn Any + Send>)> {
        let resolved = self.legacy.resolve(document.discriminator())?;
        let factory = self
            .registry
            .factory(&resolved)
            .ok_or_else(|| CodecError::UnknownDiscriminator(resolved.clone()))?;
        let object = factory(&DocumentReader::new(document, self))?;
        Ok((resolved, object))
    }

    /// Encode straight to document text.
    pub fn to_text<T: Storable>(&self, value: &T) -> CodecResult<String> {
        self.encode(value).to_text()
    }

    /// Parse document text and restore it as `T`.
    pub fn from_text<T: Storable>(&self, text: &str) -> CodecResult<T> {
        self.restore(&Document::from_text(text)?)
    }

    /// Every discriminator whose documents count as `T`: its current name
    /// and its one-level historical names.
    pub fn discriminator_set<T: Storable>(&self) -> Vec<String> {
        self.legacy.discriminator_set(T::TYPE_NAME)
    }
}
