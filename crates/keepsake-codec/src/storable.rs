use crate::document::Document;
use crate::error::CodecResult;
use crate::reader::DocumentReader;

/// Bidirectional conversion between a typed object and a [`Document`].
///
/// Implementors write their fields into a document pre-tagged with
/// [`Storable::TYPE_NAME`] and read them back through a [`DocumentReader`],
/// which also restores nested objects. Types that share base fields embed
/// the base as a value and call its own export/import helpers explicitly.
///
/// When a type is renamed, keep the new name in `TYPE_NAME` and register the
/// old one with [`crate::LegacyResolver::register_refactor`]. When a field is
/// renamed, read it with the old key listed as a legacy key.
pub trait Storable: Sized + Send + 'static {
    /// Current discriminator written into new documents.
    const TYPE_NAME: &'static str;

    /// Write this object's fields into `doc`.
    fn write_fields(&self, doc: Document) -> Document;

    /// Rebuild an object from a document.
    fn read_fields(reader: &DocumentReader<'_>) -> CodecResult<Self>;

    /// Encode into a fresh document tagged with [`Storable::TYPE_NAME`].
    fn to_document(&self) -> Document {
        self.write_fields(Document::for_type::<Self>())
    }
}
