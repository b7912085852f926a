use keepsake_codec::{Codec, Document, Storable};
use keepsake_types::{RecordId, Timestamp};

use crate::error::StoreResult;
use crate::record::Record;

/// One persisted record, flattened to the four stored columns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredRow {
    /// Primary key.
    pub id: String,
    /// Type name recorded when the row was written.
    pub discriminator: String,
    /// Creation time in [`keepsake_types::TIMESTAMP_FORMAT`].
    pub created_at: String,
    /// Full document text.
    pub data: String,
}

impl StoredRow {
    /// Flatten a record through `codec`.
    pub fn encode<T: Storable>(record: &Record<T>, codec: &Codec) -> StoreResult<Self> {
        let document = codec.encode(record.payload());
        Ok(Self {
            id: record.id().as_str().to_string(),
            discriminator: document.discriminator().to_string(),
            created_at: record.created_at().to_text(),
            data: document.to_text()?,
        })
    }

    /// Restore the record this row was written from.
    pub fn decode<T: Storable>(&self, codec: &Codec) -> StoreResult<Record<T>> {
        let document = Document::from_text(&self.data)?;
        let payload = codec.restore(&document)?;
        Ok(Record::from_parts(
            RecordId::parse(self.id.as_str())?,
            payload,
            Timestamp::parse(&self.created_at)?,
        ))
    }
}
