use keepsake_types::{RecordId, Timestamp};

/// A payload paired with its identity and creation time.
///
/// Records are the unit of persistence: each one becomes a single row keyed
/// by its id. The creation time is captured when the record is constructed
/// and travels with it unchanged through every later write and read.
#[derive(Clone, Debug, PartialEq)]
pub struct Record<T> {
    id: RecordId,
    payload: T,
    created_at: Timestamp,
}

impl<T> Record<T> {
    /// Wrap `payload` under a fresh random id.
    pub fn new(payload: T) -> Self {
        Self::with_id(RecordId::new(), payload)
    }

    /// Wrap `payload` under an application-chosen id.
    pub fn with_id(id: RecordId, payload: T) -> Self {
        Self {
            id,
            payload,
            created_at: Timestamp::now(),
        }
    }

    /// Reassemble a record read back from storage.
    pub fn from_parts(id: RecordId, payload: T, created_at: Timestamp) -> Self {
        Self {
            id,
            payload,
            created_at,
        }
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Replace the payload, keeping id and creation time.
    pub fn with_payload<U>(self, payload: U) -> Record<U> {
        Record {
            id: self.id,
            payload,
            created_at: self.created_at,
        }
    }

    pub fn into_payload(self) -> T {
        self.payload
    }

    pub fn into_parts(self) -> (RecordId, T, Timestamp) {
        (self.id, self.payload, self.created_at)
    }
}
