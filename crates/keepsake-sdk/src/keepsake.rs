use keepsake_codec::{Codec, Storable};
use keepsake_store::{Record, SqliteStore};
use keepsake_types::RecordId;
use tracing::{debug, error};

use crate::builder::KeepsakeBuilder;
use crate::error::{SdkError, SdkResult};

/// High-level keepsake API over a SQLite store.
#[derive(Debug)]
pub struct Keepsake {
    store: SqliteStore,
}

impl Keepsake {
    pub fn builder() -> KeepsakeBuilder {
        KeepsakeBuilder::new()
    }

    pub(crate) fn from_store(store: SqliteStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    pub fn codec(&self) -> &Codec {
        self.store.codec()
    }

    // ---- Records ----

    /// Store `payload` under a fresh id and return the record written.
    pub fn save<T: Storable>(&self, payload: T) -> SdkResult<Record<T>> {
        let record = Record::new(payload);
        self.save_record(&record)?;
        Ok(record)
    }

    pub fn save_record<T: Storable>(&self, record: &Record<T>) -> SdkResult<()> {
        if self.store.write(record) {
            Ok(())
        } else {
            Err(SdkError::WriteFailed(record.id().to_string()))
        }
    }

    pub fn load<T: Storable>(&self, id: &RecordId) -> SdkResult<Record<T>> {
        self.store
            .read(id)
            .ok_or_else(|| SdkError::NotFound(id.to_string()))
    }

    pub fn all<T: Storable>(&self) -> Vec<Record<T>> {
        self.store.read_all()
    }

    // ---- Transactions ----

    /// Run `f` inside a transaction: commit on `Ok`, roll back on `Err`.
    ///
    /// Fails with [`SdkError::TransactionBusy`] if a transaction is already
    /// open; the open one is left alone. If `f` fails and the rollback fails
    /// too, the error is wrapped in [`SdkError::RollbackFailed`].
    pub fn transaction<R>(&self, f: impl FnOnce(&Self) -> SdkResult<R>) -> SdkResult<R> {
        if !self.store.start_transaction(false) {
            return Err(SdkError::TransactionBusy);
        }
        match f(self) {
            Ok(value) => {
                if self.store.commit_transaction() {
                    Ok(value)
                } else {
                    Err(SdkError::CommitFailed)
                }
            }
            Err(e) => {
                debug!(error = %e, "rolling back transaction");
                if self.store.rollback_transaction() {
                    Err(e)
                } else {
                    error!(error = %e, "transaction rollback failed; writes may persist");
                    Err(SdkError::RollbackFailed(Box::new(e)))
                }
            }
        }
    }
}
