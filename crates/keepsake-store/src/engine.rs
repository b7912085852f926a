use std::sync::Mutex;

use keepsake_codec::{Codec, Storable};
use keepsake_types::RecordId;
use tracing::{debug, error, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::record::Record;
use crate::row::StoredRow;
use crate::traits::StorageBackend;

/// State guarded by the engine lock.
///
/// Methods here never lock; they are the building blocks public operations
/// compose while already holding the lock.
struct EngineState<B> {
    backend: B,
    in_transaction: bool,
}

impl<B: StorageBackend> EngineState<B> {
    /// Drop the transaction flag if the backend has already ended the
    /// transaction on its own.
    fn sync_transaction(&mut self) {
        if self.in_transaction && !self.backend.in_transaction() {
            warn!(backend = self.backend.name(), "transaction ended by backend");
            self.in_transaction = false;
        }
    }

    fn count_unlocked(&mut self, discriminators: Option<&[String]>) -> StoreResult<i64> {
        self.backend.count(discriminators)
    }

    fn rollback_unlocked(&mut self) -> StoreResult<bool> {
        self.sync_transaction();
        if !self.in_transaction {
            return Ok(false);
        }
        let result = self.backend.rollback();
        self.in_transaction = self.backend.in_transaction();
        result?;
        Ok(true)
    }

    fn delete_matching_unlocked(&mut self, discriminators: Option<&[String]>) -> StoreResult<i64> {
        // Measured on totals so the result reflects the net change within
        // this critical section, not per-statement affected rows.
        let before = self.count_unlocked(None)?;
        self.backend.remove_matching(discriminators)?;
        let after = self.count_unlocked(None)?;
        Ok(before - after)
    }
}

/// Thread-safe, transactional record store over a [`StorageBackend`].
///
/// Every operation, including transaction control, runs inside one mutex, so
/// all calls from all threads are totally ordered and never overlap at the
/// storage layer. Calls block until their turn completes.
///
/// Writes apply immediately. A transaction only makes them reversible:
/// [`PersistenceEngine::rollback_transaction`] undoes everything written
/// since the matching start, including writes made by other threads in the
/// meantime.
///
/// Operations never return storage errors. Failures are logged and reported
/// as `false`, `-1`, `None` or an empty list.
pub struct PersistenceEngine<B> {
    state: Mutex<EngineState<B>>,
    codec: Codec,
}

impl<B: StorageBackend> PersistenceEngine<B> {
    /// Wrap an open backend.
    pub fn new(backend: B, codec: Codec) -> Self {
        Self {
            state: Mutex::new(EngineState {
                backend,
                in_transaction: false,
            }),
            codec,
        }
    }

    /// The codec rows are encoded and restored with.
    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    /// Run `f` inside the critical section, mapping failure to `fallback`.
    fn with_state<R>(
        &self,
        op: &'static str,
        fallback: R,
        f: impl FnOnce(&mut EngineState<B>) -> StoreResult<R>,
    ) -> R {
        let mut guard = match self.state.lock() {
            Ok(guard) => guard,
            Err(_) => {
                error!(op, error = %StoreError::LockPoisoned, "store operation failed");
                return fallback;
            }
        };
        let backend = guard.backend.name();
        match f(&mut *guard) {
            Ok(result) => result,
            Err(e) => {
                error!(op, backend, error = %e, "store operation failed");
                fallback
            }
        }
    }

    // ---- Writes ----

    /// Insert or replace the row for `record.id()`.
    pub fn write<T: Storable>(&self, record: &Record<T>) -> bool {
        let row = match StoredRow::encode(record, &self.codec) {
            Ok(row) => row,
            Err(e) => {
                error!(id = %record.id(), type_name = T::TYPE_NAME, error = %e, "record not encodable");
                return false;
            }
        };
        self.with_state("write", false, |state| {
            state.backend.upsert(&row)?;
            debug!(id = %record.id(), discriminator = %row.discriminator, "record written");
            Ok(true)
        })
    }

    /// Write each record as its own operation. Returns how many succeeded.
    pub fn write_batch<T: Storable>(&self, records: &[Record<T>]) -> usize {
        records.iter().filter(|record| self.write(record)).count()
    }

    // ---- Reads ----

    /// Every readable record of type `T`, including rows written under its
    /// one-level historical names. Rows that fail to restore are skipped.
    pub fn read_all<T: Storable>(&self) -> Vec<Record<T>> {
        let set = self.codec.discriminator_set::<T>();
        let rows = self.with_state("read_all", Vec::new(), |state| {
            state.backend.select(Some(set.as_slice()))
        });
        rows.iter()
            .filter_map(|row| match row.decode(&self.codec) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(id = %row.id, discriminator = %row.discriminator, error = %e, "skipping unreadable row");
                    None
                }
            })
            .collect()
    }

    /// Ids of every row counted as type `T`.
    pub fn read_ids<T: Storable>(&self) -> Vec<RecordId> {
        let set = self.codec.discriminator_set::<T>();
        let ids = self.with_state("read_ids", Vec::new(), |state| state.backend.select_ids(&set));
        ids.into_iter()
            .filter_map(|id| match RecordId::parse(id) {
                Ok(id) => Some(id),
                Err(e) => {
                    warn!(error = %e, "skipping row with invalid id");
                    None
                }
            })
            .collect()
    }

    /// The record stored under `id`, if it exists and restores as `T`.
    pub fn read<T: Storable>(&self, id: &RecordId) -> Option<Record<T>> {
        let row = self.with_state("read", None, |state| state.backend.fetch(id.as_str()))?;
        match row.decode(&self.codec) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(%id, discriminator = %row.discriminator, error = %e, "row not readable as requested type");
                None
            }
        }
    }

    /// Whether any row is stored under `id`.
    pub fn contains(&self, id: &RecordId) -> bool {
        self.with_state("contains", false, |state| {
            Ok(state.backend.fetch(id.as_str())?.is_some())
        })
    }

    /// Total number of rows, or `-1` on failure.
    pub fn count(&self) -> i64 {
        self.with_state("count", -1, |state| state.count_unlocked(None))
    }

    /// Number of rows counted as type `T`, or `-1` on failure.
    pub fn count_of<T: Storable>(&self) -> i64 {
        let set = self.codec.discriminator_set::<T>();
        self.with_state("count_of", -1, |state| state.count_unlocked(Some(set.as_slice())))
    }

    // ---- Deletes ----

    /// Remove every row counted as type `T`. Returns the drop in the total
    /// row count, or `-1` on failure.
    pub fn delete_all<T: Storable>(&self) -> i64 {
        let set = self.codec.discriminator_set::<T>();
        self.with_state("delete_all", -1, |state| {
            let removed = state.delete_matching_unlocked(Some(set.as_slice()))?;
            debug!(type_name = T::TYPE_NAME, removed, "records deleted");
            Ok(removed)
        })
    }

    /// Remove the row stored under `id`. Returns whether one existed.
    pub fn delete(&self, id: &RecordId) -> bool {
        self.with_state("delete", false, |state| state.backend.remove(id.as_str()))
    }

    /// Remove every row. Returns how many there were, or `-1` on failure.
    pub fn clear_database(&self) -> i64 {
        self.with_state("clear_database", -1, |state| {
            let removed = state.delete_matching_unlocked(None)?;
            info!(removed, "database cleared");
            Ok(removed)
        })
    }

    // ---- Transactions ----

    /// Open a transaction.
    ///
    /// If one is already open, `overriding == false` leaves it untouched and
    /// returns `false`; `overriding == true` rolls it back first and opens a
    /// fresh one.
    pub fn start_transaction(&self, overriding: bool) -> bool {
        self.with_state("start_transaction", false, |state| {
            state.sync_transaction();
            if state.in_transaction {
                if !overriding {
                    debug!("transaction already open");
                    return Ok(false);
                }
                state.rollback_unlocked()?;
                debug!("open transaction rolled back by override");
            }
            state.backend.begin()?;
            state.in_transaction = true;
            debug!("transaction started");
            Ok(true)
        })
    }

    /// Make the open transaction's writes permanent. `false` if none is open.
    pub fn commit_transaction(&self) -> bool {
        self.with_state("commit_transaction", false, |state| {
            state.sync_transaction();
            if !state.in_transaction {
                debug!("commit without open transaction");
                return Ok(false);
            }
            let result = state.backend.commit();
            state.in_transaction = state.backend.in_transaction();
            result?;
            debug!("transaction committed");
            Ok(true)
        })
    }

    /// Undo the open transaction's writes. `false` if none is open.
    pub fn rollback_transaction(&self) -> bool {
        self.with_state("rollback_transaction", false, |state| {
            let rolled_back = state.rollback_unlocked()?;
            if rolled_back {
                debug!("transaction rolled back");
            } else {
                debug!("rollback without open transaction");
            }
            Ok(rolled_back)
        })
    }

    /// Whether a transaction is currently open.
    pub fn in_transaction(&self) -> bool {
        self.with_state("in_transaction", false, |state| {
            state.sync_transaction();
            Ok(state.in_transaction)
        })
    }

    /// Direct backend access for planting rows the codec would never write.
    #[cfg(test)]
    pub(crate) fn with_backend<R>(&self, f: impl FnOnce(&mut B) -> R) -> R {
        let mut guard = self.state.lock().unwrap();
        f(&mut guard.backend)
    }
}

impl<B> std::fmt::Debug for PersistenceEngine<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceEngine")
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}
