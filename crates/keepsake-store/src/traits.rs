use crate::error::StoreResult;
use crate::row::StoredRow;

/// Row-level storage medium underneath a [`crate::PersistenceEngine`].
///
/// The engine owns the backend behind its lock and calls these methods one
/// at a time, so implementations take `&mut self` and need no locking of
/// their own. Every backend must satisfy the same contract:
///
/// - `upsert` replaces any existing row with the same id and is visible to
///   every later call immediately, inside or outside a transaction.
/// - A `discriminators` filter of `None` matches every row; `Some(set)`
///   matches rows whose discriminator is in `set`.
/// - Rows come back ordered by `created_at`, then `id`.
/// - `begin`/`commit`/`rollback` are only called in the order the engine's
///   state machine allows: never nested, never without an open transaction.
///   `rollback` undoes every change since `begin`.
pub trait StorageBackend: Send {
    /// Short name for log lines.
    fn name(&self) -> &'static str;

    fn upsert(&mut self, row: &StoredRow) -> StoreResult<()>;

    fn fetch(&mut self, id: &str) -> StoreResult<Option<StoredRow>>;

    fn select(&mut self, discriminators: Option<&[String]>) -> StoreResult<Vec<StoredRow>>;

    fn select_ids(&mut self, discriminators: &[String]) -> StoreResult<Vec<String>>;

    fn count(&mut self, discriminators: Option<&[String]>) -> StoreResult<i64>;

    /// Remove one row. Returns `true` if it existed.
    fn remove(&mut self, id: &str) -> StoreResult<bool>;

    /// Remove matching rows (`None` removes everything).
    fn remove_matching(&mut self, discriminators: Option<&[String]>) -> StoreResult<()>;

    fn begin(&mut self) -> StoreResult<()>;

    fn commit(&mut self) -> StoreResult<()>;

    fn rollback(&mut self) -> StoreResult<()>;

    /// Whether the medium itself holds an open transaction. The medium may
    /// end one on its own (SQLite aborts on a full disk or I/O error), so the
    /// engine checks this before trusting its own flag.
    fn in_transaction(&self) -> bool;
}
