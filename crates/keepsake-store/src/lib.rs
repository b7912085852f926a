//! Transactional record storage for keepsake.
//!
//! A [`PersistenceEngine`] persists [`Record`]s of any [`keepsake_codec::Storable`]
//! type as self-describing rows: the record id, the type discriminator, the
//! creation time and the document text. Reads restore rows through the
//! engine's [`keepsake_codec::Codec`], so rows written under a type's old
//! name are read, counted and deleted as the current type.
//!
//! # Backends
//!
//! All backends implement the [`StorageBackend`] trait:
//!
//! - [`SqliteBackend`] (via [`SqliteStore`]) -- an embedded SQLite database,
//!   on disk or in memory
//! - [`MemoryBackend`] (via [`InMemoryStore`]) -- a map with snapshot
//!   rollback, for tests and ephemeral stores
//!
//! # Design Rules
//!
//! 1. One lock serializes every operation, transaction control included.
//! 2. Writes are visible immediately; a transaction only makes them undoable.
//! 3. There is at most one open transaction per engine, shared by all threads.
//! 4. Public operations never return errors: failures are logged and reported
//!    as `false`, `-1`, `None` or an empty list.
//! 5. Unreadable rows are skipped by bulk reads, never fatal.

pub mod config;
pub mod engine;
pub mod error;
pub mod memory;
pub mod record;
pub mod row;
pub mod sqlite;
pub mod traits;

#[cfg(test)]
mod contract;
#[cfg(test)]
pub(crate) mod fixtures;

pub use config::{JournalMode, StoreConfig};
pub use engine::PersistenceEngine;
pub use error::{StoreError, StoreResult};
pub use memory::{InMemoryStore, MemoryBackend};
pub use record::Record;
pub use row::StoredRow;
pub use sqlite::{SqliteBackend, SqliteStore};
pub use traits::StorageBackend;
