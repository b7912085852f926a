//! High-level SDK for keepsake.
//!
//! Declare the storable types and their renames on a [`KeepsakeBuilder`],
//! open a [`Keepsake`], then save and load records by id. This is the main
//! entry point for applications embedding keepsake.

pub mod builder;
pub mod error;
pub mod keepsake;

pub use builder::KeepsakeBuilder;
pub use error::{SdkError, SdkResult};
pub use keepsake::Keepsake;

// Re-export key types
pub use keepsake_codec::{Codec, Document, DocumentReader, Storable};
pub use keepsake_store::{Record, StoreConfig};
pub use keepsake_types::{RecordId, Timestamp};
