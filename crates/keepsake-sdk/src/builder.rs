use std::path::Path;

use keepsake_codec::{Codec, CodecError, Storable};
use keepsake_store::{SqliteStore, StoreConfig};
use tracing::info;

use crate::error::SdkResult;
use crate::keepsake::Keepsake;

/// Collects types, renames and configuration, then opens a [`Keepsake`].
///
/// Everything the codec needs is declared here, so every rename is known
/// before the first row is read. Opening freezes the rename table.
#[derive(Debug, Default)]
pub struct KeepsakeBuilder {
    codec: Codec,
    config: StoreConfig,
    failure: Option<CodecError>,
}

impl KeepsakeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T` for restoration. A conflicting registration is reported
    /// by [`KeepsakeBuilder::open`].
    pub fn register<T: Storable>(mut self) -> Self {
        if let Err(e) = self.codec.register::<T>() {
            self.failure.get_or_insert(e);
        }
        self
    }

    /// Declare that rows written as `old` are now read as `new`.
    pub fn refactor(self, old: impl Into<String>, new: impl Into<String>) -> Self {
        self.codec.legacy().register_refactor(old, new);
        self
    }

    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Shorthand for a file database with otherwise default settings.
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.config.path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn open(self) -> SdkResult<Keepsake> {
        if let Some(e) = self.failure {
            return Err(e.into());
        }
        let types = self.codec.registry().len();
        let renames = self.codec.legacy().len();
        self.codec.legacy().freeze();
        let store = SqliteStore::open(&self.config, self.codec)?;
        info!(types, renames, "keepsake opened");
        Ok(Keepsake::from_store(store))
    }
}
