use std::collections::BTreeMap;

use keepsake_codec::Codec;

use crate::engine::PersistenceEngine;
use crate::error::StoreResult;
use crate::row::StoredRow;
use crate::traits::StorageBackend;

/// The persistence engine over process memory.
pub type InMemoryStore = PersistenceEngine<MemoryBackend>;

impl InMemoryStore {
    /// An empty store that lives as long as the value does.
    pub fn in_memory(codec: Codec) -> Self {
        Self::new(MemoryBackend::default(), codec)
    }
}

/// In-memory medium for tests and ephemeral stores.
///
/// Rows live in a map keyed by id. `begin` snapshots the map and `rollback`
/// restores the snapshot.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    rows: BTreeMap<String, StoredRow>,
    savepoint: Option<BTreeMap<String, StoredRow>>,
}

impl MemoryBackend {
    fn matching<'a>(
        &'a self,
        discriminators: Option<&'a [String]>,
    ) -> impl Iterator<Item = &'a StoredRow> + 'a {
        self.rows.values().filter(move |row| match discriminators {
            None => true,
            Some(set) => set.contains(&row.discriminator),
        })
    }

    fn ordered<'a>(&'a self, discriminators: Option<&'a [String]>) -> Vec<&'a StoredRow> {
        let mut rows: Vec<&StoredRow> = self.matching(discriminators).collect();
        rows.sort_by(|a, b| (&a.created_at, &a.id).cmp(&(&b.created_at, &b.id)));
        rows
    }
}

impl StorageBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn upsert(&mut self, row: &StoredRow) -> StoreResult<()> {
        self.rows.insert(row.id.clone(), row.clone());
        Ok(())
    }

    fn fetch(&mut self, id: &str) -> StoreResult<Option<StoredRow>> {
        Ok(self.rows.get(id).cloned())
    }

    fn select(&mut self, discriminators: Option<&[String]>) -> StoreResult<Vec<StoredRow>> {
        Ok(self.ordered(discriminators).into_iter().cloned().collect())
    }

    fn select_ids(&mut self, discriminators: &[String]) -> StoreResult<Vec<String>> {
        Ok(self
            .ordered(Some(discriminators))
            .into_iter()
            .map(|row| row.id.clone())
            .collect())
    }

    fn count(&mut self, discriminators: Option<&[String]>) -> StoreResult<i64> {
        Ok(self.matching(discriminators).count() as i64)
    }

    fn remove(&mut self, id: &str) -> StoreResult<bool> {
        Ok(self.rows.remove(id).is_some())
    }

    fn remove_matching(&mut self, discriminators: Option<&[String]>) -> StoreResult<()> {
        match discriminators {
            None => self.rows.clear(),
            Some(set) => self.rows.retain(|_, row| !set.contains(&row.discriminator)),
        }
        Ok(())
    }

    fn begin(&mut self) -> StoreResult<()> {
        self.savepoint = Some(self.rows.clone());
        Ok(())
    }

    fn commit(&mut self) -> StoreResult<()> {
        self.savepoint = None;
        Ok(())
    }

    fn rollback(&mut self) -> StoreResult<()> {
        if let Some(rows) = self.savepoint.take() {
            self.rows = rows;
        }
        Ok(())
    }

    fn in_transaction(&self) -> bool {
        self.savepoint.is_some()
    }
}
