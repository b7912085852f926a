use keepsake_codec::Codec;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use tracing::info;

use crate::config::StoreConfig;
use crate::engine::PersistenceEngine;
use crate::error::StoreResult;
use crate::row::StoredRow;
use crate::traits::StorageBackend;

/// The persistence engine over SQLite.
pub type SqliteStore = PersistenceEngine<SqliteBackend>;

impl SqliteStore {
    /// Open (or create) the database described by `config`.
    pub fn open(config: &StoreConfig, codec: Codec) -> StoreResult<Self> {
        Ok(Self::new(SqliteBackend::open(config)?, codec))
    }
}

/// SQLite medium: one table of `(id, discriminator, created_at, data)` rows.
///
/// Transactions use plain `BEGIN`/`COMMIT`/`ROLLBACK` on the single
/// connection, so writes made inside a transaction are immediately visible
/// to every later statement.
pub struct SqliteBackend {
    conn: Connection,
    table: String,
}

impl SqliteBackend {
    pub fn open(config: &StoreConfig) -> StoreResult<Self> {
        config.validate()?;
        let conn = match &config.path {
            Some(path) => Connection::open(path)?,
            None => Connection::open_in_memory()?,
        };
        conn.busy_timeout(config.busy_timeout())?;
        let journal_mode: String = conn.pragma_update_and_check(
            None,
            "journal_mode",
            config.journal_mode.as_pragma(),
            |row| row.get(0),
        )?;

        let table = config.table.clone();
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id TEXT PRIMARY KEY NOT NULL,
                discriminator TEXT NOT NULL,
                created_at TEXT NOT NULL,
                data TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS {table}_discriminator ON {table} (discriminator);"
        ))?;

        let location = config
            .path
            .as_ref()
            .map_or_else(|| ":memory:".to_string(), |p| p.display().to_string());
        info!(%location, %table, %journal_mode, "sqlite store opened");
        Ok(Self { conn, table })
    }

    fn filter_clause(discriminators: Option<&[String]>) -> String {
        match discriminators {
            None => String::new(),
            Some([]) => " WHERE 0".to_string(),
            Some(set) => {
                let placeholders: Vec<String> = (1..=set.len()).map(|i| format!("?{i}")).collect();
                format!(" WHERE discriminator IN ({})", placeholders.join(", "))
            }
        }
    }

    fn bindings(discriminators: Option<&[String]>) -> impl Iterator<Item = &String> {
        discriminators.into_iter().flatten()
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<StoredRow> {
        Ok(StoredRow {
            id: row.get(0)?,
            discriminator: row.get(1)?,
            created_at: row.get(2)?,
            data: row.get(3)?,
        })
    }
}

impl StorageBackend for SqliteBackend {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn upsert(&mut self, row: &StoredRow) -> StoreResult<()> {
        let sql = format!(
            "INSERT OR REPLACE INTO {} (id, discriminator, created_at, data) VALUES (?1, ?2, ?3, ?4)",
            self.table
        );
        self.conn.prepare_cached(&sql)?.execute(params![
            row.id,
            row.discriminator,
            row.created_at,
            row.data
        ])?;
        Ok(())
    }

    fn fetch(&mut self, id: &str) -> StoreResult<Option<StoredRow>> {
        let sql = format!(
            "SELECT id, discriminator, created_at, data FROM {} WHERE id = ?1",
            self.table
        );
        let row = self
            .conn
            .prepare_cached(&sql)?
            .query_row(params![id], Self::map_row)
            .optional()?;
        Ok(row)
    }

    fn select(&mut self, discriminators: Option<&[String]>) -> StoreResult<Vec<StoredRow>> {
        let sql = format!(
            "SELECT id, discriminator, created_at, data FROM {}{} ORDER BY created_at, id",
            self.table,
            Self::filter_clause(discriminators)
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(Self::bindings(discriminators)), Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn select_ids(&mut self, discriminators: &[String]) -> StoreResult<Vec<String>> {
        let sql = format!(
            "SELECT id FROM {}{} ORDER BY created_at, id",
            self.table,
            Self::filter_clause(Some(discriminators))
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let ids = stmt
            .query_map(params_from_iter(discriminators), |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(ids)
    }

    fn count(&mut self, discriminators: Option<&[String]>) -> StoreResult<i64> {
        let sql = format!(
            "SELECT COUNT(*) FROM {}{}",
            self.table,
            Self::filter_clause(discriminators)
        );
        let count: i64 = self
            .conn
            .prepare_cached(&sql)?
            .query_row(params_from_iter(Self::bindings(discriminators)), |row| row.get(0))?;
        Ok(count)
    }

    fn remove(&mut self, id: &str) -> StoreResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", self.table);
        let affected = self.conn.prepare_cached(&sql)?.execute(params![id])?;
        Ok(affected > 0)
    }

    fn remove_matching(&mut self, discriminators: Option<&[String]>) -> StoreResult<()> {
        let sql = format!(
            "DELETE FROM {}{}",
            self.table,
            Self::filter_clause(discriminators)
        );
        self.conn
            .prepare_cached(&sql)?
            .execute(params_from_iter(Self::bindings(discriminators)))?;
        Ok(())
    }

    fn begin(&mut self) -> StoreResult<()> {
        self.conn.execute_batch("BEGIN")?;
        Ok(())
    }

    fn commit(&mut self) -> StoreResult<()> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback(&mut self) -> StoreResult<()> {
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }

    fn in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }
}

impl std::fmt::Debug for SqliteBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteBackend")
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}
