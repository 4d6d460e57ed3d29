/// Disk persistence layer backed by redb.
///
/// Uses a single redb database file with two tables:
/// - `records`: stores serialized `EditRecord` entries keyed by `"{doc_id}#{index:020}"`
/// - `meta`: stores per-document metadata (seed value, record count) keyed by `doc_id`
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use crate::record::EditRecord;
use crate::store::HistoryStore;

/// Records table: composite string key → bincode-serialized EditRecord.
const RECORDS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("records");

/// Metadata table: doc_id → bincode-serialized DocumentMeta.
const META_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("meta");

/// Per-document metadata persisted alongside the log.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct DocumentMeta {
    seed: String,
    record_count: u64,
}

/// Formats a records table key from doc_id and log index.
///
/// The index is zero-padded to 20 digits to ensure correct
/// lexicographic ordering in the B-tree.
fn record_key(doc_id: &str, index: u64) -> String {
    format!("{doc_id}#{index:020}")
}

/// Returns the exclusive range bounds for all records of a document.
///
/// Uses `#` as separator and `$` (one ASCII codepoint above `#`) as the
/// exclusive upper bound, ensuring the range captures exactly the entries
/// for the given doc_id.
fn doc_range(doc_id: &str) -> (String, String) {
    let start = format!("{doc_id}#");
    let end = format!("{doc_id}$");
    (start, end)
}

/// Persistence layer for history logs backed by redb.
///
/// Thread-safe: redb supports concurrent readers and serialized writers.
/// Shared across editing sessions via `Arc<PersistenceLayer>`.
pub struct PersistenceLayer {
    db: Database,
}

impl std::fmt::Debug for PersistenceLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceLayer").finish()
    }
}

impl PersistenceLayer {
    /// Opens or creates the history database in the given directory.
    ///
    /// Creates the directory and database file if they don't exist.
    /// Initializes tables on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the database
    /// cannot be opened.
    pub fn open(data_dir: &Path) -> Result<Arc<Self>> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let db_path = data_dir.join("history.redb");
        let db = Database::create(&db_path)
            .with_context(|| format!("Failed to open history database: {}", db_path.display()))?;

        // Ensure tables exist
        let write_txn = db
            .begin_write()
            .context("Failed to begin initial write transaction")?;
        {
            let _ = write_txn
                .open_table(RECORDS_TABLE)
                .context("Failed to create records table")?;
            let _ = write_txn
                .open_table(META_TABLE)
                .context("Failed to create meta table")?;
        }
        write_txn
            .commit()
            .context("Failed to commit initial transaction")?;

        Ok(Arc::new(Self { db }))
    }

    /// Replaces the stored log of a document with `seed` and `records`.
    ///
    /// Runs in a single write transaction, so readers see either the old
    /// log or the new one.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write transaction fails.
    pub fn write_records(&self, doc_id: &str, seed: &str, records: &[EditRecord]) -> Result<()> {
        let meta = DocumentMeta {
            seed: seed.to_string(),
            record_count: records.len() as u64,
        };
        let meta_bytes =
            bincode::serialize(&meta).context("Failed to serialize document metadata")?;

        let write_txn = self
            .db
            .begin_write()
            .context("Failed to begin write transaction")?;
        {
            let mut table = write_txn
                .open_table(RECORDS_TABLE)
                .context("Failed to open records table")?;

            let (start, end) = doc_range(doc_id);
            let stale: Vec<String> = table
                .range::<&str>(start.as_str()..end.as_str())
                .context("Failed to range query records table")?
                .filter_map(|entry| entry.ok().map(|(k, _)| k.value().to_string()))
                .collect();
            for key in &stale {
                table
                    .remove(key.as_str())
                    .context("Failed to remove stale record")?;
            }

            for (index, record) in records.iter().enumerate() {
                let key = record_key(doc_id, index as u64);
                let bytes = bincode::serialize(record).context("Failed to serialize record")?;
                table
                    .insert(key.as_str(), bytes.as_slice())
                    .context("Failed to insert record")?;
            }
        }
        {
            let mut meta_table = write_txn
                .open_table(META_TABLE)
                .context("Failed to open meta table")?;
            meta_table
                .insert(doc_id, meta_bytes.as_slice())
                .context("Failed to insert metadata")?;
        }
        write_txn
            .commit()
            .context("Failed to commit write transaction")?;

        tracing::debug!(doc_id, records = records.len(), "Wrote history log");
        Ok(())
    }

    /// Writes the full log of `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn save_store(&self, doc_id: &str, store: &HistoryStore) -> Result<()> {
        self.write_records(doc_id, store.seed(), store.records())
    }

    /// Reads all records for a document, ordered by log index.
    ///
    /// # Errors
    ///
    /// Returns an error if the read transaction or deserialization fails.
    pub fn read_records(&self, doc_id: &str) -> Result<Vec<EditRecord>> {
        let read_txn = self
            .db
            .begin_read()
            .context("Failed to begin read transaction")?;
        let table = read_txn
            .open_table(RECORDS_TABLE)
            .context("Failed to open records table")?;

        let (start, end) = doc_range(doc_id);
        let mut records = Vec::new();

        for entry in table
            .range::<&str>(start.as_str()..end.as_str())
            .context("Failed to range query records table")?
        {
            let (_, value_guard) = entry.context("Failed to read record entry")?;
            let record: EditRecord = bincode::deserialize(value_guard.value())
                .context("Failed to deserialize record")?;
            records.push(record);
        }

        Ok(records)
    }

    /// Loads the seed value stored for a document.
    ///
    /// Returns `None` if no log exists for this document.
    ///
    /// # Errors
    ///
    /// Returns an error if the read transaction or deserialization fails.
    pub fn load_seed(&self, doc_id: &str) -> Result<Option<String>> {
        Ok(self.load_meta(doc_id)?.map(|meta| meta.seed))
    }

    fn load_meta(&self, doc_id: &str) -> Result<Option<DocumentMeta>> {
        let read_txn = self
            .db
            .begin_read()
            .context("Failed to begin read transaction")?;
        let table = read_txn
            .open_table(META_TABLE)
            .context("Failed to open meta table")?;

        match table.get(doc_id).context("Failed to read metadata")? {
            Some(guard) => {
                let meta: DocumentMeta = bincode::deserialize(guard.value())
                    .context("Failed to deserialize metadata")?;
                Ok(Some(meta))
            }
            None => Ok(None),
        }
    }

    /// Rebuilds a [`HistoryStore`] from disk.
    ///
    /// Returns `None` if no log exists for this document.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails, if fewer or more records are
    /// stored than the metadata says, or if the stored records do not fold
    /// over the stored seed.
    pub fn load_store(&self, doc_id: &str) -> Result<Option<HistoryStore>> {
        let Some(meta) = self.load_meta(doc_id)? else {
            return Ok(None);
        };
        let records = self.read_records(doc_id)?;
        if records.len() as u64 != meta.record_count {
            anyhow::bail!(
                "Stored history for {doc_id} has {} records, expected {}",
                records.len(),
                meta.record_count
            );
        }
        let store = HistoryStore::with_records(meta.seed, records)
            .with_context(|| format!("Stored history for {doc_id} is inconsistent"))?;
        Ok(Some(store))
    }

    /// Counts the number of records stored for a document.
    ///
    /// # Errors
    ///
    /// Returns an error if the read transaction fails.
    pub fn count_records(&self, doc_id: &str) -> Result<usize> {
        let read_txn = self
            .db
            .begin_read()
            .context("Failed to begin read transaction")?;
        let table = read_txn
            .open_table(RECORDS_TABLE)
            .context("Failed to open records table")?;

        let (start, end) = doc_range(doc_id);
        let count = table
            .range::<&str>(start.as_str()..end.as_str())
            .context("Failed to range query for count")?
            .count();

        Ok(count)
    }

    /// Removes all records and metadata for a document.
    ///
    /// # Errors
    ///
    /// Returns an error if the write transaction fails.
    pub fn delete_document(&self, doc_id: &str) -> Result<()> {
        let write_txn = self
            .db
            .begin_write()
            .context("Failed to begin write transaction")?;
        {
            let mut table = write_txn
                .open_table(RECORDS_TABLE)
                .context("Failed to open records table")?;

            let (start, end) = doc_range(doc_id);
            let keys_to_remove: Vec<String> = table
                .range::<&str>(start.as_str()..end.as_str())
                .context("Failed to range query for deletion")?
                .filter_map(|entry| entry.ok().map(|(k, _)| k.value().to_string()))
                .collect();

            for key in &keys_to_remove {
                table
                    .remove(key.as_str())
                    .context("Failed to remove entry")?;
            }
        }
        {
            let mut meta_table = write_txn
                .open_table(META_TABLE)
                .context("Failed to open meta table")?;
            let _ = meta_table.remove(doc_id);
        }
        write_txn.commit().context("Failed to commit deletion")?;
        Ok(())
    }

    /// Lists all document IDs that have stored metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the read transaction fails.
    pub fn list_documents(&self) -> Result<Vec<String>> {
        let read_txn = self
            .db
            .begin_read()
            .context("Failed to begin read transaction")?;
        let table = read_txn
            .open_table(META_TABLE)
            .context("Failed to open meta table")?;

        let mut doc_ids = Vec::new();
        for entry in table.iter().context("Failed to iterate meta table")? {
            let (key_guard, _) = entry.context("Failed to read meta entry")?;
            doc_ids.push(key_guard.value().to_string());
        }
        Ok(doc_ids)
    }
}
