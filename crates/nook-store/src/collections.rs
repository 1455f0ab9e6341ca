use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use nook_core::{Collection, StoreError, StoreResult, shallow_merge, with_id};
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::{Map, Value};
use tracing::debug;

use crate::migrations::{self, COLLECTION_MIGRATIONS};
use crate::open_connection;

/// Schema-less storage for the wishlist, watchlist and halloween collections.
///
/// Items are arbitrary JSON objects keyed by a store-assigned integer id.
/// `update_item` and `delete_item` treat a missing id as a no-op rather than
/// an error.
pub trait CollectionStore {
    /// Every item with its `id`, newest first.
    fn get_all(&self, collection: Collection) -> StoreResult<Vec<Value>>;

    fn add_item(&self, collection: Collection, item: Value) -> StoreResult<Value>;

    /// Shallow-merges `patch` into the stored item. `Ok(None)` when the id is absent.
    fn update_item(
        &self,
        collection: Collection,
        id: i64,
        patch: Value,
    ) -> StoreResult<Option<Value>>;

    fn delete_item(&self, collection: Collection, id: i64) -> StoreResult<bool>;
}

/// Where the valentine collections live.
#[derive(Debug, Clone)]
pub enum CollectionBackend {
    Sqlite(PathBuf),
    JsonFiles(PathBuf),
}

impl CollectionBackend {
    /// Prepares the backing storage. Call once at startup.
    pub fn initialize(&self) -> StoreResult<()> {
        match self {
            Self::Sqlite(db_path) => SqliteCollectionStore::initialize(db_path).map(|_| ()),
            Self::JsonFiles(dir) => fs::create_dir_all(dir).map_err(|source| StoreError::Io {
                path: dir.clone(),
                source,
            }),
        }
    }

    pub fn open(&self) -> StoreResult<Box<dyn CollectionStore + Send>> {
        match self {
            Self::Sqlite(db_path) => Ok(Box::new(SqliteCollectionStore::open(db_path)?)),
            Self::JsonFiles(dir) => Ok(Box::new(JsonCollectionStore::new(dir.clone()))),
        }
    }
}

pub struct SqliteCollectionStore {
    conn: Connection,
}

impl SqliteCollectionStore {
    pub fn initialize(db_path: &Path) -> StoreResult<Self> {
        let store = Self::open(db_path)?;
        migrations::run(&store.conn, COLLECTION_MIGRATIONS)?;
        Ok(store)
    }

    pub fn open(db_path: &Path) -> StoreResult<Self> {
        let conn = open_connection(db_path)?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!(journal_mode = %mode, "opened collection store");
        Ok(Self { conn })
    }

    fn load(&self, collection: Collection, id: i64) -> StoreResult<Option<Map<String, Value>>> {
        // Table names come from the closed Collection enum, never from input.
        let sql = format!("SELECT data FROM {} WHERE id = ?1", collection.as_str());
        let data: Option<String> = self
            .conn
            .query_row(&sql, params![id], |row| row.get(0))
            .optional()?;
        match data {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }
}

impl CollectionStore for SqliteCollectionStore {
    fn get_all(&self, collection: Collection) -> StoreResult<Vec<Value>> {
        let sql = format!(
            "SELECT id, data FROM {} ORDER BY created_at DESC, id DESC",
            collection.as_str()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter()
            .map(|(id, raw)| -> StoreResult<Value> {
                let fields: Map<String, Value> = serde_json::from_str(&raw)?;
                Ok(with_id(fields, id))
            })
            .collect()
    }

    fn add_item(&self, collection: Collection, item: Value) -> StoreResult<Value> {
        let fields = collection.prepare_item(item)?;
        let data = serde_json::to_string(&fields)?;
        let sql = format!(
            "INSERT INTO {} (data, created_at) VALUES (?1, ?2)",
            collection.as_str()
        );
        self.conn.execute(&sql, params![data, created_at_now()])?;
        Ok(with_id(fields, self.conn.last_insert_rowid()))
    }

    fn update_item(
        &self,
        collection: Collection,
        id: i64,
        patch: Value,
    ) -> StoreResult<Option<Value>> {
        let patch = collection.prepare_patch(patch)?;
        let Some(mut fields) = self.load(collection, id)? else {
            debug!(%collection, id, "update of missing item ignored");
            return Ok(None);
        };
        shallow_merge(&mut fields, patch);
        let sql = format!("UPDATE {} SET data = ?1 WHERE id = ?2", collection.as_str());
        self.conn
            .execute(&sql, params![serde_json::to_string(&fields)?, id])?;
        Ok(Some(with_id(fields, id)))
    }

    fn delete_item(&self, collection: Collection, id: i64) -> StoreResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", collection.as_str());
        let changed = self.conn.execute(&sql, params![id])?;
        Ok(changed > 0)
    }
}

/// Same format as SQLite's CURRENT_TIMESTAMP with milliseconds appended, so
/// new rows sort after legacy ones and inserts within one second stay ordered.
fn created_at_now() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

/// One pretty-printed JSON array per collection under `dir`.
///
/// Every write re-reads and rewrites the whole file without locking, so two
/// concurrent writers can lose each other's changes.
pub struct JsonCollectionStore {
    dir: PathBuf,
}

impl JsonCollectionStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn path_for(&self, collection: Collection) -> PathBuf {
        self.dir.join(format!("{}.json", collection.as_str()))
    }

    fn read(&self, collection: Collection) -> StoreResult<Vec<Map<String, Value>>> {
        let path = self.path_for(collection);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn write(&self, collection: Collection, items: &[Map<String, Value>]) -> StoreResult<()> {
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path_for(collection);
        let raw = serde_json::to_string_pretty(items)?;
        fs::write(&path, raw).map_err(|source| StoreError::Io { path, source })
    }
}

fn item_id(item: &Map<String, Value>) -> Option<i64> {
    item.get("id").and_then(Value::as_i64)
}

impl CollectionStore for JsonCollectionStore {
    fn get_all(&self, collection: Collection) -> StoreResult<Vec<Value>> {
        Ok(self
            .read(collection)?
            .into_iter()
            .rev()
            .map(Value::Object)
            .collect())
    }

    fn add_item(&self, collection: Collection, item: Value) -> StoreResult<Value> {
        let fields = collection.prepare_item(item)?;
        let mut items = self.read(collection)?;
        let id = items.iter().filter_map(item_id).max().unwrap_or(0) + 1;
        let stored = with_id(fields, id);
        if let Value::Object(map) = &stored {
            items.push(map.clone());
        }
        self.write(collection, &items)?;
        Ok(stored)
    }

    fn update_item(
        &self,
        collection: Collection,
        id: i64,
        patch: Value,
    ) -> StoreResult<Option<Value>> {
        let patch = collection.prepare_patch(patch)?;
        let mut items = self.read(collection)?;
        let Some(item) = items.iter_mut().find(|item| item_id(item) == Some(id)) else {
            debug!(%collection, id, "update of missing item ignored");
            return Ok(None);
        };
        shallow_merge(item, patch);
        let updated = Value::Object(item.clone());
        self.write(collection, &items)?;
        Ok(Some(updated))
    }

    fn delete_item(&self, collection: Collection, id: i64) -> StoreResult<bool> {
        let mut items = self.read(collection)?;
        let before = items.len();
        items.retain(|item| item_id(item) != Some(id));
        if items.len() == before {
            return Ok(false);
        }
        self.write(collection, &items)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn sqlite_store_runs_in_wal_mode() {
        let tmp = tempdir().expect("tempdir");
        let store = SqliteCollectionStore::initialize(&tmp.path().join("valentine.db"))
            .expect("init");
        let mode: String = store
            .conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .expect("journal_mode");
        assert_eq!(mode.to_lowercase(), "wal");
    }
}
