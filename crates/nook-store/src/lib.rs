use std::path::Path;

use nook_core::{StoreError, StoreResult};
use rusqlite::Connection;

pub mod collections;
pub mod migrations;
pub mod tasks;

pub use collections::{
    CollectionBackend, CollectionStore, JsonCollectionStore, SqliteCollectionStore,
};
pub use migrations::{Migration, MigrationOutcome};
pub use tasks::TaskStore;

pub(crate) fn open_connection(db_path: &Path) -> StoreResult<Connection> {
    // Ensure parent directory exists so sqlite can create/open the db file.
    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(Connection::open(db_path)?)
}
