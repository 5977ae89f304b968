//! Local persistence: a namespaced key-value table in SQLite.

mod kv;
mod migrations;
mod projects;

use anyhow::Result;
use rusqlite::Connection;

use crate::errors::StoreError;

pub use kv::SqliteStore;
pub use projects::{
    add_project, append_missing, load_projects, parse_project_id, remove_project, save_projects,
    set_archived, visible_projects,
};

/// Namespaced, version-free persistence contract. Saving a key replaces its
/// previous value wholesale.
pub trait KeyValueStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Opens (or creates) the SQLite database and runs migrations.
pub fn init(db_path: &str) -> Result<SqliteStore> {
    let conn = Connection::open(db_path)?;
    migrations::run_migrations(&conn)?;
    log::debug!("Opened store at {db_path}");
    Ok(SqliteStore::new(conn))
}

/// In-memory store with the same schema, used by tests.
#[cfg(test)]
pub fn init_in_memory() -> SqliteStore {
    let conn = Connection::open_in_memory().expect("in-memory sqlite");
    migrations::run_migrations(&conn).expect("migrations");
    SqliteStore::new(conn)
}

/// Returns the default database path inside the user's data directory.
/// Falls back to `./timegrid.db` when no data dir is found.
pub fn default_db_path() -> String {
    if let Some(data_dir) = dirs::data_local_dir() {
        let app_dir = data_dir.join("timegrid");
        std::fs::create_dir_all(&app_dir).ok();
        app_dir.join("timegrid.db").to_string_lossy().into_owned()
    } else {
        "timegrid.db".to_string()
    }
}
