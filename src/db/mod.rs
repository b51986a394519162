//! Preferences database: favorites, dark mode and the cached client IP.

mod prefs;
pub mod schema;

use color_eyre::{eyre::eyre, Result};
use rusqlite::Connection;
use std::path::Path;

/// Connection to `state.db`, kept apart from the response cache so clearing
/// one never loses the other.
pub struct Database {
  conn: Connection,
}

impl Database {
  /// Open or create `state.db` in the data directory
  pub fn open() -> Result<Self> {
    Self::open_at(&crate::config::data_dir()?.join("state.db"))
  }

  pub fn open_at(path: &Path) -> Result<Self> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create database directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open preferences at {}: {}", path.display(), e))?;
    Self::migrate(conn)
  }

  #[cfg(test)]
  pub fn open_in_memory() -> Result<Self> {
    let conn =
      Connection::open_in_memory().map_err(|e| eyre!("Failed to open in-memory database: {}", e))?;
    Self::migrate(conn)
  }

  fn migrate(conn: Connection) -> Result<Self> {
    conn
      .execute_batch(schema::SCHEMA)
      .map_err(|e| eyre!("Failed to run preference migrations: {}", e))?;
    Ok(Self { conn })
  }

  fn conn(&self) -> &Connection {
    &self.conn
  }
}
