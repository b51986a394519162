//! Cache storage trait and SQLite implementation.

#[cfg(test)]
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};

use crate::net::{Request, Response};

/// A single cached response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedEntry {
  /// The stored response snapshot
  pub response: Response,
  /// When the entry was written
  pub cached_at: DateTime<Utc>,
}

/// Trait for cache storage backends.
///
/// A backend holds any number of named generations, each mapping request keys
/// to response snapshots. Writes to one generation never touch another.
pub trait CacheStorage: Send + Sync {
  /// Names of every generation present, tracked or not.
  fn generation_names(&self) -> Result<Vec<String>>;

  fn has_generation(&self, name: &str) -> Result<bool>;

  /// Delete a generation and all its entries. Returns whether it existed.
  fn delete_generation(&self, name: &str) -> Result<bool>;

  /// Look up a request in one generation.
  fn match_entry(&self, generation: &str, request: &Request) -> Result<Option<CachedEntry>>;

  /// Store one response, replacing any previous entry for the same request.
  fn put(&self, generation: &str, request: &Request, response: &Response) -> Result<()>;

  /// Store a batch of responses atomically: either all land or none do.
  fn put_all(&self, generation: &str, entries: &[(Request, Response)]) -> Result<()>;

  fn entry_count(&self, generation: &str) -> Result<usize>;

  /// Look up a request in each generation in turn, returning the first hit.
  fn match_any(&self, generations: &[&str], request: &Request) -> Result<Option<CachedEntry>> {
    for generation in generations {
      if let Some(entry) = self.match_entry(generation, request)? {
        return Ok(Some(entry));
      }
    }
    Ok(None)
  }
}

fn ensure_get(request: &Request) -> Result<()> {
  if request.is_get() {
    Ok(())
  } else {
    Err(eyre!(
      "Refusing to cache {} request for {}",
      request.method,
      request.url
    ))
  }
}

/// In-process storage; contents vanish with the process.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStorage {
  generations: Mutex<BTreeMap<String, BTreeMap<String, CachedEntry>>>,
}

#[cfg(test)]
impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, BTreeMap<String, CachedEntry>>>> {
    self
      .generations
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))
  }
}

#[cfg(test)]
impl CacheStorage for MemoryStorage {
  fn generation_names(&self) -> Result<Vec<String>> {
    Ok(self.lock()?.keys().cloned().collect())
  }

  fn has_generation(&self, name: &str) -> Result<bool> {
    Ok(self.lock()?.contains_key(name))
  }

  fn delete_generation(&self, name: &str) -> Result<bool> {
    Ok(self.lock()?.remove(name).is_some())
  }

  fn match_entry(&self, generation: &str, request: &Request) -> Result<Option<CachedEntry>> {
    Ok(
      self
        .lock()?
        .get(generation)
        .and_then(|entries| entries.get(&request.cache_key()))
        .cloned(),
    )
  }

  fn put(&self, generation: &str, request: &Request, response: &Response) -> Result<()> {
    ensure_get(request)?;
    self.lock()?.entry(generation.to_string()).or_default().insert(
      request.cache_key(),
      CachedEntry {
        response: response.clone(),
        cached_at: Utc::now(),
      },
    );
    Ok(())
  }

  fn put_all(&self, generation: &str, entries: &[(Request, Response)]) -> Result<()> {
    for (request, _) in entries {
      ensure_get(request)?;
    }
    let now = Utc::now();
    let mut generations = self.lock()?;
    let target = generations.entry(generation.to_string()).or_default();
    for (request, response) in entries {
      target.insert(
        request.cache_key(),
        CachedEntry {
          response: response.clone(),
          cached_at: now,
        },
      );
    }
    Ok(())
  }

  fn entry_count(&self, generation: &str) -> Result<usize> {
    Ok(self.lock()?.get(generation).map_or(0, BTreeMap::len))
  }
}

/// SQLite-based cache storage implementation.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
}

impl SqliteStorage {
  /// Create a new SQLite storage at the default location.
  pub fn open() -> Result<Self> {
    let path = Self::default_path()?;
    Self::open_at(&path)
  }

  /// Open or create the storage at an explicit path.
  pub fn open_at(path: &Path) -> Result<Self> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    Self::with_connection(conn)
  }

  /// Storage that lives only as long as this value.
  #[cfg(test)]
  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()
      .map_err(|e| eyre!("Failed to open in-memory cache database: {}", e))?;
    Self::with_connection(conn)
  }

  fn with_connection(conn: Connection) -> Result<Self> {
    let storage = Self {
      conn: Mutex::new(conn),
    };
    storage.run_migrations()?;
    Ok(storage)
  }

  /// Get the default database path.
  fn default_path() -> Result<std::path::PathBuf> {
    Ok(crate::config::data_dir()?.join("cache.db"))
  }

  /// Run database migrations for cache tables.
  fn run_migrations(&self) -> Result<()> {
    let conn = self.lock()?;

    conn
      .execute_batch(CACHE_SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;

    Ok(())
  }

  fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
    self.conn.lock().map_err(|e| eyre!("Lock poisoned: {}", e))
  }
}

/// Schema for cache tables.
const CACHE_SCHEMA: &str = r#"
-- One row per named generation
CREATE TABLE IF NOT EXISTS generations (
    name TEXT PRIMARY KEY,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Response snapshots, keyed by hashed method + URL
CREATE TABLE IF NOT EXISTS entries (
    generation TEXT NOT NULL,
    entry_key TEXT NOT NULL,
    method TEXT NOT NULL,
    url TEXT NOT NULL,
    response_url TEXT NOT NULL,
    status INTEGER NOT NULL,
    headers TEXT NOT NULL,
    body BLOB NOT NULL,
    cached_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (generation, entry_key)
);

CREATE INDEX IF NOT EXISTS idx_entries_generation ON entries(generation);
"#;

/// SHA256 of the request key for stable, fixed-length keys.
fn entry_key(request: &Request) -> String {
  let mut hasher = Sha256::new();
  hasher.update(request.cache_key().as_bytes());
  hex::encode(hasher.finalize())
}

fn insert_entry(
  conn: &Connection,
  generation: &str,
  request: &Request,
  response: &Response,
) -> Result<()> {
  let headers = serde_json::to_string(&response.headers)
    .map_err(|e| eyre!("Failed to serialize headers: {}", e))?;

  conn
    .execute(
      "INSERT OR IGNORE INTO generations (name) VALUES (?)",
      params![generation],
    )
    .map_err(|e| eyre!("Failed to open generation {}: {}", generation, e))?;

  conn
    .execute(
      "INSERT OR REPLACE INTO entries
         (generation, entry_key, method, url, response_url, status, headers, body, cached_at)
       VALUES (?, ?, ?, ?, ?, ?, ?, ?, datetime('now'))",
      params![
        generation,
        entry_key(request),
        request.method.as_str(),
        request.url.as_str(),
        response.url,
        response.status,
        headers,
        response.body,
      ],
    )
    .map_err(|e| eyre!("Failed to store entry for {}: {}", request.url, e))?;

  Ok(())
}

impl CacheStorage for SqliteStorage {
  fn generation_names(&self) -> Result<Vec<String>> {
    let conn = self.lock()?;
    let mut stmt = conn
      .prepare("SELECT name FROM generations ORDER BY name")
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let names = stmt
      .query_map([], |row| row.get(0))
      .map_err(|e| eyre!("Failed to list generations: {}", e))?
      .collect::<rusqlite::Result<Vec<String>>>()
      .map_err(|e| eyre!("Failed to read generation name: {}", e))?;

    Ok(names)
  }

  fn has_generation(&self, name: &str) -> Result<bool> {
    let conn = self.lock()?;
    let found: Option<i64> = conn
      .query_row(
        "SELECT 1 FROM generations WHERE name = ?",
        params![name],
        |row| row.get(0),
      )
      .optional()
      .map_err(|e| eyre!("Failed to query generation {}: {}", name, e))?;
    Ok(found.is_some())
  }

  fn delete_generation(&self, name: &str) -> Result<bool> {
    let mut conn = self.lock()?;
    let tx = conn
      .transaction()
      .map_err(|e| eyre!("Failed to begin transaction: {}", e))?;

    tx.execute("DELETE FROM entries WHERE generation = ?", params![name])
      .map_err(|e| eyre!("Failed to delete entries of {}: {}", name, e))?;
    let removed = tx
      .execute("DELETE FROM generations WHERE name = ?", params![name])
      .map_err(|e| eyre!("Failed to delete generation {}: {}", name, e))?;

    tx.commit()
      .map_err(|e| eyre!("Failed to commit transaction: {}", e))?;

    Ok(removed > 0)
  }

  fn match_entry(&self, generation: &str, request: &Request) -> Result<Option<CachedEntry>> {
    let conn = self.lock()?;

    let row: Option<(String, u16, String, Vec<u8>, String)> = conn
      .query_row(
        "SELECT response_url, status, headers, body, cached_at FROM entries
         WHERE generation = ? AND entry_key = ?",
        params![generation, entry_key(request)],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
      )
      .optional()
      .map_err(|e| eyre!("Failed to look up {} in {}: {}", request.url, generation, e))?;

    match row {
      Some((url, status, headers, body, cached_at_str)) => {
        let headers: Vec<(String, String)> = serde_json::from_str(&headers)
          .map_err(|e| eyre!("Failed to deserialize headers: {}", e))?;
        let cached_at = parse_datetime(&cached_at_str)?;
        Ok(Some(CachedEntry {
          response: Response {
            url,
            status,
            headers,
            body,
          },
          cached_at,
        }))
      }
      None => Ok(None),
    }
  }

  fn put(&self, generation: &str, request: &Request, response: &Response) -> Result<()> {
    ensure_get(request)?;
    let conn = self.lock()?;
    insert_entry(&conn, generation, request, response)
  }

  fn put_all(&self, generation: &str, entries: &[(Request, Response)]) -> Result<()> {
    for (request, _) in entries {
      ensure_get(request)?;
    }

    let mut conn = self.lock()?;
    let tx = conn
      .transaction()
      .map_err(|e| eyre!("Failed to begin transaction: {}", e))?;

    tx.execute(
      "INSERT OR IGNORE INTO generations (name) VALUES (?)",
      params![generation],
    )
    .map_err(|e| eyre!("Failed to open generation {}: {}", generation, e))?;

    for (request, response) in entries {
      insert_entry(&tx, generation, request, response)?;
    }

    tx.commit()
      .map_err(|e| eyre!("Failed to commit transaction: {}", e))?;

    Ok(())
  }

  fn entry_count(&self, generation: &str) -> Result<usize> {
    let conn = self.lock()?;
    let count: i64 = conn
      .query_row(
        "SELECT COUNT(*) FROM entries WHERE generation = ?",
        params![generation],
        |row| row.get(0),
      )
      .map_err(|e| eyre!("Failed to count entries of {}: {}", generation, e))?;
    Ok(count as usize)
  }
}

/// Parse a datetime string from SQLite format.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
  // SQLite stores as "YYYY-MM-DD HH:MM:SS"
  chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
    .map(|dt| dt.and_utc())
    .map_err(|e| eyre!("Failed to parse datetime '{}': {}", s, e))
}
