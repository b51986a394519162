//! Favorites and small settings persisted between runs.

use std::net::IpAddr;

use chrono::{DateTime, Duration, Utc};
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::schema::{DARK_MODE_KEY, IP_CACHE_KEY};
use super::Database;

#[derive(Serialize, Deserialize)]
struct CachedIp {
  ip: IpAddr,
  timestamp: DateTime<Utc>,
}

impl Database {
  /// Favorited card URLs, oldest first.
  pub fn favorites(&self) -> Result<Vec<String>> {
    let mut stmt = self
      .conn()
      .prepare("SELECT url FROM favorites ORDER BY position")
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let urls = stmt
      .query_map([], |row| row.get(0))
      .map_err(|e| eyre!("Failed to load favorites: {}", e))?
      .collect::<rusqlite::Result<Vec<String>>>()
      .map_err(|e| eyre!("Failed to read favorite: {}", e))?;

    Ok(urls)
  }

  pub fn is_favorite(&self, url: &str) -> Result<bool> {
    let found: Option<i64> = self
      .conn()
      .query_row("SELECT 1 FROM favorites WHERE url = ?", params![url], |row| {
        row.get(0)
      })
      .optional()
      .map_err(|e| eyre!("Failed to query favorite: {}", e))?;
    Ok(found.is_some())
  }

  /// Add or remove a favorite. Returns the new state.
  pub fn toggle_favorite(&self, url: &str) -> Result<bool> {
    if self.is_favorite(url)? {
      self
        .conn()
        .execute("DELETE FROM favorites WHERE url = ?", params![url])
        .map_err(|e| eyre!("Failed to remove favorite: {}", e))?;
      return Ok(false);
    }

    self
      .conn()
      .execute(
        "INSERT INTO favorites (url, position)
         VALUES (?, (SELECT COALESCE(MAX(position), -1) + 1 FROM favorites))",
        params![url],
      )
      .map_err(|e| eyre!("Failed to add favorite: {}", e))?;
    Ok(true)
  }

  pub fn dark_mode(&self) -> Result<bool> {
    Ok(self.preference(DARK_MODE_KEY)?.as_deref() == Some("enabled"))
  }

  pub fn set_dark_mode(&self, enabled: bool) -> Result<()> {
    let value = if enabled { "enabled" } else { "disabled" };
    self.set_preference(DARK_MODE_KEY, value)
  }

  /// Cached client IP, if it is younger than `max_age`.
  pub fn cached_ip(&self, max_age: Duration) -> Result<Option<IpAddr>> {
    let Some(raw) = self.preference(IP_CACHE_KEY)? else {
      return Ok(None);
    };

    let cached: CachedIp = match serde_json::from_str(&raw) {
      Ok(cached) => cached,
      Err(e) => {
        tracing::warn!("invalid IP cache entry: {e}");
        return Ok(None);
      }
    };

    if Utc::now() - cached.timestamp < max_age {
      Ok(Some(cached.ip))
    } else {
      Ok(None)
    }
  }

  pub fn store_ip(&self, ip: IpAddr) -> Result<()> {
    self.store_ip_at(ip, Utc::now())
  }

  fn store_ip_at(&self, ip: IpAddr, timestamp: DateTime<Utc>) -> Result<()> {
    let value = serde_json::to_string(&CachedIp { ip, timestamp })
      .map_err(|e| eyre!("Failed to serialize IP cache: {}", e))?;
    self.set_preference(IP_CACHE_KEY, &value)
  }

  fn preference(&self, key: &str) -> Result<Option<String>> {
    self
      .conn()
      .query_row(
        "SELECT value FROM preferences WHERE key = ?",
        params![key],
        |row| row.get(0),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read preference {}: {}", key, e))
  }

  fn set_preference(&self, key: &str, value: &str) -> Result<()> {
    self
      .conn()
      .execute(
        "INSERT OR REPLACE INTO preferences (key, value, updated_at)
         VALUES (?, ?, datetime('now'))",
        params![key, value],
      )
      .map_err(|e| eyre!("Failed to write preference {}: {}", key, e))?;
    Ok(())
  }
}
