//! Cache store trait and its SQLite and in-memory implementations.
//!
//! The store is namespaced by cache generation: every operation names
//! the generation it works in, and switching generations invalidates
//! previous entries wholesale via [`CacheStore::delete_generation`]
//! rather than per entry.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::entry::{CacheEntry, RequestKey};

/// Persistent key-value store for cached responses.
pub trait CacheStore: Send + Sync {
  /// Look up an entry in the given generation.
  fn get(&self, cache_name: &str, key: &RequestKey) -> Result<Option<CacheEntry>>;

  /// Write an entry, unconditionally replacing any prior entry for the
  /// same key (last-writer-wins).
  fn put(&self, cache_name: &str, key: &RequestKey, entry: &CacheEntry) -> Result<()>;

  /// Delete every entry in one generation.
  fn delete_generation(&self, cache_name: &str) -> Result<()>;

  /// List generation names starting with the given prefix.
  fn generations(&self, prefix: &str) -> Result<Vec<String>>;

  /// URLs of all entries in a generation, for cache statistics.
  fn urls(&self, cache_name: &str) -> Result<Vec<String>>;
}

/// SQLite-backed store. One table holds all generations; the generation
/// name is part of the primary key.
pub struct SqliteStore {
  conn: Mutex<Connection>,
}

const CACHE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS cache_entries (
    cache_name TEXT NOT NULL,
    request_key TEXT NOT NULL,
    url TEXT NOT NULL,
    status INTEGER NOT NULL,
    headers TEXT NOT NULL,
    body BLOB NOT NULL,
    stored_at TEXT NOT NULL,
    PRIMARY KEY (cache_name, request_key)
);

CREATE INDEX IF NOT EXISTS idx_cache_entries_name ON cache_entries(cache_name);
"#;

impl SqliteStore {
  /// Open or create the store at the default location.
  pub fn open() -> Result<Self> {
    Self::open_at(&Self::default_path()?)
  }

  /// Open or create the store at an explicit path.
  pub fn open_at(path: &Path) -> Result<Self> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    conn
      .execute_batch(CACHE_SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;

    Ok(Self {
      conn: Mutex::new(conn),
    })
  }

  fn default_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("ortocat").join("cache.db"))
  }

  fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
    self.conn.lock().map_err(|e| eyre!("Lock poisoned: {}", e))
  }
}

impl CacheStore for SqliteStore {
  fn get(&self, cache_name: &str, key: &RequestKey) -> Result<Option<CacheEntry>> {
    let conn = self.lock()?;

    let mut stmt = conn
      .prepare(
        "SELECT url, status, headers, body, stored_at FROM cache_entries
         WHERE cache_name = ? AND request_key = ?",
      )
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let row: Option<(String, u16, String, Vec<u8>, String)> = stmt
      .query_row(params![cache_name, key.as_str()], |row| {
        Ok((
          row.get(0)?,
          row.get(1)?,
          row.get(2)?,
          row.get(3)?,
          row.get(4)?,
        ))
      })
      .ok();

    match row {
      Some((url, status, headers, body, stored_at)) => {
        let headers: Vec<(String, String)> = serde_json::from_str(&headers)
          .map_err(|e| eyre!("Failed to parse cached headers: {}", e))?;
        let stored_at = parse_datetime(&stored_at)?;
        Ok(Some(CacheEntry {
          url,
          status,
          headers,
          body,
          stored_at,
        }))
      }
      None => Ok(None),
    }
  }

  fn put(&self, cache_name: &str, key: &RequestKey, entry: &CacheEntry) -> Result<()> {
    let conn = self.lock()?;
    let headers = serde_json::to_string(&entry.headers)
      .map_err(|e| eyre!("Failed to serialize headers: {}", e))?;

    conn
      .execute(
        "INSERT OR REPLACE INTO cache_entries
           (cache_name, request_key, url, status, headers, body, stored_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
        params![
          cache_name,
          key.as_str(),
          entry.url,
          entry.status,
          headers,
          entry.body,
          entry.stored_at.to_rfc3339(),
        ],
      )
      .map_err(|e| eyre!("Failed to store cache entry: {}", e))?;

    Ok(())
  }

  fn delete_generation(&self, cache_name: &str) -> Result<()> {
    let conn = self.lock()?;
    conn
      .execute(
        "DELETE FROM cache_entries WHERE cache_name = ?",
        params![cache_name],
      )
      .map_err(|e| eyre!("Failed to delete cache generation: {}", e))?;
    Ok(())
  }

  fn generations(&self, prefix: &str) -> Result<Vec<String>> {
    let conn = self.lock()?;
    let mut stmt = conn
      .prepare("SELECT DISTINCT cache_name FROM cache_entries WHERE cache_name LIKE ?")
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let names: Vec<String> = stmt
      .query_map(params![format!("{}%", prefix)], |row| row.get(0))
      .map_err(|e| eyre!("Failed to list cache generations: {}", e))?
      .filter_map(|r| r.ok())
      .collect();

    Ok(names)
  }

  fn urls(&self, cache_name: &str) -> Result<Vec<String>> {
    let conn = self.lock()?;
    let mut stmt = conn
      .prepare("SELECT url FROM cache_entries WHERE cache_name = ?")
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let urls: Vec<String> = stmt
      .query_map(params![cache_name], |row| row.get(0))
      .map_err(|e| eyre!("Failed to list cached urls: {}", e))?
      .filter_map(|r| r.ok())
      .collect();

    Ok(urls)
  }
}

/// In-memory store. Used by tests and by `--no-cache` runs where
/// nothing should touch disk.
#[derive(Default)]
pub struct MemoryStore {
  entries: Mutex<HashMap<(String, String), CacheEntry>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<(String, String), CacheEntry>>> {
    self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))
  }
}

impl CacheStore for MemoryStore {
  fn get(&self, cache_name: &str, key: &RequestKey) -> Result<Option<CacheEntry>> {
    let entries = self.lock()?;
    Ok(
      entries
        .get(&(cache_name.to_string(), key.as_str().to_string()))
        .cloned(),
    )
  }

  fn put(&self, cache_name: &str, key: &RequestKey, entry: &CacheEntry) -> Result<()> {
    let mut entries = self.lock()?;
    entries.insert(
      (cache_name.to_string(), key.as_str().to_string()),
      entry.clone(),
    );
    Ok(())
  }

  fn delete_generation(&self, cache_name: &str) -> Result<()> {
    let mut entries = self.lock()?;
    entries.retain(|(name, _), _| name != cache_name);
    Ok(())
  }

  fn generations(&self, prefix: &str) -> Result<Vec<String>> {
    let entries = self.lock()?;
    let mut names: Vec<String> = entries
      .keys()
      .map(|(name, _)| name.clone())
      .filter(|name| name.starts_with(prefix))
      .collect();
    names.sort();
    names.dedup();
    Ok(names)
  }

  fn urls(&self, cache_name: &str) -> Result<Vec<String>> {
    let entries = self.lock()?;
    Ok(
      entries
        .iter()
        .filter(|((name, _), _)| name == cache_name)
        .map(|(_, entry)| entry.url.clone())
        .collect(),
    )
  }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| eyre!("Failed to parse datetime '{}': {}", s, e))
}
