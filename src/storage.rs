use crate::dlog;
use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::HashMap;
use std::path::Path;

/// Key under which the workout list is stored.
pub const WORKOUTS_KEY: &str = "workout";

/// Flat string key/value store. No transactions across keys.
pub trait KeyValueStore {
    fn save(&mut self, key: &str, value: &str) -> Result<()>;
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Key/value pairs in a single SQLite table.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let display = path.display();
        let conn =
            Connection::open(path).with_context(|| format!("Opening SQLite DB: {display}"))?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Opening in-memory SQLite DB")?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        if !table_exists(&conn, "kv_store")? {
            tracing::info!("creating kv_store table");
        }
        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS kv_store (
              key         text PRIMARY KEY,
              value       text NOT NULL,
              updated_at  text NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            ",
        )
        .context("Ensuring kv_store schema")?;
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteStore {
    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                r"
                INSERT INTO kv_store (key, value, updated_at)
                VALUES (?1, ?2, CURRENT_TIMESTAMP)
                ON CONFLICT (key) DO UPDATE SET
                  value = excluded.value,
                  updated_at = CURRENT_TIMESTAMP
                ",
                params![key, value],
            )
            .with_context(|| format!("Saving key {key:?}"))?;
        dlog!("kv_save key={key} bytes={}", value.len());
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("Loading key {key:?}"))
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let n = self
            .conn
            .execute("DELETE FROM kv_store WHERE key = ?1", params![key])
            .with_context(|| format!("Removing key {key:?}"))?;
        dlog!("kv_remove key={key} removed={n}");
        Ok(())
    }
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let mut stmt =
        conn.prepare("SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1 LIMIT 1")?;
    let mut rows = stmt.query([table])?;
    Ok(rows.next()?.is_some())
}

/// Non-durable store, used by `--ephemeral` and in tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}
