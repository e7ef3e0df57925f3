//! Persistent RPC overrides, one URL per pin key

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection};

use super::KeyValueStore;

/// SQLite-backed override store
#[derive(Debug)]
pub struct PinStore {
    conn: Mutex<Connection>,
}

impl PinStore {
    /// Open or create the pin database
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).with_context(|| format!("open db {}", path.display()))?;
        Self::with_connection(conn)
    }

    /// Throwaway store, mostly for tests
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory db")?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS pins (
                key         TEXT PRIMARY KEY,
                url         TEXT NOT NULL,
                updated_at  INTEGER DEFAULT (strftime('%s', 'now'))
            );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// All pinned URLs, ordered by key
    pub fn load_all(&self) -> Result<BTreeMap<String, String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT key, url FROM pins ORDER BY key")?;
        let mut rows = stmt.query([])?;
        let mut out = BTreeMap::new();
        while let Some(row) = rows.next()? {
            let key: String = row.get(0)?;
            let url: String = row.get(1)?;
            out.insert(key, url);
        }
        Ok(out)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| anyhow!("pin store lock poisoned"))
    }
}

impl KeyValueStore for PinStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT url FROM pins WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.execute(
            "INSERT INTO pins(key, url) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET url=excluded.url, updated_at=strftime('%s', 'now')",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?
            .execute("DELETE FROM pins WHERE key = ?1", params![key])?;
        Ok(())
    }
}
