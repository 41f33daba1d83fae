use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::Mutex;

use crate::slug::slugify;

/// TTL'd key-value cache for finished reports, backed by sqlite. Values are
/// stored as JSON blobs; the key space is flat (`niche:{slug}`,
/// `channel:{id}`).
pub struct ReportCache {
    conn: Mutex<Connection>,
}

impl ReportCache {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let cache = Self {
            conn: Mutex::new(conn),
        };
        cache.init_schema()?;
        Ok(cache)
    }

    fn init_schema(&self) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS cache_entries (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                expires_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_cache_expires ON cache_entries(expires_at);
        ",
        )?;
        Ok(())
    }

    /// Fetch a live entry. Expired rows are deleted on the way out and
    /// reported as a miss.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> anyhow::Result<Option<T>> {
        let conn = self.conn.lock().unwrap();
        let row: Option<(String, i64)> = conn
            .query_row(
                "SELECT value, expires_at FROM cache_entries WHERE key = ?1",
                [key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((value, expires_at)) = row else {
            return Ok(None);
        };

        if expires_at <= Utc::now().timestamp() {
            conn.execute("DELETE FROM cache_entries WHERE key = ?1", [key])?;
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(&value)?))
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T, ttl_secs: i64) -> anyhow::Result<()> {
        let payload = serde_json::to_string(value)?;
        let expires_at = Utc::now().timestamp() + ttl_secs;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO cache_entries (key, value, expires_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = ?2, expires_at = ?3",
            rusqlite::params![key, payload, expires_at],
        )?;
        Ok(())
    }
}

pub fn niche_key(topic: &str) -> String {
    format!("niche:{}", slugify(topic))
}

pub fn channel_key(channel_id: &str) -> String {
    format!("channel:{}", channel_id)
}
