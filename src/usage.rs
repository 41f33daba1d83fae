use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Mutex;

use crate::config::ANON_ANALYSIS_LIMIT;

/// Outcome of a quota check. `ip_hash` is carried forward so the caller can
/// record the completed analysis without re-hashing.
#[derive(Debug, Clone)]
pub struct UsageCheck {
    pub allowed: bool,
    pub analyses_used: u32,
    pub ip_hash: String,
}

/// Anonymous per-client trial counter. Clients are identified only by a
/// SHA-256 hash of their address; the raw address never touches storage.
pub struct UsageGate {
    conn: Mutex<Connection>,
}

impl UsageGate {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let gate = Self {
            conn: Mutex::new(conn),
        };
        gate.init_schema()?;
        Ok(gate)
    }

    fn init_schema(&self) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS anon_usage (
                ip_hash TEXT PRIMARY KEY,
                analyses_used INTEGER NOT NULL DEFAULT 0,
                updated_at TEXT NOT NULL
            );
        ",
        )?;
        Ok(())
    }

    pub fn check(&self, client_ip: &str) -> anyhow::Result<UsageCheck> {
        let ip_hash = hash_ip(client_ip);
        let conn = self.conn.lock().unwrap();
        let analyses_used: u32 = conn
            .query_row(
                "SELECT analyses_used FROM anon_usage WHERE ip_hash = ?1",
                [&ip_hash],
                |row| row.get(0),
            )
            .optional()?
            .unwrap_or(0);

        Ok(UsageCheck {
            allowed: analyses_used < ANON_ANALYSIS_LIMIT,
            analyses_used,
            ip_hash,
        })
    }

    pub fn record(&self, ip_hash: &str, new_count: u32) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO anon_usage (ip_hash, analyses_used, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(ip_hash) DO UPDATE SET analyses_used = ?2, updated_at = ?3",
            rusqlite::params![ip_hash, new_count, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

pub fn hash_ip(ip: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(ip.trim().as_bytes());
    hex::encode(hasher.finalize())
}
