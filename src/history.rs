//! Analysis History Store
//!
//! Embedded SQLite record store for completed risk scans. The analytics core
//! only ever consumes this surface: save, query, delete, purge, stats. The
//! identity attached to a record is an opaque label supplied by the caller;
//! credential handling lives elsewhere.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, params_from_iter, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::risk::RiskTier;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: i64,
    pub username: String,
    pub asset: String,
    pub risk_tier: String,
    pub volatility: f64,
    pub timestamp: String,
    pub note: String,
}

#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    pub user: Option<String>,
    pub asset: Option<String>,
}

impl HistoryFilter {
    pub fn for_user(user: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
            asset: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct StoreStats {
    pub user_count: u64,
    pub record_count: u64,
}

#[derive(Clone)]
pub struct HistoryStore {
    conn: Arc<Mutex<Connection>>,
}

impl HistoryStore {
    pub fn new(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path).context("open history db")?;
        conn.pragma_update(None, "journal_mode", "WAL").ok();
        conn.pragma_update(None, "synchronous", "NORMAL").ok();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                username TEXT PRIMARY KEY
            )",
            [],
        )?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL,
                asset TEXT NOT NULL,
                risk_tier TEXT NOT NULL,
                volatility REAL NOT NULL,
                timestamp TEXT NOT NULL,
                note TEXT NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_history_user ON history(username, id DESC)",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Save one completed scan and return its record id. The username is
    /// registered on the side so `get_stats` can count distinct users.
    pub fn save_record(
        &self,
        user: &str,
        asset: &str,
        tier: RiskTier,
        volatility: f64,
        note: &str,
    ) -> Result<i64> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR IGNORE INTO users (username) VALUES (?1)",
            params![user],
        )?;
        conn.execute(
            "INSERT INTO history (username, asset, risk_tier, volatility, timestamp, note)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user,
                asset,
                tier.as_str(),
                volatility,
                Utc::now().to_rfc3339(),
                note
            ],
        )
        .context("insert history record")?;
        Ok(conn.last_insert_rowid())
    }

    /// Most recent records first, optionally narrowed by user and/or asset.
    pub fn query_records(&self, filter: &HistoryFilter) -> Result<Vec<HistoryRecord>> {
        let mut sql = String::from(
            "SELECT id, username, asset, risk_tier, volatility, timestamp, note FROM history",
        );
        let mut clauses: Vec<&str> = Vec::new();
        let mut args: Vec<String> = Vec::new();
        if let Some(user) = &filter.user {
            clauses.push("username = ?");
            args.push(user.clone());
        }
        if let Some(asset) = &filter.asset {
            clauses.push("asset = ?");
            args.push(asset.clone());
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY id DESC");

        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(&sql)?;
        let records = stmt
            .query_map(params_from_iter(args.iter()), Self::row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Delete one record; returns whether anything was removed.
    pub fn delete_record(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock();
        let changed = conn.execute("DELETE FROM history WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    /// Remove every record; returns how many were purged. Registered users
    /// are kept so stats remain meaningful.
    pub fn purge_all(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let purged = conn.execute("DELETE FROM history", [])?;
        Ok(purged)
    }

    pub fn get_stats(&self) -> Result<StoreStats> {
        let conn = self.conn.lock();
        let user_count: i64 =
            conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        let record_count: i64 =
            conn.query_row("SELECT COUNT(*) FROM history", [], |row| row.get(0))?;
        Ok(StoreStats {
            user_count: user_count.max(0) as u64,
            record_count: record_count.max(0) as u64,
        })
    }

    fn row_to_record(row: &Row<'_>) -> rusqlite::Result<HistoryRecord> {
        Ok(HistoryRecord {
            id: row.get(0)?,
            username: row.get(1)?,
            asset: row.get(2)?,
            risk_tier: row.get(3)?,
            volatility: row.get(4)?,
            timestamp: row.get(5)?,
            note: row.get(6)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, HistoryStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = HistoryStore::new(&dir.path().join("history.db")).expect("open store");
        (dir, store)
    }

    #[test]
    fn test_save_and_query_roundtrip() {
        let (_dir, store) = store();
        store
            .save_record("alice", "Bitcoin", RiskTier::Moderate, 0.55, "Auto-Log: Risk Scan")
            .expect("save");
        store
            .save_record("bob", "Tether", RiskTier::Stable, 0.01, "")
            .expect("save");

        let all = store.query_records(&HistoryFilter::default()).expect("query");
        assert_eq!(all.len(), 2);
        // Most recent first.
        assert_eq!(all[0].username, "bob");

        let alice = store
            .query_records(&HistoryFilter::for_user("alice"))
            .expect("query");
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].asset, "Bitcoin");
        assert_eq!(alice[0].risk_tier, "MODERATE");
    }

    #[test]
    fn test_filter_by_asset() {
        let (_dir, store) = store();
        store
            .save_record("alice", "Bitcoin", RiskTier::Critical, 0.9, "")
            .expect("save");
        store
            .save_record("alice", "Solana", RiskTier::Moderate, 0.5, "")
            .expect("save");

        let filter = HistoryFilter {
            user: Some("alice".to_string()),
            asset: Some("Solana".to_string()),
        };
        let records = store.query_records(&filter).expect("query");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].asset, "Solana");
    }

    #[test]
    fn test_delete_and_purge() {
        let (_dir, store) = store();
        let id = store
            .save_record("alice", "Bitcoin", RiskTier::Stable, 0.2, "")
            .expect("save");
        store
            .save_record("alice", "Tron", RiskTier::Stable, 0.3, "")
            .expect("save");

        assert!(store.delete_record(id).expect("delete"));
        assert!(!store.delete_record(id).expect("delete again"), "second delete is a no-op");

        let purged = store.purge_all().expect("purge");
        assert_eq!(purged, 1);
        assert!(store
            .query_records(&HistoryFilter::default())
            .expect("query")
            .is_empty());
    }

    #[test]
    fn test_stats_count_distinct_users() {
        let (_dir, store) = store();
        for _ in 0..3 {
            store
                .save_record("alice", "Bitcoin", RiskTier::Stable, 0.1, "")
                .expect("save");
        }
        store
            .save_record("bob", "Solana", RiskTier::Moderate, 0.5, "")
            .expect("save");

        let stats = store.get_stats().expect("stats");
        assert_eq!(stats.user_count, 2);
        assert_eq!(stats.record_count, 4);
    }
}
