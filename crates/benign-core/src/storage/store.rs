use anyhow::Context;
use rusqlite::{params, Connection};
use serde::Serialize;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Audit log of stage runs and every vendor call attempt.
#[derive(Clone)]
pub struct Store {
    pub conn: Arc<Mutex<Connection>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptRow {
    pub item_id: String,
    pub model: String,
    pub attempt_no: u32,
    pub status: String,
    pub latency_ms: Option<u64>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub id: i64,
    pub stage: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub status: String,
    pub attempts: u64,
    pub failed_attempts: u64,
}

pub struct StoreStats {
    pub runs: Option<u64>,
    pub attempts: Option<u64>,
    pub last_run_id: Option<i64>,
    pub last_run_at: Option<String>,
}

impl Store {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let conn = Connection::open(path).context("failed to open sqlite db")?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory sqlite db")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// `:memory:` opens an in-memory database.
    pub fn open_configured(db: &str) -> anyhow::Result<Self> {
        if db == ":memory:" {
            Self::memory()
        } else {
            Self::open(Path::new(db))
        }
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("store connection lock poisoned"))
    }

    pub fn init_schema(&self) -> anyhow::Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(crate::storage::schema::DDL)?;
        Ok(())
    }

    pub fn create_run(&self, stage: &str, config_fingerprint: &str) -> anyhow::Result<i64> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO runs(stage, started_at, status, config_fingerprint) VALUES (?1, ?2, ?3, ?4)",
            params![stage, chrono::Utc::now().to_rfc3339(), "running", config_fingerprint],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn finalize_run(&self, run_id: i64, status: &str) -> anyhow::Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "UPDATE runs SET status=?1, finished_at=?2 WHERE id=?3",
            params![status, chrono::Utc::now().to_rfc3339(), run_id],
        )?;
        Ok(())
    }

    pub fn insert_attempt(&self, run_id: i64, a: &AttemptRow) -> anyhow::Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO attempts(run_id, item_id, model, attempt_no, status, latency_ms, error, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                run_id,
                a.item_id,
                a.model,
                a.attempt_no as i64,
                a.status,
                a.latency_ms.map(|v| v as i64),
                a.error,
                chrono::Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }

    pub fn attempts_for_run(&self, run_id: i64) -> anyhow::Result<Vec<AttemptRow>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT item_id, model, attempt_no, status, latency_ms, error
             FROM attempts WHERE run_id = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![run_id], |row| {
            Ok(AttemptRow {
                item_id: row.get(0)?,
                model: row.get(1)?,
                attempt_no: row.get::<_, i64>(2)? as u32,
                status: row.get(3)?,
                latency_ms: row.get::<_, Option<i64>>(4)?.map(|v| v as u64),
                error: row.get(5)?,
            })
        })?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    pub fn recent_runs(&self, limit: u32) -> anyhow::Result<Vec<RunSummary>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT r.id, r.stage, r.started_at, r.finished_at, r.status,
                    COUNT(a.id),
                    COALESCE(SUM(CASE WHEN a.status != 'ok' THEN 1 ELSE 0 END), 0)
             FROM runs r LEFT JOIN attempts a ON a.run_id = r.id
             GROUP BY r.id
             ORDER BY r.id DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok(RunSummary {
                id: row.get(0)?,
                stage: row.get(1)?,
                started_at: row.get(2)?,
                finished_at: row.get(3)?,
                status: row.get(4)?,
                attempts: row.get::<_, i64>(5)? as u64,
                failed_attempts: row.get::<_, i64>(6)? as u64,
            })
        })?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    pub fn stats_best_effort(&self) -> anyhow::Result<StoreStats> {
        let conn = self.lock()?;

        let count = |table: &str| -> Option<u64> {
            conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| {
                r.get::<_, i64>(0).map(|x| x as u64)
            })
            .ok()
        };
        let runs = count("runs");
        let attempts = count("attempts");

        let last: Option<(i64, String)> = conn
            .query_row(
                "SELECT id, started_at FROM runs ORDER BY id DESC LIMIT 1",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .ok();

        Ok(StoreStats {
            runs,
            attempts,
            last_run_id: last.as_ref().map(|(id, _)| *id),
            last_run_at: last.map(|(_, s)| s),
        })
    }
}
