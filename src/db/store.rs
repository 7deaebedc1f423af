use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Durable store for sessions, per-tick deltas and periodic world
/// snapshots, keyed by `(session_id, tick_number)`.
///
/// Concurrent sessions may share one database; every query is scoped by
/// session id. `save_step` is the only multi-row write and runs in a
/// single transaction, so a crash can never persist a partial tick.
#[derive(Debug, Clone)]
pub struct SessionStore {
    pool: SqlitePool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionMeta {
    pub id: String,
    pub name: String,
    pub created_at: f64,
}

impl SessionStore {
    /// Open (creating if missing) the database at `url` and run the
    /// schema DDL. `sqlite::memory:` gives an in-process throwaway store.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::raw_sql(include_str!("../../sql/schema.sql"))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn create_session(
        &self,
        name: &str,
        config_json: &str,
    ) -> Result<String, sqlx::Error> {
        let session_id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO sessions (id, created_at, name, config_json) VALUES (?, ?, ?, ?)")
            .bind(&session_id)
            .bind(unix_time())
            .bind(name)
            .bind(config_json)
            .execute(&self.pool)
            .await?;
        Ok(session_id)
    }

    pub async fn session_meta(&self, session_id: &str) -> Result<Option<SessionMeta>, sqlx::Error> {
        let row = sqlx::query("SELECT id, name, created_at FROM sessions WHERE id = ?")
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| SessionMeta {
            id: r.get("id"),
            name: r.get("name"),
            created_at: r.get("created_at"),
        }))
    }

    pub async fn session_config(&self, session_id: &str) -> Result<Option<String>, sqlx::Error> {
        let row = sqlx::query("SELECT config_json FROM sessions WHERE id = ?")
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get("config_json")))
    }

    /// Record one advanced tick: the tick row, the delta (if any) and the
    /// snapshot (on snapshot boundaries), all in one transaction.
    pub async fn save_step(
        &self,
        session_id: &str,
        tick: i64,
        delta_json: Option<&str>,
        snapshot_json: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("INSERT INTO ticks (session_id, tick_number, timestamp) VALUES (?, ?, ?)")
            .bind(session_id)
            .bind(tick)
            .bind(unix_time())
            .execute(&mut *tx)
            .await?;
        if let Some(delta_json) = delta_json {
            sqlx::query("INSERT INTO deltas (session_id, tick_number, delta_json) VALUES (?, ?, ?)")
                .bind(session_id)
                .bind(tick)
                .bind(delta_json)
                .execute(&mut *tx)
                .await?;
        }
        if let Some(world_json) = snapshot_json {
            sqlx::query(
                "INSERT INTO snapshots (session_id, tick_number, world_json) VALUES (?, ?, ?)",
            )
            .bind(session_id)
            .bind(tick)
            .bind(world_json)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await
    }

    pub async fn latest_tick(&self, session_id: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COALESCE(MAX(tick_number), 0) FROM ticks WHERE session_id = ?")
            .bind(session_id)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn tick_range(&self, session_id: &str) -> Result<(i64, i64), sqlx::Error> {
        let row = sqlx::query(
            "SELECT COALESCE(MIN(tick_number), 0) AS lo, COALESCE(MAX(tick_number), 0) AS hi \
             FROM ticks WHERE session_id = ?",
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await?;
        Ok((row.get("lo"), row.get("hi")))
    }

    pub async fn snapshot_at(
        &self,
        session_id: &str,
        tick: i64,
    ) -> Result<Option<String>, sqlx::Error> {
        let row = sqlx::query(
            "SELECT world_json FROM snapshots WHERE session_id = ? AND tick_number = ?",
        )
        .bind(session_id)
        .bind(tick)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| r.get("world_json")))
    }

    /// The newest snapshot at or before `tick`, the replay starting
    /// point for load-at-tick.
    pub async fn latest_snapshot_at_or_before(
        &self,
        session_id: &str,
        tick: i64,
    ) -> Result<Option<(i64, String)>, sqlx::Error> {
        let row = sqlx::query(
            "SELECT tick_number, world_json FROM snapshots \
             WHERE session_id = ? AND tick_number <= ? \
             ORDER BY tick_number DESC LIMIT 1",
        )
        .bind(session_id)
        .bind(tick)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| (r.get("tick_number"), r.get("world_json"))))
    }

    /// Deltas for ticks in `[lo, hi]`, ascending.
    pub async fn deltas_in(
        &self,
        session_id: &str,
        lo: i64,
        hi: i64,
    ) -> Result<Vec<(i64, String)>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT tick_number, delta_json FROM deltas \
             WHERE session_id = ? AND tick_number >= ? AND tick_number <= ? \
             ORDER BY tick_number",
        )
        .bind(session_id)
        .bind(lo)
        .bind(hi)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| (r.get("tick_number"), r.get("delta_json")))
            .collect())
    }

    /// At most `max_points` snapshots, uniformly subsampled across the
    /// session's history. Used for charting long runs.
    pub async fn sampled_snapshots(
        &self,
        session_id: &str,
        max_points: usize,
    ) -> Result<Vec<(i64, String)>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT tick_number, world_json FROM snapshots \
             WHERE session_id = ? ORDER BY tick_number",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;
        let all: Vec<(i64, String)> = rows
            .into_iter()
            .map(|r| (r.get("tick_number"), r.get("world_json")))
            .collect();

        if max_points == 0 || all.is_empty() {
            return Ok(Vec::new());
        }
        if all.len() <= max_points {
            return Ok(all);
        }
        let mut sampled = Vec::with_capacity(max_points);
        let mut last_index = usize::MAX;
        for i in 0..max_points {
            let index = i * (all.len() - 1) / (max_points - 1).max(1);
            if index != last_index {
                sampled.push(all[index].clone());
                last_index = index;
            }
        }
        Ok(sampled)
    }
}

fn unix_time() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
