//! SQLite 案例库（sqlx 异步连接池）
//!
//! 连接池放在 `RwLock<Option<_>>` 里：由 ReconnectSupervisor 在后台建立 / 丢弃，
//! 请求路径只读取当前快照，断线时立即返回 `StoreError::Unavailable`。

use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tokio::sync::RwLock;

use super::case::{format_timestamp, parse_timestamp};
use super::{Case, CaseStore, StoreError};
use crate::config::StoreSection;

pub struct SqliteCaseStore {
    url: String,
    connect_timeout: Duration,
    max_connections: u32,
    pool: RwLock<Option<SqlitePool>>,
}

impl SqliteCaseStore {
    /// 只记录连接参数，不立即连接
    pub fn new(cfg: &StoreSection) -> Self {
        Self {
            url: cfg.url.clone(),
            connect_timeout: cfg.connect_timeout(),
            max_connections: cfg.max_connections.max(1),
            pool: RwLock::new(None),
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.pool.read().await.is_some()
    }

    /// 尝试建立连接并初始化表结构；成功后替换当前连接池
    pub async fn connect(&self) -> Result<(), StoreError> {
        let connecting = SqlitePoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.connect_timeout)
            .connect(&self.url);

        let pool = tokio::time::timeout(self.connect_timeout, connecting)
            .await
            .map_err(|_| StoreError::ConnectTimeout(self.connect_timeout))??;

        if let Err(e) = init_tables(&pool).await {
            pool.close().await;
            return Err(e);
        }

        let old = self.pool.write().await.replace(pool);
        if let Some(old) = old {
            old.close().await;
        }
        Ok(())
    }

    /// 检查当前连接是否仍可用
    pub async fn ping(&self) -> Result<(), StoreError> {
        let pool = self.current_pool().await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }

    /// 丢弃并关闭当前连接池
    pub async fn disconnect(&self) {
        let old = self.pool.write().await.take();
        if let Some(pool) = old {
            pool.close().await;
        }
    }

    async fn current_pool(&self) -> Result<SqlitePool, StoreError> {
        self.pool
            .read()
            .await
            .clone()
            .ok_or(StoreError::Unavailable)
    }
}

async fn init_tables(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS cases (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT NOT NULL UNIQUE,
            log_error TEXT NOT NULL,
            report TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            archived INTEGER NOT NULL DEFAULT 0
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_cases_created_at ON cases(created_at)")
        .execute(pool)
        .await?;

    Ok(())
}

fn case_from_row(row: &SqliteRow) -> Result<Case, StoreError> {
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;
    Ok(Case {
        id: row.try_get("id")?,
        log_error: row.try_get("log_error")?,
        report: row.try_get("report")?,
        created_at: parse_timestamp(&created_at)
            .map_err(|e| StoreError::Corrupt(format!("created_at {created_at:?}: {e}")))?,
        updated_at: parse_timestamp(&updated_at)
            .map_err(|e| StoreError::Corrupt(format!("updated_at {updated_at:?}: {e}")))?,
        archived: row.try_get("archived")?,
    })
}

#[async_trait]
impl CaseStore for SqliteCaseStore {
    async fn save(&self, log_error: &str, report: &str) -> Result<Case, StoreError> {
        let pool = self.current_pool().await?;
        let case = Case::new(log_error, report);

        sqlx::query(
            "INSERT INTO cases (id, log_error, report, created_at, updated_at, archived)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&case.id)
        .bind(&case.log_error)
        .bind(&case.report)
        .bind(format_timestamp(&case.created_at))
        .bind(format_timestamp(&case.updated_at))
        .bind(case.archived)
        .execute(&pool)
        .await?;

        Ok(case)
    }

    async fn list_newest_first(&self) -> Result<Vec<Case>, StoreError> {
        let pool = self.current_pool().await?;
        let rows = sqlx::query(
            "SELECT id, log_error, report, created_at, updated_at, archived
             FROM cases
             ORDER BY created_at DESC, seq DESC",
        )
        .fetch_all(&pool)
        .await?;

        rows.iter().map(case_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> SqliteCaseStore {
        let path = dir.path().join("cases.db");
        SqliteCaseStore::new(&StoreSection {
            url: format!("sqlite:{}?mode=rwc", path.display()),
            connect_timeout_secs: 2,
            ..StoreSection::default()
        })
    }

    #[tokio::test]
    async fn test_requests_fail_fast_before_connect() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(!store.is_connected().await);
        assert!(matches!(
            store.save("log", "report").await,
            Err(StoreError::Unavailable)
        ));
        assert!(matches!(
            store.list_newest_first().await,
            Err(StoreError::Unavailable)
        ));
    }

    #[tokio::test]
    async fn test_save_and_list_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.connect().await.unwrap();
        store.ping().await.unwrap();

        let saved = store
            .save("ERROR connection reset", "The peer closed the socket.")
            .await
            .unwrap();
        let cases = store.list_newest_first().await.unwrap();
        assert_eq!(cases, vec![saved]);
    }

    #[tokio::test]
    async fn test_empty_store_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.connect().await.unwrap();
        assert!(store.list_newest_first().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_newest_first_and_no_dedup() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.connect().await.unwrap();

        let first = store.save("same log", "same report").await.unwrap();
        let second = store.save("same log", "same report").await.unwrap();
        let third = store.save("other log", "other report").await.unwrap();

        let ids: Vec<String> = store
            .list_newest_first()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    #[tokio::test]
    async fn test_cases_survive_reconnect() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.connect().await.unwrap();
        store.save("log", "report").await.unwrap();

        store.disconnect().await;
        assert!(matches!(store.ping().await, Err(StoreError::Unavailable)));

        store.connect().await.unwrap();
        assert_eq!(store.list_newest_first().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_connect_fails_for_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("cases.db");
        let store = SqliteCaseStore::new(&StoreSection {
            url: format!("sqlite:{}?mode=rwc", path.display()),
            connect_timeout_secs: 2,
            ..StoreSection::default()
        });
        assert!(store.connect().await.is_err());
        assert!(!store.is_connected().await);
    }
}
