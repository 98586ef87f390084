//! 内存案例库：进程内 Vec，可切换为「不可用」以模拟数据库断线

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Case, CaseStore, StoreError};

#[derive(Debug)]
pub struct MemoryCaseStore {
    cases: RwLock<Vec<Case>>,
    available: AtomicBool,
}

impl MemoryCaseStore {
    pub fn new() -> Self {
        Self {
            cases: RwLock::new(Vec::new()),
            available: AtomicBool::new(true),
        }
    }

    /// 创建一个始终不可用的实例
    pub fn unavailable() -> Self {
        let store = Self::new();
        store.set_available(false);
        store
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.cases.read().await.len()
    }

    /// 直接插入一条现成的 Case（测试用来构造时间顺序）
    pub async fn insert(&self, case: Case) {
        self.cases.write().await.push(case);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable)
        }
    }
}

impl Default for MemoryCaseStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CaseStore for MemoryCaseStore {
    async fn save(&self, log_error: &str, report: &str) -> Result<Case, StoreError> {
        self.check_available()?;
        let case = Case::new(log_error, report);
        self.cases.write().await.push(case.clone());
        Ok(case)
    }

    async fn list_newest_first(&self) -> Result<Vec<Case>, StoreError> {
        self.check_available()?;
        // 先反转再稳定排序：同一时间戳时后插入的排在前面
        let mut cases: Vec<Case> = self.cases.read().await.iter().rev().cloned().collect();
        cases.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(cases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn case_at(secs: i64, log: &str) -> Case {
        let ts = Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap();
        Case {
            created_at: ts,
            updated_at: ts,
            ..Case::new(log, "report")
        }
    }

    #[tokio::test]
    async fn test_empty_store_lists_nothing() {
        let store = MemoryCaseStore::new();
        assert!(store.list_newest_first().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_newest_first() {
        let store = MemoryCaseStore::new();
        store.insert(case_at(10, "middle")).await;
        store.insert(case_at(20, "newest")).await;
        store.insert(case_at(0, "oldest")).await;

        let logs: Vec<String> = store
            .list_newest_first()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.log_error)
            .collect();
        assert_eq!(logs, vec!["newest", "middle", "oldest"]);
    }

    #[tokio::test]
    async fn test_identical_saves_create_distinct_cases() {
        let store = MemoryCaseStore::new();
        let a = store.save("same log", "same report").await.unwrap();
        let b = store.save("same log", "same report").await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_unavailable_fails_fast() {
        let store = MemoryCaseStore::unavailable();
        assert!(matches!(
            store.save("log", "report").await,
            Err(StoreError::Unavailable)
        ));
        assert!(matches!(
            store.list_newest_first().await,
            Err(StoreError::Unavailable)
        ));
        assert_eq!(store.len().await, 0);

        store.set_available(true);
        assert!(store.save("log", "report").await.is_ok());
    }
}
