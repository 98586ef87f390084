//! 案例存储接口
//!
//! 定义统一的案例读写接口，支持内存和 SQLite 两种实现

use async_trait::async_trait;

use super::{Case, StoreError};

#[async_trait]
pub trait CaseStore: Send + Sync {
    /// 原子地创建一条 Case（logError 与 report 同时写入）；重复内容也会生成新记录
    async fn save(&self, log_error: &str, report: &str) -> Result<Case, StoreError>;

    /// 按 createdAt 倒序返回全部案例；空库返回空 Vec
    async fn list_newest_first(&self) -> Result<Vec<Case>, StoreError>;
}
