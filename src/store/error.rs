use std::time::Duration;

use thiserror::Error;

/// 案例库操作错误；编排层只记录日志，不向调用方暴露
#[derive(Error, Debug)]
pub enum StoreError {
    /// 当前没有可用连接（后台仍在重连），请求直接失败而不等待
    #[error("case store is not connected")]
    Unavailable,

    #[error("case store connection attempt timed out after {0:?}")]
    ConnectTimeout(Duration),

    #[error("case store database error: {0}")]
    Database(#[from] sqlx::Error),

    /// 行数据无法还原为 Case
    #[error("corrupt case record: {0}")]
    Corrupt(String),
}
