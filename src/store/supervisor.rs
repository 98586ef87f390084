//! 案例库重连监管
//!
//! 进程启动时 spawn，按固定间隔维护连接：断开时重连，连上后定期 ping，失败即丢弃连接池。
//! 取消 token 后关闭连接池并退出；请求线程从不等待这个循环。

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::SqliteCaseStore;

pub struct ReconnectSupervisor {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl ReconnectSupervisor {
    pub fn spawn(
        store: Arc<SqliteCaseStore>,
        interval: Duration,
        token: CancellationToken,
    ) -> Self {
        let handle = tokio::spawn(run(store, interval, token.clone()));
        Self { token, handle }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// 停止监管并等待后台任务退出
    pub async fn shutdown(self) {
        self.token.cancel();
        if let Err(e) = self.handle.await {
            tracing::warn!("case store supervisor ended abnormally: {}", e);
        }
    }
}

async fn run(store: Arc<SqliteCaseStore>, interval: Duration, token: CancellationToken) {
    loop {
        if store.is_connected().await {
            if let Err(e) = store.ping().await {
                tracing::warn!("case store connection lost: {}", e);
                store.disconnect().await;
            }
        } else {
            match store.connect().await {
                Ok(()) => tracing::info!("case store connected"),
                Err(e) => tracing::warn!(
                    "case store connection failed: {}; retrying in {:?}",
                    e,
                    interval
                ),
            }
        }

        tokio::select! {
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    store.disconnect().await;
    tracing::info!("case store supervisor stopped");
}
