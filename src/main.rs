//! Detective - 日志诊断服务
//!
//! 入口：初始化日志、加载配置、启动案例库重连监管与 HTTP 服务，收到信号后优雅退出。

use std::sync::Arc;

use anyhow::Context;
use detective::analysis::Analyzer;
use detective::config::{load_config, API_KEY_ENV};
use detective::core::ShutdownManager;
use detective::llm::InferenceClient;
use detective::observability;
use detective::store::{ReconnectSupervisor, SqliteCaseStore};
use detective::web::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let cfg = load_config(None).context("Failed to load configuration")?;

    let llm = InferenceClient::from_config(&cfg.llm).context("Failed to build inference client")?;
    if cfg.llm.resolve_api_key().is_none() {
        // 不阻止启动，但每次 /analyze 都会以配置错误失败
        tracing::error!(
            "inference API key is not configured (llm.api_key / {}); /analyze will fail",
            API_KEY_ENV
        );
    }

    let shutdown = Arc::new(ShutdownManager::new());
    shutdown.install_signal_handlers();

    // 数据库不可达不影响启动：后台按固定间隔重连
    let store = Arc::new(SqliteCaseStore::new(&cfg.store));
    let supervisor = ReconnectSupervisor::spawn(
        store.clone(),
        cfg.store.reconnect_interval(),
        shutdown.token().child_token(),
    );

    let analyzer = Arc::new(Analyzer::new(Arc::new(llm), store.clone()));
    let app = router(AppState::new(analyzer, store), cfg.server.body_limit_bytes);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(cfg.server.port);
    let addr = format!("{}:{}", cfg.server.host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Detective listening on http://{}", addr);

    let signal = Arc::clone(&shutdown);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { signal.wait_for_shutdown().await })
        .await
        .context("HTTP server failed")?;

    supervisor.shutdown().await;
    tracing::info!("Detective stopped");
    Ok(())
}
