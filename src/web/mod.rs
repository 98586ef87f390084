//! HTTP 接口
//!
//! - `POST /analyze`：提交日志，返回诊断报告与是否已保存
//! - `GET /cases`：按创建时间倒序返回全部案例（裸 JSON 数组）
//! - `GET /health`：存活探针，不依赖数据库与推理端点

pub mod error;

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::analysis::{AnalysisResponse, Analyzer};
use crate::store::{Case, CaseStore};

pub use error::ApiError;

#[derive(Clone)]
pub struct AppState {
    analyzer: Arc<Analyzer>,
    store: Arc<dyn CaseStore>,
}

impl AppState {
    pub fn new(analyzer: Arc<Analyzer>, store: Arc<dyn CaseStore>) -> Self {
        Self { analyzer, store }
    }
}

pub fn router(state: AppState, body_limit_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/analyze", post(analyze))
        .route("/cases", get(list_cases))
        .layer(DefaultBodyLimit::max(body_limit_bytes))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let Json(body) = payload?;
    let response = state.analyzer.analyze(&body).await?;
    Ok(Json(response))
}

async fn list_cases(State(state): State<AppState>) -> Result<Json<Vec<Case>>, ApiError> {
    let cases = state.store.list_newest_first().await.map_err(|e| {
        tracing::warn!("failed to list cases: {}", e);
        ApiError::history_unavailable()
    })?;
    Ok(Json(cases))
}
