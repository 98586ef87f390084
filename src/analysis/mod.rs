//! 分析编排：校验 → 诊断（必须成功）→ 尽力持久化 → 组装响应
//!
//! 诊断与持久化是两个独立可失败的步骤：诊断失败直接结束请求，不尝试写库；
//! 写库失败只记日志，结果折叠进响应的 `saved` / `case` 字段。

pub mod validate;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::llm::{InferenceError, LlmClient};
use crate::store::{Case, CaseStore, StoreError};

pub use validate::validate_log;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("no log provided")]
    NoLog,

    #[error("log is too large: {chars} characters (max {max})")]
    TooLarge { chars: usize, max: usize },

    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// `/analyze` 成功响应
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    pub report: String,
    pub saved: bool,
    pub case: Option<Case>,
}

impl AnalysisResponse {
    pub fn new(report: String, persisted: Result<Case, StoreError>) -> Self {
        let case = persisted.ok();
        Self {
            report,
            saved: case.is_some(),
            case,
        }
    }
}

pub struct Analyzer {
    llm: Arc<dyn LlmClient>,
    store: Arc<dyn CaseStore>,
}

impl Analyzer {
    pub fn new(llm: Arc<dyn LlmClient>, store: Arc<dyn CaseStore>) -> Self {
        Self { llm, store }
    }

    /// 处理一次分析请求；`body` 为原始 JSON 请求体
    #[tracing::instrument(skip_all)]
    pub async fn analyze(&self, body: &Value) -> Result<AnalysisResponse, AnalysisError> {
        let log = validate_log(body)?;
        tracing::debug!(chars = log.chars().count(), "log accepted");

        let report = self.llm.diagnose(log).await?;

        let persisted = self.store.save(log, &report).await;
        match &persisted {
            Ok(case) => tracing::info!(case_id = %case.id, "case saved"),
            Err(e) => tracing::warn!("failed to save case, returning report anyway: {}", e),
        }

        Ok(AnalysisResponse::new(report, persisted))
    }
}
