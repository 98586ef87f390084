//! 推理调用的错误分类
//!
//! 每个变体对应一种面向调用方的失败：HTTP 类状态码、提示语、可选的机器可读 code。
//! 由 `match` 穷举分派，调用方不需要探测字段。

use thiserror::Error;

/// 超时错误对外暴露的 code，客户端据此提供「重试」按钮
pub const TIMEOUT_CODE: &str = "TIMEOUT";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InferenceError {
    /// 单次尝试或总预算超时（重试耗尽后仍超时）
    #[error("inference request timed out")]
    Timeout,

    /// 上游返回非 2xx；body 为原始错误体，仅用于诊断日志
    #[error("inference endpoint returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    /// 连接被拒、DNS 失败等没有拿到响应的传输错误
    #[error("inference transport error: {0}")]
    Transport(String),

    /// 2xx 但首个 choice 没有非空 content
    #[error("inference endpoint returned an empty message")]
    EmptyResponse,

    /// 部署配置错误（如缺少 API Key），不是瞬时故障
    #[error("inference configuration error: {0}")]
    Config(String),
}

impl InferenceError {
    /// HTTP 类状态码
    pub fn status(&self) -> u16 {
        match self {
            InferenceError::Timeout => 504,
            InferenceError::Upstream { status, .. } => *status,
            InferenceError::Transport(_) | InferenceError::EmptyResponse => 502,
            InferenceError::Config(_) => 500,
        }
    }

    /// 面向最终用户的提示语（不含上游原文）
    pub fn message(&self) -> &'static str {
        match self {
            InferenceError::Timeout => "Detective timed out. Please try again.",
            InferenceError::Upstream { .. } | InferenceError::Transport(_) => {
                "The AI Detective hit a wall."
            }
            InferenceError::EmptyResponse => "Empty response from inference API.",
            InferenceError::Config(_) => "Detective failed to save the case.",
        }
    }

    pub fn code(&self) -> Option<&'static str> {
        match self {
            InferenceError::Timeout => Some(TIMEOUT_CODE),
            _ => None,
        }
    }

    /// 是否值得再试一次：超时、429、5xx
    pub fn is_retryable(&self) -> bool {
        match self {
            InferenceError::Timeout => true,
            InferenceError::Upstream { status, .. } => *status == 429 || (500..=599).contains(status),
            InferenceError::Transport(_)
            | InferenceError::EmptyResponse
            | InferenceError::Config(_) => false,
        }
    }

    /// 上游原始错误体（若有）
    pub fn detail(&self) -> Option<&str> {
        match self {
            InferenceError::Upstream { body, .. } => Some(body),
            InferenceError::Transport(msg) | InferenceError::Config(msg) => Some(msg),
            InferenceError::Timeout | InferenceError::EmptyResponse => None,
        }
    }
}
