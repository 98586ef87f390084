//! LLM 客户端抽象
//!
//! 编排层只依赖这个 trait：真实实现走 HTTP（InferenceClient），测试用 MockLlmClient。

use async_trait::async_trait;

use super::InferenceError;

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 诊断一段日志，返回报告文本。调用方已保证日志非空且未超长，这里不再校验。
    async fn diagnose(&self, log_text: &str) -> Result<String, InferenceError>;
}
