//! Mock LLM 客户端（用于测试，无需 API）
//!
//! 按脚本依次返回预设结果，脚本用完后重复最后一条；记录调用次数与收到的日志。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::{InferenceError, LlmClient};

#[derive(Debug)]
pub struct MockLlmClient {
    script: Mutex<VecDeque<Result<String, InferenceError>>>,
    fallback: Result<String, InferenceError>,
    seen: Mutex<Vec<String>>,
}

impl MockLlmClient {
    /// 每次都返回同一份报告
    pub fn replying(report: impl Into<String>) -> Self {
        Self::scripted(Vec::new(), Ok(report.into()))
    }

    /// 每次都返回同一个错误
    pub fn failing(err: InferenceError) -> Self {
        Self::scripted(Vec::new(), Err(err))
    }

    /// 先按顺序消费 script，之后一直返回 fallback
    pub fn scripted(
        script: Vec<Result<String, InferenceError>>,
        fallback: Result<String, InferenceError>,
    ) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().map(|s| s.len()).unwrap_or(0)
    }

    /// 按调用顺序返回收到的日志
    pub fn seen_logs(&self) -> Vec<String> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::replying("Mock diagnosis: check the stack trace.")
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn diagnose(&self, log_text: &str) -> Result<String, InferenceError> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(log_text.to_string());
        }
        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_script_then_fallback() {
        let mock = MockLlmClient::scripted(
            vec![Err(InferenceError::Timeout)],
            Ok("second".to_string()),
        );
        assert_eq!(mock.diagnose("a").await, Err(InferenceError::Timeout));
        assert_eq!(mock.diagnose("b").await.as_deref(), Ok("second"));
        assert_eq!(mock.diagnose("c").await.as_deref(), Ok("second"));
        assert_eq!(mock.calls(), 3);
        assert_eq!(mock.seen_logs(), vec!["a", "b", "c"]);
    }
}
