//! OpenAI 兼容的 chat-completion 客户端
//!
//! 直接用 reqwest 发请求，以便拿到上游状态码做错误分类：
//! - 单次尝试有独立超时（长于客户端默认超时）
//! - 超时 / 429 / 5xx 指数退避重试，总尝试次数受 RetryConfig 限制
//! - 所有尝试合计受总预算（deadline）约束，超出即视为超时

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::config::{LlmSection, API_KEY_ENV};
use crate::llm::{InferenceError, LlmClient, RetryConfig};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl ChatResponse {
    fn into_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|c| !c.is_empty())
    }
}

/// 推理端点客户端：持有 HTTP 连接池、模型名与重试 / 超时策略；不派生 Debug，内含 API Key
#[derive(Clone)]
pub struct InferenceClient {
    http: reqwest::Client,
    api_url: String,
    model: String,
    api_key: Option<String>,
    system_prompt: String,
    request_timeout: Duration,
    deadline: Duration,
    retry: RetryConfig,
}

impl InferenceClient {
    /// 按 [llm] 配置创建；API Key 缺失不在这里报错，而是在每次调用时报配置错误
    pub fn from_config(cfg: &LlmSection) -> Result<Self, InferenceError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeouts.transport_secs))
            .user_agent(cfg.user_agent.clone())
            .default_headers(headers)
            .build()
            .map_err(|e| InferenceError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_url: cfg.api_url.clone(),
            model: cfg.model.clone(),
            api_key: cfg.resolve_api_key(),
            system_prompt: cfg.system_prompt.clone(),
            request_timeout: Duration::from_secs(cfg.timeouts.request_secs),
            deadline: Duration::from_secs(cfg.timeouts.deadline_secs),
            retry: RetryConfig::from(&cfg.retry),
        })
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn build_request(&self, log_text: &str) -> ChatRequest<'_> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: self.system_prompt.clone(),
                },
                ChatMessage {
                    role: "user",
                    content: format!("Analyze this log: {log_text}"),
                },
            ],
        }
    }

    /// 单次尝试：传输超时归为 Timeout，无响应的其它传输错误归为 Transport
    async fn send_once(
        &self,
        api_key: &str,
        body: &ChatRequest<'_>,
    ) -> Result<String, InferenceError> {
        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(body)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(e) if e.is_timeout() => return Err(InferenceError::Timeout),
            Err(e) => {
                debug!("inference response is not a chat completion: {}", e);
                return Err(InferenceError::EmptyResponse);
            }
        };

        parsed.into_content().ok_or(InferenceError::EmptyResponse)
    }

    async fn send_with_retry(
        &self,
        api_key: &str,
        body: &ChatRequest<'_>,
    ) -> Result<String, InferenceError> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.send_once(api_key, body).await {
                Ok(content) => return Ok(content),
                Err(err) if err.is_retryable() && attempt < max_attempts => {
                    let delay = self.retry.delay_after(attempt);
                    warn!(
                        "inference attempt {}/{} failed: {}; retrying in {:?}",
                        attempt, max_attempts, err, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    match &err {
                        InferenceError::Timeout => {
                            error!("inference request timed out after {} attempt(s)", attempt)
                        }
                        InferenceError::EmptyResponse => {
                            warn!("inference endpoint returned an empty message")
                        }
                        other => error!(
                            "inference failed after {} attempt(s): {}",
                            attempt, other
                        ),
                    }
                    return Err(err);
                }
            }
        }
    }
}

fn classify_transport(err: reqwest::Error) -> InferenceError {
    if err.is_timeout() {
        InferenceError::Timeout
    } else {
        InferenceError::Transport(err.to_string())
    }
}

#[async_trait]
impl LlmClient for InferenceClient {
    #[tracing::instrument(skip_all, fields(model = %self.model, log_bytes = log_text.len()))]
    async fn diagnose(&self, log_text: &str) -> Result<String, InferenceError> {
        let Some(api_key) = self.api_key.as_deref() else {
            error!(
                "inference API key is missing; set llm.api_key or {} before serving requests",
                API_KEY_ENV
            );
            return Err(InferenceError::Config(format!("{API_KEY_ENV} is not set")));
        };

        let body = self.build_request(log_text);
        match tokio::time::timeout(self.deadline, self.send_with_retry(api_key, &body)).await {
            Ok(result) => result,
            Err(_) => {
                error!("inference deadline of {:?} elapsed", self.deadline);
                Err(InferenceError::Timeout)
            }
        }
    }
}
