//! LLM 层：推理客户端抽象、HTTP 实现、错误分类与重试策略

pub mod client;
pub mod error;
pub mod mock;
pub mod retry;
pub mod traits;

pub use client::InferenceClient;
pub use error::{InferenceError, TIMEOUT_CODE};
pub use mock::MockLlmClient;
pub use retry::RetryConfig;
pub use traits::LlmClient;
