//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `DETECTIVE__*` 覆盖（双下划线表示嵌套，如 `DETECTIVE__LLM__MODEL=gpt-4o`）。

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// 单条日志允许的最大字符数（入口校验，不可配置）
pub const MAX_LOG_CHARS: usize = 50_000;

/// 未在配置中设置 API Key 时读取的环境变量
pub const API_KEY_ENV: &str = "INFERENCE_API_KEY";

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSection,
    pub llm: LlmSection,
    pub store: StoreSection,
}

/// [server] 段：监听地址与请求体上限
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    /// JSON 请求体的传输层上限（字节），与日志字符上限相互独立
    pub body_limit_bytes: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            body_limit_bytes: 256 * 1024,
        }
    }
}

/// [llm] 段：推理端点、模型、凭据与提示词
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    pub api_url: String,
    pub model: String,
    /// 未设置时回落到环境变量 `INFERENCE_API_KEY`
    pub api_key: Option<String>,
    pub system_prompt: String,
    pub user_agent: String,
    pub timeouts: LlmTimeoutsSection,
    pub retry: LlmRetrySection,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            api_url: "https://models.github.ai/inference/chat/completions".to_string(),
            model: "gpt-4o".to_string(),
            api_key: None,
            system_prompt: "You are a senior DevOps log analyzer.".to_string(),
            user_agent: "log-detective/1.0".to_string(),
            timeouts: LlmTimeoutsSection::default(),
            retry: LlmRetrySection::default(),
        }
    }
}

impl LlmSection {
    /// 配置中的 Key 优先，其次环境变量；空字符串视为未设置
    pub fn resolve_api_key(&self) -> Option<String> {
        let usable = |k: &String| !k.trim().is_empty();
        self.api_key
            .clone()
            .filter(usable)
            .or_else(|| std::env::var(API_KEY_ENV).ok().filter(usable))
    }
}

/// [llm.timeouts] 段（秒）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmTimeoutsSection {
    /// HTTP 客户端默认超时
    pub transport_secs: u64,
    /// 单次诊断请求的超时，覆盖默认值
    pub request_secs: u64,
    /// 全部尝试（含退避）的总预算
    pub deadline_secs: u64,
}

impl Default for LlmTimeoutsSection {
    fn default() -> Self {
        Self {
            transport_secs: 15,
            request_secs: 30,
            deadline_secs: 100,
        }
    }
}

/// [llm.retry] 段：总尝试次数与指数退避
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmRetrySection {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for LlmRetrySection {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 5_000,
        }
    }
}

/// [store] 段：案例库连接串与重连节奏
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    pub url: String,
    pub connect_timeout_secs: u64,
    pub reconnect_interval_secs: u64,
    pub max_connections: u32,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            url: "sqlite:detective.db?mode=rwc".to_string(),
            connect_timeout_secs: 5,
            reconnect_interval_secs: 5,
            max_connections: 5,
        }
    }
}

impl StoreSection {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_secs(self.reconnect_interval_secs)
    }
}

/// 从 config 目录加载配置，环境变量 DETECTIVE__* 可覆盖
///
/// 1. 工作目录下的 config/default.toml（可缺省，缺省时全部取代码内默认值）
/// 2. 显式传入的 config_path（必须存在），覆盖前面的键
/// 3. 环境变量 DETECTIVE__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder()
        .add_source(config::File::with_name("config/default").required(false));

    if let Some(path) = config_path {
        builder = builder.add_source(config::File::from(path));
    }

    builder
        .add_source(
            config::Environment::with_prefix("DETECTIVE")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.llm.model, "gpt-4o");
        assert_eq!(cfg.llm.retry.max_attempts, 3);
        assert!(cfg.llm.timeouts.request_secs > cfg.llm.timeouts.transport_secs);
        assert_eq!(cfg.store.reconnect_interval(), Duration::from_secs(5));
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("detective.toml");
        std::fs::write(
            &path,
            r#"
[llm]
model = "gpt-4o-mini"

[llm.retry]
max_attempts = 5

[store]
url = "sqlite:/tmp/cases.db"
"#,
        )
        .unwrap();

        let cfg = load_config(Some(path)).unwrap();
        assert_eq!(cfg.llm.model, "gpt-4o-mini");
        assert_eq!(cfg.llm.retry.max_attempts, 5);
        // 未出现的键保留默认值
        assert_eq!(cfg.llm.retry.base_delay_ms, 100);
        assert_eq!(cfg.store.url, "sqlite:/tmp/cases.db");
        assert_eq!(cfg.server.body_limit_bytes, 256 * 1024);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn test_blank_api_key_is_unset() {
        let section = LlmSection {
            api_key: Some("   ".to_string()),
            ..LlmSection::default()
        };
        // 空白 Key 回落到环境变量，结果要么缺失要么非空
        let resolved = section.resolve_api_key();
        assert!(resolved.map_or(true, |k| !k.trim().is_empty()));

        let section = LlmSection {
            api_key: Some("sk-test".to_string()),
            ..LlmSection::default()
        };
        assert_eq!(section.resolve_api_key().as_deref(), Some("sk-test"));
    }
}
