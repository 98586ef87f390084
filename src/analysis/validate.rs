//! 入口校验：按顺序检查，第一个失败即返回

use serde_json::Value;

use super::AnalysisError;
use crate::config::MAX_LOG_CHARS;

/// 从请求体取出 `logError`：
/// 1. 必须是字符串
/// 2. trim 后非空
/// 3. 原文字符数不超过 MAX_LOG_CHARS
///
/// 返回未 trim 的原文。
pub fn validate_log(body: &Value) -> Result<&str, AnalysisError> {
    let log = body
        .get("logError")
        .and_then(Value::as_str)
        .ok_or(AnalysisError::NoLog)?;

    if log.trim().is_empty() {
        return Err(AnalysisError::NoLog);
    }

    let chars = log.chars().count();
    if chars > MAX_LOG_CHARS {
        return Err(AnalysisError::TooLarge {
            chars,
            max: MAX_LOG_CHARS,
        });
    }

    Ok(log)
}
