//! Case：一条已诊断的日志与其报告

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// 持久化后的诊断案例；创建后不再修改（archived 只由外部归档流程改写）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    pub id: String,
    pub log_error: String,
    pub report: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub archived: bool,
}

impl Case {
    /// 新建案例：分配 id，createdAt == updatedAt，未归档
    pub fn new(log_error: impl Into<String>, report: impl Into<String>) -> Self {
        let now = timestamp_now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            log_error: log_error.into(),
            report: report.into(),
            created_at: now,
            updated_at: now,
            archived: false,
        }
    }
}

/// 当前时间，截断到微秒，保证写入文本后再读回完全相等
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// 固定精度的 RFC 3339 文本，字典序即时间序
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_case_fields() {
        let case = Case::new("ERROR db down", "Check the connection string.");
        assert!(!case.id.is_empty());
        assert_eq!(case.created_at, case.updated_at);
        assert!(!case.archived);
    }

    #[test]
    fn test_distinct_ids() {
        let a = Case::new("same", "same");
        let b = Case::new("same", "same");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_json_shape_is_camel_case() {
        let case = Case::new("log", "report");
        let v = serde_json::to_value(&case).unwrap();
        for key in ["id", "logError", "report", "createdAt", "updatedAt", "archived"] {
            assert!(v.get(key).is_some(), "missing {key}");
        }
        assert_eq!(v["archived"], false);
    }

    #[test]
    fn test_timestamp_text_roundtrip_and_order() {
        let earlier = timestamp_now();
        let later = earlier + chrono::Duration::microseconds(1);
        let (a, b) = (format_timestamp(&earlier), format_timestamp(&later));
        assert!(a < b);
        assert_eq!(parse_timestamp(&a).unwrap(), earlier);
    }
}
