//! 重试策略：总尝试次数与指数退避

use std::time::Duration;

use crate::config::LlmRetrySection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// 总尝试次数（含首次），至少为 1
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryConfig {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    /// 第 `attempt` 次失败后、下一次尝试前的等待：base * 2^(attempt-1)，不超过 max_delay
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << exp)
            .min(self.max_delay)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::from(&LlmRetrySection::default())
    }
}

impl From<&LlmRetrySection> for RetryConfig {
    fn from(section: &LlmRetrySection) -> Self {
        Self::new(
            section.max_attempts,
            Duration::from_millis(section.base_delay_ms),
            Duration::from_millis(section.max_delay_ms),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_delays() {
        let retry = RetryConfig::new(3, Duration::from_millis(100), Duration::from_secs(5));
        assert_eq!(retry.delay_after(1), Duration::from_millis(100));
        assert_eq!(retry.delay_after(2), Duration::from_millis(200));
        assert_eq!(retry.delay_after(3), Duration::from_millis(400));
    }

    #[test]
    fn test_delay_is_capped() {
        let retry = RetryConfig::new(10, Duration::from_millis(100), Duration::from_millis(250));
        assert_eq!(retry.delay_after(3), Duration::from_millis(250));
        assert_eq!(retry.delay_after(40), Duration::from_millis(250));
    }

    #[test]
    fn test_zero_attempts_means_one() {
        let retry = RetryConfig::new(0, Duration::ZERO, Duration::ZERO);
        assert_eq!(retry.max_attempts, 1);
    }

    #[test]
    fn test_default_matches_config() {
        let retry = RetryConfig::default();
        assert_eq!(retry.max_attempts, 3);
        assert_eq!(retry.base_delay, Duration::from_millis(100));
    }
}
