//! 日志初始化
//!
//! 基于 tracing-subscriber 组合过滤层与格式化层，支持 JSON 与人类可读两种输出。

use anyhow::Result;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use super::ObservabilityConfig;

/// 构建环境过滤器：RUST_LOG 优先，其次使用配置的日志级别
pub fn env_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// 初始化全局 subscriber
///
/// 重复初始化返回错误，测试中应改用 [`init_for_tests`]。
pub fn init(config: &ObservabilityConfig) -> Result<()> {
    let fmt_layer = if config.json_logs {
        fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .with_thread_ids(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// 测试用日志初始化
///
/// 设置 TEST_LOG 时输出到测试捕获的 stdout，否则不安装 subscriber。
/// 多次调用是安全的。
pub fn init_for_tests() {
    if std::env::var("TEST_LOG").is_err() {
        return;
    }

    let config = ObservabilityConfig {
        log_level: "debug".to_string(),
        ..Default::default()
    };
    let _ = tracing_subscriber::registry()
        .with(env_filter(&config))
        .with(fmt::layer().with_test_writer())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_falls_back_on_invalid_level() {
        let config = ObservabilityConfig {
            log_level: "not a [valid directive".to_string(),
            ..Default::default()
        };
        // 无效指令时不应 panic
        let _ = env_filter(&config);
    }

    #[test]
    fn test_init_for_tests_is_idempotent() {
        init_for_tests();
        init_for_tests();
    }
}
