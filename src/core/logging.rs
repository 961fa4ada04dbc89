//! 日志初始化
//!
//! 基于 tracing 框架；`RUST_LOG` 环境变量优先于配置文件中的级别。

use tracing_subscriber::EnvFilter;

use crate::config::{LogLevel, LoggingConfig};

impl LogLevel {
    /// tracing 过滤指令
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// 初始化日志系统
///
/// 可重复调用，已存在全局订阅者时忽略。
pub fn initialize_logging(config: &LoggingConfig) {
    if !config.log_to_console {
        return;
    }
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_directive()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
    tracing::info!(target: "engine", level = config.level.as_directive(), "Logging initialized");
}
