//! 日志初始化
//!
//! 安装 `tracing-subscriber`（`RUST_LOG` 环境变量过滤，默认 `info`），
//! 并通过 `tracing-log` 把 `log` 记录转发到 tracing。

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// 默认日志级别
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Global tracing subscriber already set: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("Global log bridge already set: {0}")]
    LogBridge(#[from] log::SetLoggerError),
}

/// 初始化日志（重复调用静默忽略）
pub fn init_logging() {
    let _ = try_init_logging(DEFAULT_LOG_FILTER);
}

/// 初始化日志，`RUST_LOG` 未设置时使用 `default_filter`
pub fn try_init_logging(default_filter: &str) -> Result<(), LoggingError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();

    tracing::subscriber::set_global_default(subscriber)?;
    tracing_log::LogTracer::init()?;
    Ok(())
}
