//! splitlog - 按严重级别分流的结构化日志
//!
//! splitlog 把每条日志事件格式化为一行结构化记录（默认 JSON），并根据
//! 级别写入两个输出之一：低于分界级别的写入 low sink（默认 stdout），
//! 其余写入 high sink（默认 stderr）。低于最低级别的事件被直接丢弃。
//!
//! # 快速开始
//!
//! ```rust
//! use splitlog::sinks::MemorySink;
//! use splitlog::{LogRouter, Severity};
//!
//! # fn main() -> Result<(), splitlog::SplitLogError> {
//! let stdout = MemorySink::new("stdout");
//! let stderr = MemorySink::new("stderr");
//!
//! let router = LogRouter::builder()
//!     .level(Severity::Debug)
//!     .partition(Severity::Error)
//!     .low_sink(stdout.clone())
//!     .high_sink(stderr.clone())
//!     .build()?;
//!
//! let logger = router.logger("test");
//! logger.debug("test")?;
//! logger.warning("test")?;
//! logger.error("test")?;
//!
//! assert_eq!(stdout.len(), 2);
//! assert_eq!(stderr.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! # 通过 tracing 宏使用
//!
//! ```rust,no_run
//! use splitlog::{init_with_config, RouterConfig};
//!
//! # fn main() -> Result<(), splitlog::SplitLogError> {
//! let router = init_with_config(RouterConfig::default())?;
//!
//! tracing::info!(user_id = 12345, "user logged in");
//! tracing::error!("database unreachable");
//!
//! router.flush()?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod diagnostics;
pub mod env_config;
pub mod error;
pub mod sinks;

// 重新导出主要类型
pub use config::{
    load_config_from_file, load_config_from_str, validate_config, ContextFieldsConfig,
    OutputFormat, RouterConfig, SinkTarget,
};
pub use crate::core::{
    install_global, Delivery, ExceptionInfo, FieldValue, Formatter, LogEvent, LogRouter,
    LogRouterBuilder, Logger, RouteTable, RouterLayer, RoutingRule, Severity, SinkRole,
};
pub use diagnostics::DiagnosticsSnapshot;
pub use env_config::EnvConfig;
pub use error::{Result, SplitLogError};

use std::sync::Arc;

/// 库版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 使用默认配置（叠加环境变量覆盖）初始化并安装全局 tracing 订阅器
///
/// 返回的路由器可用于直接记录、刷新或查询诊断数据。
pub fn init() -> Result<Arc<LogRouter>> {
    init_with_config(RouterConfig::default())
}

/// 使用指定配置（叠加环境变量覆盖）初始化并安装全局 tracing 订阅器
///
/// 全局订阅器只能安装一次，重复调用返回 [`SplitLogError::TracingError`]。
pub fn init_with_config(config: RouterConfig) -> Result<Arc<LogRouter>> {
    let config = EnvConfig::apply(config)?;
    let router = Arc::new(LogRouter::from_config(config)?);
    install_global(Arc::clone(&router))?;
    Ok(router)
}
