//! 环境变量配置模块
//!
//! 允许通过环境变量覆盖已加载配置中的级别与格式，便于在不修改配置文件的
//! 情况下临时调整输出。

use crate::config::{OutputFormat, RouterConfig};
use crate::core::severity::Severity;
use crate::error::{Result, SplitLogError};
use std::env;

/// 最低输出级别
pub const LEVEL_VAR: &str = "SPLITLOG_LEVEL";
/// 分界级别
pub const PARTITION_VAR: &str = "SPLITLOG_PARTITION";
/// 输出格式（json / text）
pub const FORMAT_VAR: &str = "SPLITLOG_FORMAT";

/// 环境变量配置管理器
pub struct EnvConfig;

impl EnvConfig {
    /// 用进程环境变量覆盖配置
    pub fn apply(config: RouterConfig) -> Result<RouterConfig> {
        Self::apply_from(config, |key| env::var(key).ok())
    }

    /// 用任意查找函数覆盖配置；空字符串视为未设置
    pub fn apply_from<F>(mut config: RouterConfig, lookup: F) -> Result<RouterConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(level) = get(LEVEL_VAR) {
            config.level = level.parse::<Severity>()?;
            tracing::debug!(level = %config.level, "level overridden from {}", LEVEL_VAR);
        }

        if let Some(partition) = get(PARTITION_VAR) {
            config.partition = partition.parse::<Severity>()?;
            tracing::debug!(partition = %config.partition, "partition overridden from {}", PARTITION_VAR);
        }

        if let Some(format) = get(FORMAT_VAR) {
            config.format = match format.trim().to_lowercase().as_str() {
                "json" => OutputFormat::Json,
                "text" => OutputFormat::Text,
                other => {
                    return Err(SplitLogError::config(format!(
                        "{} must be 'json' or 'text', got '{}'",
                        FORMAT_VAR, other
                    )))
                }
            };
        }

        Ok(config)
    }
}
