//! 定义 splitlog 路由器的所有配置结构体。
//!
//! 配置在进程启动时构造一次，此后不可变。可以直接构造，也可以从 TOML
//! 文件或字符串加载。

use crate::core::severity::Severity;
use crate::error::{Result, SplitLogError};
use serde::Deserialize;
use std::path::{Path, PathBuf};

// --- 辅助函数，用于提供配置项的默认值 ---
fn default_level() -> Severity {
    Severity::Debug
}
fn default_partition() -> Severity {
    Severity::Error
}
fn default_low_sink() -> SinkTarget {
    SinkTarget::Stdout
}
fn default_high_sink() -> SinkTarget {
    SinkTarget::Stderr
}
fn default_false() -> bool {
    false
}

/// 记录的输出格式。
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// 单行 JSON 对象
    #[default]
    Json,
    /// `LEVEL name message key=value ...`
    Text,
}

/// 输出目标。
///
/// TOML 中写作 `"stdout"`、`"stderr"` 或 `{ file = "path/to/app.log" }`。
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SinkTarget {
    Stdout,
    Stderr,
    /// 以追加模式打开的文件
    File(PathBuf),
}

impl SinkTarget {
    /// 用于日志和诊断的名称
    pub fn describe(&self) -> String {
        match self {
            SinkTarget::Stdout => "stdout".to_string(),
            SinkTarget::Stderr => "stderr".to_string(),
            SinkTarget::File(path) => format!("file:{}", path.display()),
        }
    }
}

/// 控制哪些背景信息字段需要被注入到记录中。默认全部关闭。
#[derive(Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct ContextFieldsConfig {
    #[serde(default = "default_false")]
    pub timestamp: bool,
    #[serde(default = "default_false")]
    pub process: bool,
    #[serde(default = "default_false")]
    pub thread_name: bool,
    #[serde(default = "default_false")]
    pub hostname: bool,
}

/// 路由器的顶层配置结构体。
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RouterConfig {
    /// 最低输出级别，低于此级别的事件被丢弃
    #[serde(default = "default_level")]
    pub level: Severity,
    /// 分界级别：不低于此级别的事件写入 high sink
    #[serde(default = "default_partition")]
    pub partition: Severity,
    #[serde(default = "default_low_sink")]
    pub low_sink: SinkTarget,
    #[serde(default = "default_high_sink")]
    pub high_sink: SinkTarget,
    #[serde(default)]
    pub format: OutputFormat,
    /// 仅对文本格式生效
    #[serde(default = "default_false")]
    pub colored: bool,
    #[serde(default)]
    pub context_fields: ContextFieldsConfig,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            partition: default_partition(),
            low_sink: default_low_sink(),
            high_sink: default_high_sink(),
            format: OutputFormat::default(),
            colored: default_false(),
            context_fields: ContextFieldsConfig::default(),
        }
    }
}

impl RouterConfig {
    pub fn with_level(mut self, level: Severity) -> Self {
        self.level = level;
        self
    }

    pub fn with_partition(mut self, partition: Severity) -> Self {
        self.partition = partition;
        self
    }

    pub fn with_sinks(mut self, low: SinkTarget, high: SinkTarget) -> Self {
        self.low_sink = low;
        self.high_sink = high;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }
}

/// 从 TOML 文件加载并验证 `RouterConfig`。
pub fn load_config_from_file(path: &Path) -> Result<RouterConfig> {
    if !path.exists() {
        return Err(SplitLogError::ConfigFileMissing(
            path.to_string_lossy().into_owned(),
        ));
    }

    let config_str = std::fs::read_to_string(path)?;
    let config = load_config_from_str(&config_str)?;
    tracing::debug!(path = %path.display(), "loaded router config");
    Ok(config)
}

/// 从 TOML 字符串加载并验证 `RouterConfig`。
pub fn load_config_from_str(config_str: &str) -> Result<RouterConfig> {
    let config: RouterConfig = toml::from_str(config_str)?;
    validate_config(&config)?;
    Ok(config)
}

/// 验证配置的有效性。
pub fn validate_config(config: &RouterConfig) -> Result<()> {
    // 两个 sink 指向同一文件会产生两个独立句柄，记录可能交错
    if let (SinkTarget::File(low), SinkTarget::File(high)) = (&config.low_sink, &config.high_sink) {
        if low == high {
            return Err(SplitLogError::config(format!(
                "low_sink and high_sink must not share a file: {}",
                config.low_sink.describe()
            )));
        }
    }

    for (role, target) in [("low_sink", &config.low_sink), ("high_sink", &config.high_sink)] {
        if let SinkTarget::File(path) = target {
            if path.as_os_str().is_empty() {
                return Err(SplitLogError::config(format!(
                    "{} file path must not be empty",
                    role
                )));
            }
        }
    }

    Ok(())
}
