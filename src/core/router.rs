//! 结构化日志路由器
//!
//! [`LogRouter`] 是本库的核心：过滤低于阈值的事件，将其余事件格式化后
//! 同步写入恰好一个 sink。配置在构造时确定，此后不可变；每个实例相互
//! 独立，没有全局状态。

use crate::config::{validate_config, ContextFieldsConfig, OutputFormat, RouterConfig};
use crate::core::event::{FieldValue, LogEvent};
use crate::core::formatter::Formatter;
use crate::core::routing::{RouteTable, RoutingRule, SinkRole};
use crate::core::severity::Severity;
use crate::diagnostics::{Diagnostics, DiagnosticsSnapshot};
use crate::error::Result;
use crate::sinks::{open_sink, LogSink};
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// `emit` 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// 低于阈值，未输出
    Filtered,
    /// 已写入指定 sink
    Delivered(SinkRole),
}

/// 结构化日志路由器
pub struct LogRouter {
    routes: RouteTable,
    formatter: Formatter,
    low: Arc<dyn LogSink>,
    high: Arc<dyn LogSink>,
    diagnostics: Diagnostics,
}

impl fmt::Debug for LogRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogRouter")
            .field("routes", &self.routes)
            .field("formatter", &self.formatter)
            .field("low", &self.low.name())
            .field("high", &self.high.name())
            .finish()
    }
}

impl LogRouter {
    /// 按配置创建路由器，打开配置中的 sink
    pub fn from_config(config: RouterConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    /// 创建构建器
    pub fn builder() -> LogRouterBuilder {
        LogRouterBuilder::new()
    }

    /// 投递一个事件
    ///
    /// 低于阈值时不做任何事；否则格式化并写入路由表选出的 sink。
    /// sink 写入失败时返回错误，不重试。
    pub fn emit(&self, event: LogEvent) -> Result<Delivery> {
        let role = match self.routes.route(event.severity()) {
            Some(role) => role,
            None => {
                self.diagnostics.increment_events_filtered();
                return Ok(Delivery::Filtered);
            }
        };

        self.diagnostics
            .add_field_fallbacks(event.fallback_count() as u64);
        let record = self.formatter.format(&event);

        let sink = self.sink(role);
        match sink.write_record(&record) {
            Ok(()) => {
                match role {
                    SinkRole::Low => self.diagnostics.increment_low_writes(),
                    SinkRole::High => self.diagnostics.increment_high_writes(),
                }
                Ok(Delivery::Delivered(role))
            }
            Err(e) => {
                self.diagnostics.increment_sink_errors();
                Err(e.into())
            }
        }
    }

    /// `emit(severity, name, message, fields)` 形式的便捷入口
    pub fn log<I, K>(
        &self,
        severity: Severity,
        logger_name: &str,
        message: &str,
        fields: I,
    ) -> Result<Delivery>
    where
        I: IntoIterator<Item = (K, FieldValue)>,
        K: Into<String>,
    {
        self.emit(LogEvent::new(severity, logger_name, message).with_fields(fields))
    }

    /// 以字符串给出级别；无法识别的级别在此被拒绝，不产生任何输出
    pub fn log_str(&self, level: &str, logger_name: &str, message: &str) -> Result<Delivery> {
        let severity: Severity = level.parse()?;
        self.emit(LogEvent::new(severity, logger_name, message))
    }

    /// 获取命名记录器
    pub fn logger(&self, name: impl Into<String>) -> Logger<'_> {
        Logger {
            router: self,
            name: name.into(),
        }
    }

    /// 该级别的事件是否会被输出
    pub fn is_enabled(&self, severity: Severity) -> bool {
        self.routes.route(severity).is_some()
    }

    /// 刷新两个 sink
    pub fn flush(&self) -> Result<()> {
        self.low.flush()?;
        self.high.flush()?;
        Ok(())
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn formatter(&self) -> &Formatter {
        &self.formatter
    }

    /// 获取诊断数据快照
    pub fn diagnostics(&self) -> DiagnosticsSnapshot {
        self.diagnostics.snapshot()
    }

    fn sink(&self, role: SinkRole) -> &dyn LogSink {
        match role {
            SinkRole::Low => self.low.as_ref(),
            SinkRole::High => self.high.as_ref(),
        }
    }
}

/// 命名记录器
///
/// 绑定到一个路由器和一个名称，提供按级别命名的方法。
#[derive(Debug, Clone)]
pub struct Logger<'a> {
    router: &'a LogRouter,
    name: String,
}

impl<'a> Logger<'a> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 以此记录器的名称创建事件，可继续添加字段后交给 [`Logger::emit`]
    pub fn event(&self, severity: Severity, message: impl Into<String>) -> LogEvent {
        LogEvent::new(severity, self.name.as_str(), message)
    }

    pub fn emit(&self, event: LogEvent) -> Result<Delivery> {
        self.router.emit(event)
    }

    pub fn log(&self, severity: Severity, message: impl Into<String>) -> Result<Delivery> {
        self.emit(self.event(severity, message))
    }

    pub fn debug(&self, message: impl Into<String>) -> Result<Delivery> {
        self.log(Severity::Debug, message)
    }

    pub fn info(&self, message: impl Into<String>) -> Result<Delivery> {
        self.log(Severity::Info, message)
    }

    pub fn warning(&self, message: impl Into<String>) -> Result<Delivery> {
        self.log(Severity::Warning, message)
    }

    pub fn error(&self, message: impl Into<String>) -> Result<Delivery> {
        self.log(Severity::Error, message)
    }

    pub fn critical(&self, message: impl Into<String>) -> Result<Delivery> {
        self.log(Severity::Critical, message)
    }

    /// ERROR 级别，附带错误的原因链和调用栈
    pub fn exception<E: StdError + 'static>(
        &self,
        message: impl Into<String>,
        err: &E,
    ) -> Result<Delivery> {
        self.emit(self.event(Severity::Error, message).with_error(err))
    }
}

/// 路由器构建器
///
/// 未显式指定 sink 时按配置中的目标打开。
#[derive(Default)]
pub struct LogRouterBuilder {
    config: RouterConfig,
    low: Option<Arc<dyn LogSink>>,
    high: Option<Arc<dyn LogSink>>,
    rules: Option<Vec<RoutingRule>>,
}

impl LogRouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 整体替换配置
    pub fn config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn level(mut self, level: Severity) -> Self {
        self.config.level = level;
        self
    }

    pub fn partition(mut self, partition: Severity) -> Self {
        self.config.partition = partition;
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn colored(mut self, colored: bool) -> Self {
        self.config.colored = colored;
        self
    }

    pub fn context_fields(mut self, context: ContextFieldsConfig) -> Self {
        self.config.context_fields = context;
        self
    }

    /// 使用自定义的 low sink，覆盖配置中的目标
    pub fn low_sink(mut self, sink: impl LogSink + 'static) -> Self {
        self.low = Some(Arc::new(sink));
        self
    }

    /// 使用自定义的 high sink，覆盖配置中的目标
    pub fn high_sink(mut self, sink: impl LogSink + 'static) -> Self {
        self.high = Some(Arc::new(sink));
        self
    }

    /// 使用自定义路由规则代替 level/partition 两段式划分
    pub fn rules(mut self, rules: Vec<RoutingRule>) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn build(self) -> Result<LogRouter> {
        let config = self.config;
        validate_config(&config)?;

        let routes = match self.rules {
            Some(rules) => RouteTable::new(config.level, rules)?,
            None => RouteTable::partitioned(config.level, config.partition),
        };

        let low = match self.low {
            Some(sink) => sink,
            None => open_sink(&config.low_sink)?,
        };
        let high = match self.high {
            Some(sink) => sink,
            None => open_sink(&config.high_sink)?,
        };

        tracing::debug!(
            level = %config.level,
            partition = %config.partition,
            low = low.name(),
            high = high.name(),
            "log router constructed"
        );

        Ok(LogRouter {
            routes,
            formatter: Formatter::new(config.format, config.context_fields, config.colored),
            low,
            high,
            diagnostics: Diagnostics::new(),
        })
    }
}
