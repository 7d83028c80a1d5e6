//! tracing 桥接层
//!
//! 将 `tracing` 宏产生的事件转换为 [`LogEvent`] 并交给 [`LogRouter`]。
//! 事件的 target 作为记录器名称，`message` 字段作为消息，其余字段作为附加字段。

use crate::core::event::{ExceptionInfo, FieldValue, LogEvent};
use crate::core::router::LogRouter;
use crate::core::severity::Severity;
use crate::error::{Result, SplitLogError};
use serde_json::{Number, Value};
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Metadata, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// 路由层
#[derive(Debug, Clone)]
pub struct RouterLayer {
    router: Arc<LogRouter>,
}

impl RouterLayer {
    pub fn new(router: Arc<LogRouter>) -> Self {
        Self { router }
    }

    pub fn router(&self) -> &Arc<LogRouter> {
        &self.router
    }

    /// 将 tracing 事件转换为 LogEvent
    fn convert_event(event: &Event<'_>) -> LogEvent {
        let metadata = event.metadata();
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        // 如果没有明确的消息字段，使用目标作为消息
        let message = visitor
            .message
            .unwrap_or_else(|| format!("Event from {}", metadata.target()));

        let severity = Severity::from(*metadata.level());
        let mut log_event =
            LogEvent::new(severity, metadata.target(), message).with_fields(visitor.fields);
        if let Some(exception) = visitor.exception {
            log_event = log_event.with_exception(exception);
        }
        log_event
    }
}

impl<S> Layer<S> for RouterLayer
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn enabled(&self, metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        !metadata.is_event() || self.router.is_enabled(Severity::from(*metadata.level()))
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        // 写入失败已计入路由器诊断，这里不能再向上抛出
        let _ = self.router.emit(Self::convert_event(event));
    }
}

/// 经 tracing 传入的错误值统一使用的异常类型名
pub const DYN_ERROR_KIND: &str = "Error";

#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: Vec<(String, FieldValue)>,
    exception: Option<ExceptionInfo>,
}

impl FieldVisitor {
    fn push(&mut self, field: &Field, value: Value) {
        self.fields
            .push((field.name().to_string(), FieldValue::Json(value)));
    }
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let value_str = format!("{:?}", value);
        if field.name() == "message" {
            self.message = Some(value_str);
        } else {
            self.push(field, Value::String(value_str));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.push(field, Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push(field, Value::Number(Number::from(value)));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push(field, Value::Number(Number::from(value)));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        match Number::from_f64(value) {
            Some(n) => self.push(field, Value::Number(n)),
            // NaN 和无穷大不是合法的 JSON 数字
            None => self
                .fields
                .push((field.name().to_string(), FieldValue::Fallback(value.to_string()))),
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push(field, Value::Bool(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        // 类型信息在 `dyn Error` 后已丢失，字段名保留在附加字段中
        self.push(field, Value::String(value.to_string()));
        if self.exception.is_none() {
            self.exception = Some(ExceptionInfo::from_dyn_error(DYN_ERROR_KIND, value));
        }
    }
}

/// 将路由器安装为全局 tracing 订阅器
///
/// 只能成功调用一次；已有全局订阅器时返回错误。
pub fn install_global(router: Arc<LogRouter>) -> Result<()> {
    tracing_subscriber::registry()
        .with(RouterLayer::new(router))
        .try_init()
        .map_err(|e| SplitLogError::tracing(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::MemorySink;

    fn setup(level: Severity) -> (Arc<LogRouter>, MemorySink, MemorySink) {
        let low = MemorySink::new("low");
        let high = MemorySink::new("high");
        let router = LogRouter::builder()
            .level(level)
            .low_sink(low.clone())
            .high_sink(high.clone())
            .build()
            .unwrap();
        (Arc::new(router), low, high)
    }

    fn parse(line: &str) -> Value {
        serde_json::from_str(line).unwrap()
    }

    #[test]
    fn test_tracing_events_are_routed() {
        let (router, low, high) = setup(Severity::Debug);
        let subscriber = tracing_subscriber::registry().with(RouterLayer::new(router));

        tracing::subscriber::with_default(subscriber, || {
            tracing::trace!(target: "app", "trace");
            tracing::info!(target: "app", user_id = 7, action = "login", "user logged in");
            tracing::warn!(target: "app", "careful");
            tracing::error!(target: "app", code = 500, "failed");
        });

        let low_records: Vec<Value> = low.records().iter().map(|l| parse(l)).collect();
        assert_eq!(low_records.len(), 3);
        assert_eq!(low_records[0]["level"], "DEBUG");
        assert_eq!(low_records[1]["level"], "INFO");
        assert_eq!(low_records[1]["name"], "app");
        assert_eq!(low_records[1]["message"], "user logged in");
        assert_eq!(low_records[1]["user_id"], 7);
        assert_eq!(low_records[1]["action"], "login");
        assert_eq!(low_records[2]["level"], "WARNING");

        let high_records = high.records();
        assert_eq!(high_records.len(), 1);
        let record = parse(&high_records[0]);
        assert_eq!(record["level"], "ERROR");
        assert_eq!(record["code"], 500);
    }

    #[test]
    fn test_threshold_applies_to_tracing() {
        let (router, low, high) = setup(Severity::Warning);
        let subscriber = tracing_subscriber::registry().with(RouterLayer::new(router));

        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!("hidden");
            tracing::info!("hidden");
            tracing::warn!("shown");
        });

        assert_eq!(low.len(), 1);
        assert!(high.is_empty());
    }

    #[test]
    fn test_error_field_becomes_exception() {
        let (router, _low, high) = setup(Severity::Debug);
        let subscriber = tracing_subscriber::registry().with(RouterLayer::new(router));

        let err = std::io::Error::new(std::io::ErrorKind::Other, "connection reset");
        tracing::subscriber::with_default(subscriber, || {
            tracing::error!(cause = &err as &(dyn std::error::Error + 'static), "request failed");
        });

        let record = parse(&high.records()[0]);
        assert_eq!(record["message"], "request failed");
        assert_eq!(record["cause"], "connection reset");
        assert_eq!(record["exception"]["type"], DYN_ERROR_KIND);
        assert_eq!(record["exception"]["message"], "connection reset");
    }

    #[test]
    fn test_non_finite_float_falls_back() {
        let (router, low, _high) = setup(Severity::Debug);
        let subscriber = tracing_subscriber::registry().with(RouterLayer::new(router.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(ratio = f64::NAN, "computed");
        });

        let record = parse(&low.records()[0]);
        assert_eq!(record["ratio"], "NaN");
        assert_eq!(router.diagnostics().field_fallbacks, 1);
    }

    #[test]
    fn test_event_without_message() {
        let (router, low, _high) = setup(Severity::Debug);
        let subscriber = tracing_subscriber::registry().with(RouterLayer::new(router));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "metrics", count = 3);
        });

        let record = parse(&low.records()[0]);
        assert_eq!(record["message"], "Event from metrics");
        assert_eq!(record["count"], 3);
    }
}
