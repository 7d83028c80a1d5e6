//! 格式化器
//!
//! 将 [`LogEvent`] 转换为单行结构化记录，支持 JSON 与文本两种格式。
//! 格式化是纯函数：相同的事件总是得到相同的记录。

use crate::config::{ContextFieldsConfig, OutputFormat};
use crate::core::event::{ExceptionInfo, LogEvent};
use crate::core::severity::Severity;
use colored::Colorize;
use once_cell::sync::Lazy;
use serde_json::{Map, Value};

/// 记录中固定的键名
pub const LEVEL_KEY: &str = "level";
pub const NAME_KEY: &str = "name";
pub const MESSAGE_KEY: &str = "message";
pub const TIMESTAMP_KEY: &str = "timestamp";
pub const PROCESS_KEY: &str = "process";
pub const THREAD_KEY: &str = "thread_name";
pub const HOSTNAME_KEY: &str = "hostname";
pub const EXCEPTION_KEY: &str = "exception";
pub const STACKTRACE_KEY: &str = "stacktrace";

static HOSTNAME: Lazy<Option<String>> = Lazy::new(|| {
    hostname::get()
        .ok()
        .map(|name| name.to_string_lossy().into_owned())
});

/// 格式化器
#[derive(Debug, Clone)]
pub struct Formatter {
    format: OutputFormat,
    context: ContextFieldsConfig,
    colored: bool,
}

impl Formatter {
    /// 创建新的格式化器
    pub fn new(format: OutputFormat, context: ContextFieldsConfig, colored: bool) -> Self {
        Self {
            format,
            context,
            colored,
        }
    }

    /// 默认 JSON 格式化器，不注入任何上下文字段
    pub fn json() -> Self {
        Self::new(OutputFormat::Json, ContextFieldsConfig::default(), false)
    }

    pub fn output_format(&self) -> OutputFormat {
        self.format
    }

    /// 格式化事件为一行记录（不含换行符）
    pub fn format(&self, event: &LogEvent) -> String {
        match self.format {
            OutputFormat::Json => self.format_as_json(event),
            OutputFormat::Text => self.format_as_text(event),
        }
    }

    /// 构造结构化记录对象
    ///
    /// 键顺序固定为：level, name, message, 上下文字段, 附加字段,
    /// exception, stacktrace。附加字段与保留键同名时保留键优先。
    pub fn to_record(&self, event: &LogEvent) -> Map<String, Value> {
        let mut record = Map::new();
        record.insert(LEVEL_KEY.to_string(), Value::from(event.severity().as_str()));
        record.insert(NAME_KEY.to_string(), Value::from(event.logger_name()));
        record.insert(MESSAGE_KEY.to_string(), Value::from(event.message()));

        for (key, value) in self.context_fields(event) {
            record.insert(key.to_string(), value);
        }

        for (key, value) in event.fields() {
            if is_reserved(key) || record.contains_key(key) {
                continue;
            }
            record.insert(key.clone(), value.to_json());
        }

        if let Some(exception) = exception_for(event) {
            record.insert(EXCEPTION_KEY.to_string(), exception_to_json(exception));
            if let Some(ref stacktrace) = exception.stacktrace {
                record.insert(STACKTRACE_KEY.to_string(), Value::from(stacktrace.as_str()));
            }
        }

        record
    }

    fn context_fields(&self, event: &LogEvent) -> Vec<(&'static str, Value)> {
        let mut fields = Vec::new();
        if self.context.timestamp {
            fields.push((TIMESTAMP_KEY, Value::from(event.timestamp().to_rfc3339())));
        }
        if self.context.process {
            fields.push((PROCESS_KEY, Value::from(std::process::id())));
        }
        if self.context.thread_name {
            let name = event.thread_name().map_or(Value::Null, Value::from);
            fields.push((THREAD_KEY, name));
        }
        if self.context.hostname {
            let host = HOSTNAME.as_deref().map_or(Value::Null, Value::from);
            fields.push((HOSTNAME_KEY, host));
        }
        fields
    }

    fn format_as_json(&self, event: &LogEvent) -> String {
        let record = self.to_record(event);
        serde_json::to_string(&record).unwrap_or_else(|_| minimal_json(event))
    }

    fn format_as_text(&self, event: &LogEvent) -> String {
        let mut result = format!(
            "{} {} {}",
            self.format_level(event.severity()),
            event.logger_name(),
            event.message()
        );

        let context = self.context_fields(event);
        for (key, value) in &context {
            result.push_str(&format!(" {}={}", key, text_value(value)));
        }

        for (key, value) in event.fields() {
            if is_reserved(key) || context.iter().any(|(k, _)| *k == key.as_str()) {
                continue;
            }
            result.push_str(&format!(" {}={}", key, text_value(&value.to_json())));
        }

        if let Some(exception) = exception_for(event) {
            let summary = format!("{}: {}", exception.kind, exception.message);
            result.push_str(&format!(" {}={}", EXCEPTION_KEY, text_str(&summary)));
            if !exception.causes.is_empty() {
                result.push_str(&format!(" causes={}", text_str(&exception.causes.join("; "))));
            }
            if let Some(ref stacktrace) = exception.stacktrace {
                result.push_str(&format!(" {}={}", STACKTRACE_KEY, text_str(stacktrace)));
            }
        }

        // 单行输出：把消息或字段中的换行转义掉
        result.replace('\n', "\\n")
    }

    fn format_level(&self, severity: Severity) -> String {
        if !self.colored {
            return severity.as_str().to_string();
        }
        match severity {
            Severity::Debug => severity.as_str().cyan().to_string(),
            Severity::Info => severity.as_str().green().to_string(),
            Severity::Warning => severity.as_str().yellow().to_string(),
            Severity::Error => severity.as_str().red().to_string(),
            Severity::Critical => severity.as_str().red().bold().to_string(),
        }
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::json()
    }
}

fn is_reserved(key: &str) -> bool {
    matches!(
        key,
        LEVEL_KEY | NAME_KEY | MESSAGE_KEY | EXCEPTION_KEY | STACKTRACE_KEY
    )
}

fn exception_for(event: &LogEvent) -> Option<&ExceptionInfo> {
    if event.severity().carries_exception() {
        event.exception()
    } else {
        None
    }
}

fn exception_to_json(exception: &ExceptionInfo) -> Value {
    let mut obj = Map::new();
    obj.insert("type".to_string(), Value::from(exception.kind.as_str()));
    obj.insert("message".to_string(), Value::from(exception.message.as_str()));
    if !exception.causes.is_empty() {
        obj.insert(
            "causes".to_string(),
            Value::Array(exception.causes.iter().map(|c| Value::from(c.as_str())).collect()),
        );
    }
    Value::Object(obj)
}

fn text_value(value: &Value) -> String {
    match value {
        Value::String(s) => text_str(s),
        other => other.to_string(),
    }
}

// 含空白、引号或等号的值加引号，内部的 `\` 和 `"` 转义
fn text_str(s: &str) -> String {
    if s.is_empty() || s.contains(|c: char| c.is_whitespace() || c == '"' || c == '=') {
        format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        s.to_string()
    }
}

fn minimal_json(event: &LogEvent) -> String {
    serde_json::json!({
        LEVEL_KEY: event.severity().as_str(),
        NAME_KEY: event.logger_name(),
        MESSAGE_KEY: event.message(),
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event::FieldValue;

    fn parse(line: &str) -> Map<String, Value> {
        match serde_json::from_str::<Value>(line).unwrap() {
            Value::Object(map) => map,
            other => panic!("expected object, got {}", other),
        }
    }

    #[test]
    fn test_json_base_keys_in_order() {
        let formatter = Formatter::json();
        let event = LogEvent::new(Severity::Info, "test", "Test message")
            .with_field("user_id", 12345)
            .with_field("action", "login");

        let line = formatter.format(&event);
        assert!(line.starts_with('{'));
        assert!(!line.contains('\n'));

        let record = parse(&line);
        let keys: Vec<&str> = record.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["level", "name", "message", "user_id", "action"]);
        assert_eq!(record["level"], "INFO");
        assert_eq!(record["name"], "test");
        assert_eq!(record["message"], "Test message");
        assert_eq!(record["user_id"], 12345);
    }

    #[test]
    fn test_reserved_keys_win_over_extras() {
        let formatter = Formatter::json();
        let event = LogEvent::new(Severity::Warning, "real", "real message")
            .with_field("name", "spoofed")
            .with_field("message", "spoofed")
            .with_field("other", true);

        let record = parse(&formatter.format(&event));
        assert_eq!(record["name"], "real");
        assert_eq!(record["message"], "real message");
        assert_eq!(record["other"], true);
        assert_eq!(record.len(), 4);
    }

    #[test]
    fn test_exception_only_on_error_and_above() {
        let formatter = Formatter::json();
        let exception = ExceptionInfo::new("IoError", "disk full").with_stacktrace("at main");

        let warning = LogEvent::new(Severity::Warning, "t", "w").with_exception(exception.clone());
        let record = parse(&formatter.format(&warning));
        assert!(!record.contains_key("exception"));
        assert!(!record.contains_key("stacktrace"));

        for severity in [Severity::Error, Severity::Critical] {
            let event = LogEvent::new(severity, "t", "e").with_exception(exception.clone());
            let record = parse(&formatter.format(&event));
            assert_eq!(record["exception"]["type"], "IoError");
            assert_eq!(record["exception"]["message"], "disk full");
            assert_eq!(record["stacktrace"], "at main");
        }
    }

    #[test]
    fn test_error_without_exception_has_no_exception_keys() {
        let record = parse(&Formatter::json().format(&LogEvent::new(Severity::Error, "t", "e")));
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn test_fallback_field_rendered_as_string() {
        let event = LogEvent::new(Severity::Info, "t", "m").with_fields(vec![(
            "handle",
            FieldValue::Fallback("Handle { fd: 3 }".to_string()),
        )]);
        let record = parse(&Formatter::json().format(&event));
        assert_eq!(record["handle"], "Handle { fd: 3 }");
    }

    #[test]
    fn test_context_fields() {
        let context = ContextFieldsConfig {
            timestamp: true,
            process: true,
            thread_name: true,
            hostname: false,
        };
        let formatter = Formatter::new(OutputFormat::Json, context, false);
        let record = parse(&formatter.format(&LogEvent::new(Severity::Info, "t", "m")));

        let keys: Vec<&str> = record.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["level", "name", "message", "timestamp", "process", "thread_name"]
        );
        assert_eq!(record["process"], std::process::id());
    }

    #[test]
    fn test_timestamp_context_uses_event_time() {
        use chrono::{TimeZone, Utc};

        let context = ContextFieldsConfig {
            timestamp: true,
            ..ContextFieldsConfig::default()
        };
        let formatter = Formatter::new(OutputFormat::Json, context, false);
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let event = LogEvent::new(Severity::Info, "t", "m").at(at);

        let record = parse(&formatter.format(&event));
        assert_eq!(record["timestamp"], "2024-03-01T12:30:00+00:00");
        assert_eq!(formatter.format(&event), formatter.format(&event));
    }

    #[test]
    fn test_text_formatting() {
        let formatter = Formatter::new(OutputFormat::Text, ContextFieldsConfig::default(), false);
        let event = LogEvent::new(Severity::Warning, "test", "disk almost full")
            .with_field("percent", 93)
            .with_field("mount", "/var log");

        assert_eq!(
            formatter.format(&event),
            "WARNING test disk almost full percent=93 mount=\"/var log\""
        );
    }

    #[test]
    fn test_text_is_single_line() {
        let formatter = Formatter::new(OutputFormat::Text, ContextFieldsConfig::default(), false);
        let event = LogEvent::new(Severity::Info, "t", "line1\nline2");
        assert_eq!(formatter.format(&event), "INFO t line1\\nline2");
    }

    #[test]
    fn test_text_error_carries_exception_details() {
        let formatter = Formatter::new(OutputFormat::Text, ContextFieldsConfig::default(), false);
        let mut exception =
            ExceptionInfo::new("IoError", "disk full").with_stacktrace("at main\nat run");
        exception.causes.push("no space left".to_string());
        let event = LogEvent::new(Severity::Error, "t", "boom").with_exception(exception.clone());

        assert_eq!(
            formatter.format(&event),
            "ERROR t boom exception=\"IoError: disk full\" causes=\"no space left\" stacktrace=\"at main\\nat run\""
        );

        let warning = LogEvent::new(Severity::Warning, "t", "w").with_exception(exception);
        assert_eq!(formatter.format(&warning), "WARNING t w");
    }

    #[test]
    fn test_text_context_key_wins_over_extra() {
        let context = ContextFieldsConfig {
            process: true,
            ..ContextFieldsConfig::default()
        };
        let formatter = Formatter::new(OutputFormat::Text, context, false);
        let event = LogEvent::new(Severity::Info, "t", "m").with_field("process", "spoof");

        let line = formatter.format(&event);
        assert_eq!(line, format!("INFO t m process={}", std::process::id()));
        assert_eq!(line.matches("process=").count(), 1);
    }

    #[test]
    fn test_text_values_are_quoted_and_escaped() {
        let formatter = Formatter::new(OutputFormat::Text, ContextFieldsConfig::default(), false);
        let event = LogEvent::new(Severity::Info, "t", "m")
            .with_field("query", "a=b")
            .with_field("quote", "say \"hi\"")
            .with_field("tab", "x\ty")
            .with_field("empty", "")
            .with_field("plain", "ok");

        assert_eq!(
            formatter.format(&event),
            "INFO t m query=\"a=b\" quote=\"say \\\"hi\\\"\" tab=\"x\ty\" empty=\"\" plain=ok"
        );
    }

    #[test]
    fn test_colored_level_keeps_name() {
        let formatter = Formatter::new(OutputFormat::Text, ContextFieldsConfig::default(), true);
        let line = formatter.format(&LogEvent::new(Severity::Critical, "t", "boom"));
        assert!(line.contains("CRITICAL"));
        assert!(line.ends_with("t boom"));
    }

    #[test]
    fn test_formatting_is_deterministic() {
        let formatter = Formatter::json();
        let event = LogEvent::new(Severity::Info, "t", "same").with_field("k", "v");
        assert_eq!(formatter.format(&event), formatter.format(&event));
    }
}
