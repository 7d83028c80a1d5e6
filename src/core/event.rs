//! 日志事件定义
//!
//! 此模块定义了路由器处理的核心事件结构 [`LogEvent`]。
//! 事件在调用点构造，构造完成后不再修改，投递后即被丢弃。

use crate::core::severity::Severity;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error as StdError;
use std::fmt;

/// 附加字段的值
///
/// 能够序列化为 JSON 的值以 `Json` 保存；序列化失败的值退化为其
/// `Debug` 表示，事件仍然会被输出。
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// 正常序列化的 JSON 值
    Json(Value),
    /// 序列化失败时的字符串替代
    Fallback(String),
}

impl FieldValue {
    /// 尝试序列化任意值，失败时退化为字符串
    pub fn capture<V: Serialize + fmt::Debug + ?Sized>(value: &V) -> Self {
        match serde_json::to_value(value) {
            Ok(json) => FieldValue::Json(json),
            Err(_) => FieldValue::Fallback(format!("{:?}", value)),
        }
    }

    /// 转换为可直接写入记录的 JSON 值
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Json(v) => v.clone(),
            FieldValue::Fallback(s) => Value::String(s.clone()),
        }
    }

    /// 是否是退化后的值
    pub fn is_fallback(&self) -> bool {
        matches!(self, FieldValue::Fallback(_))
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::Json(value)
    }
}

/// 异常信息
///
/// 仅在 ERROR / CRITICAL 级别的记录中输出。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionInfo {
    /// 错误类型名
    pub kind: String,
    /// 错误消息
    pub message: String,
    /// `source()` 链上的各级原因
    pub causes: Vec<String>,
    /// 调用栈（仅当 backtrace 被启用时可用）
    pub stacktrace: Option<String>,
}

impl ExceptionInfo {
    /// 手动构造异常信息
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            causes: Vec::new(),
            stacktrace: None,
        }
    }

    /// 从错误值捕获异常信息，包括原因链和当前调用栈
    pub fn from_error<E: StdError + 'static>(err: &E) -> Self {
        Self::from_dyn_error(short_type_name::<E>(), err)
    }

    /// 类型已被擦除时使用，`kind` 由调用方给出
    pub fn from_dyn_error(kind: &str, err: &(dyn StdError + 'static)) -> Self {
        let mut causes = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }

        let backtrace = Backtrace::capture();
        let stacktrace = match backtrace.status() {
            BacktraceStatus::Captured => Some(backtrace.to_string()),
            _ => None,
        };

        Self {
            kind: kind.to_string(),
            message: err.to_string(),
            causes,
            stacktrace,
        }
    }

    /// 附加调用栈文本
    pub fn with_stacktrace(mut self, stacktrace: impl Into<String>) -> Self {
        self.stacktrace = Some(stacktrace.into());
        self
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    // 去掉泛型参数后再取最后一段路径
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// 日志事件
///
/// 包含时间戳、级别、记录器名称、消息、位置参数、附加字段和可选的异常信息。
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    timestamp: DateTime<Utc>,
    severity: Severity,
    logger_name: String,
    message: String,
    args: Vec<Value>,
    fields: Vec<(String, FieldValue)>,
    exception: Option<ExceptionInfo>,
    thread_name: Option<String>,
}

impl LogEvent {
    /// 创建新的日志事件，时间戳取当前时间
    pub fn new(
        severity: Severity,
        logger_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            severity,
            logger_name: logger_name.into(),
            message: message.into(),
            args: Vec::new(),
            fields: Vec::new(),
            exception: None,
            thread_name: std::thread::current().name().map(str::to_string),
        }
    }

    /// 添加一个附加字段；同名字段会被覆盖但保留原位置
    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Serialize + fmt::Debug,
    {
        self.insert_field(key.into(), FieldValue::capture(&value));
        self
    }

    /// 批量添加附加字段
    pub fn with_fields<I, K>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, FieldValue)>,
        K: Into<String>,
    {
        for (key, value) in fields {
            self.insert_field(key.into(), value);
        }
        self
    }

    /// 设置消息的位置参数，用于替换 `%s` 等占位符
    pub fn with_args<I, V>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Serialize + fmt::Debug,
    {
        self.args = args
            .into_iter()
            .map(|arg| FieldValue::capture(&arg).to_json())
            .collect();
        self
    }

    /// 附加异常信息
    pub fn with_exception(mut self, exception: ExceptionInfo) -> Self {
        self.exception = Some(exception);
        self
    }

    /// 从错误值捕获并附加异常信息
    pub fn with_error<E: StdError + 'static>(self, err: &E) -> Self {
        self.with_exception(ExceptionInfo::from_error(err))
    }

    /// 覆盖时间戳
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    fn insert_field(&mut self, key: String, value: FieldValue) {
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn logger_name(&self) -> &str {
        &self.logger_name
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn fields(&self) -> &[(String, FieldValue)] {
        &self.fields
    }

    pub fn exception(&self) -> Option<&ExceptionInfo> {
        self.exception.as_ref()
    }

    pub fn thread_name(&self) -> Option<&str> {
        self.thread_name.as_deref()
    }

    /// 退化为字符串的附加字段数量
    pub fn fallback_count(&self) -> usize {
        self.fields.iter().filter(|(_, v)| v.is_fallback()).count()
    }

    /// 渲染最终消息
    ///
    /// 没有位置参数时消息原样返回。占位符多于参数时多出的占位符保持原样，
    /// 参数多于占位符时剩余参数以空格拼接在末尾。
    pub fn message(&self) -> String {
        if self.args.is_empty() {
            return self.message.clone();
        }

        let mut out = String::with_capacity(self.message.len() + 16);
        let mut args = self.args.iter();
        let mut chars = self.message.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '%' {
                out.push(c);
                continue;
            }
            match chars.peek().copied() {
                Some('%') => {
                    chars.next();
                    out.push('%');
                }
                Some(spec @ ('s' | 'r' | 'd' | 'i' | 'f')) => {
                    chars.next();
                    match args.next() {
                        Some(arg) => out.push_str(&render_arg(spec, arg)),
                        None => {
                            out.push('%');
                            out.push(spec);
                        }
                    }
                }
                _ => out.push('%'),
            }
        }

        for extra in args {
            out.push(' ');
            out.push_str(&render_arg('s', extra));
        }
        out
    }
}

fn render_arg(spec: char, arg: &Value) -> String {
    match (spec, arg) {
        ('s', Value::String(s)) => s.clone(),
        ('r', _) => arg.to_string(),
        ('d' | 'i', Value::Number(n)) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i.to_string(),
            (_, Some(u), _) => u.to_string(),
            (_, _, Some(f)) => (f.trunc() as i64).to_string(),
            _ => n.to_string(),
        },
        ('f', Value::Number(n)) => match n.as_f64() {
            Some(f) => format!("{:.6}", f),
            None => n.to_string(),
        },
        (_, Value::String(s)) => s.clone(),
        _ => arg.to_string(),
    }
}
