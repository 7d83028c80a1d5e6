//! splitlog Sink Traits
//!
//! 定义了统一的 Sink trait 接口，允许开发者实现自定义的日志输出目标。
//!
//! 写入是同步的，发生在调用 `emit` 的线程上。每个 sink 必须自行串行化
//! 并发写入，保证两条记录不会在中途交错。
//!
//! # 使用示例
//!
//! ```rust
//! use splitlog::sinks::{LogSink, SinkResult};
//! use std::sync::Mutex;
//!
//! #[derive(Debug, Default)]
//! struct CountingSink {
//!     count: Mutex<usize>,
//! }
//!
//! impl LogSink for CountingSink {
//!     fn write_record(&self, _record: &str) -> SinkResult<()> {
//!         *self.count.lock().unwrap() += 1;
//!         Ok(())
//!     }
//!
//!     fn name(&self) -> &str {
//!         "counting"
//!     }
//! }
//! ```

use std::fmt::Debug;
use std::io;
use thiserror::Error;

/// Sink 操作结果
pub type SinkResult<T> = std::result::Result<T, SinkError>;

/// Sink 错误类型
#[derive(Error, Debug)]
pub enum SinkError {
    /// 底层 I/O 错误
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// 输出流已关闭（例如管道的读端已退出）
    #[error("sink '{0}' is closed")]
    Closed(String),

    /// 另一个线程在持有锁时 panic
    #[error("sink '{0}' lock poisoned")]
    Poisoned(String),
}

impl SinkError {
    /// 将 I/O 错误归类：断开的管道视为流已关闭
    pub fn from_io(name: &str, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::BrokenPipe | io::ErrorKind::WriteZero => {
                SinkError::Closed(name.to_string())
            }
            _ => SinkError::Io(err),
        }
    }
}

/// 基础 Sink trait
///
/// 所有日志输出目标都必须实现此 trait。
pub trait LogSink: Send + Sync + Debug {
    /// 写入一条已格式化的记录
    ///
    /// `record` 不含结尾换行符；实现负责追加换行并在一次加锁内完成写入。
    fn write_record(&self, record: &str) -> SinkResult<()>;

    /// 刷新缓冲区
    fn flush(&self) -> SinkResult<()> {
        Ok(())
    }

    /// 获取 sink 的名称，用于诊断和错误信息
    fn name(&self) -> &str;
}

/// 给记录追加换行符，得到一次写入所需的完整字节
pub(crate) fn line_bytes(record: &str) -> Vec<u8> {
    let mut buf = Vec::with_capacity(record.len() + 1);
    buf.extend_from_slice(record.as_bytes());
    buf.push(b'\n');
    buf
}
