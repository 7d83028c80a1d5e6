//! 控制台输出 Sink 实现
//!
//! 将记录写入标准输出或标准错误。每条记录在持有流锁期间一次写完。

use crate::sinks::traits::{line_bytes, LogSink, SinkError, SinkResult};
use std::io::{self, Write};

/// 控制台流
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleStream {
    Stdout,
    Stderr,
}

/// 控制台输出 Sink
#[derive(Debug, Clone)]
pub struct ConsoleSink {
    stream: ConsoleStream,
}

impl ConsoleSink {
    /// 创建新的控制台 Sink
    pub fn new(stream: ConsoleStream) -> Self {
        Self { stream }
    }

    pub fn stdout() -> Self {
        Self::new(ConsoleStream::Stdout)
    }

    pub fn stderr() -> Self {
        Self::new(ConsoleStream::Stderr)
    }

    pub fn stream(&self) -> ConsoleStream {
        self.stream
    }

    fn write_locked(&self, buf: &[u8]) -> io::Result<()> {
        match self.stream {
            ConsoleStream::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(buf)?;
                out.flush()
            }
            ConsoleStream::Stderr => {
                let mut err = io::stderr().lock();
                err.write_all(buf)?;
                err.flush()
            }
        }
    }
}

impl LogSink for ConsoleSink {
    fn write_record(&self, record: &str) -> SinkResult<()> {
        self.write_locked(&line_bytes(record))
            .map_err(|e| SinkError::from_io(self.name(), e))
    }

    fn flush(&self) -> SinkResult<()> {
        let result = match self.stream {
            ConsoleStream::Stdout => io::stdout().flush(),
            ConsoleStream::Stderr => io::stderr().flush(),
        };
        result.map_err(|e| SinkError::from_io(self.name(), e))
    }

    fn name(&self) -> &str {
        match self.stream {
            ConsoleStream::Stdout => "stdout",
            ConsoleStream::Stderr => "stderr",
        }
    }
}
