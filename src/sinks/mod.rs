//! splitlog Sinks 模块
//!
//! 提供日志输出目标的实现：控制台（stdout / stderr）、文件和内存。

pub mod console;
pub mod file;
pub mod memory;
pub mod traits;

pub use console::{ConsoleSink, ConsoleStream};
pub use file::FileSink;
pub use memory::MemorySink;
pub use traits::{LogSink, SinkError, SinkResult};

use crate::config::SinkTarget;
use crate::error::Result;
use std::sync::Arc;

/// 根据配置的目标创建 sink
pub fn open_sink(target: &SinkTarget) -> Result<Arc<dyn LogSink>> {
    let sink: Arc<dyn LogSink> = match target {
        SinkTarget::Stdout => Arc::new(ConsoleSink::stdout()),
        SinkTarget::Stderr => Arc::new(ConsoleSink::stderr()),
        SinkTarget::File(path) => Arc::new(FileSink::open(path)?),
    };
    Ok(sink)
}
