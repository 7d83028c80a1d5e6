//! 文件输出 Sink
//!
//! 以追加模式打开文件，所有写入经由互斥锁串行化。

use crate::error::Result;
use crate::sinks::traits::{line_bytes, LogSink, SinkError, SinkResult};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// 文件输出 Sink
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    name: String,
    file: Mutex<File>,
}

impl FileSink {
    /// 打开（必要时创建）目标文件，父目录不存在时一并创建
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        tracing::debug!(path = %path.display(), "opened file sink");

        Ok(Self {
            name: format!("file:{}", path.display()),
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSink for FileSink {
    fn write_record(&self, record: &str) -> SinkResult<()> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| SinkError::Poisoned(self.name.clone()))?;
        file.write_all(&line_bytes(record))
            .map_err(|e| SinkError::from_io(&self.name, e))
    }

    fn flush(&self) -> SinkResult<()> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| SinkError::Poisoned(self.name.clone()))?;
        file.flush().map_err(|e| SinkError::from_io(&self.name, e))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
