//! 路由器的内部诊断与指标。
//!
//! 每个 [`LogRouter`](crate::LogRouter) 持有自己的计数器，互不影响。

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// 内部诊断与指标数据结构。
///
/// 使用原子操作确保线程安全。
#[derive(Debug)]
pub struct Diagnostics {
    /// 创建时间
    start_time: Instant,

    /// 成功写入的记录总数
    events_emitted: AtomicU64,

    /// 因低于阈值而丢弃的事件数
    events_filtered: AtomicU64,

    /// 写入 low sink 的记录数
    low_writes: AtomicU64,

    /// 写入 high sink 的记录数
    high_writes: AtomicU64,

    /// sink 写入失败次数
    sink_errors: AtomicU64,

    /// 退化为字符串的附加字段数
    field_fallbacks: AtomicU64,
}

/// 诊断数据的快照，用于外部查询。
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticsSnapshot {
    pub uptime: Duration,
    pub events_emitted: u64,
    pub events_filtered: u64,
    pub low_writes: u64,
    pub high_writes: u64,
    pub sink_errors: u64,
    pub field_fallbacks: u64,
    /// 写入成功率（百分比），没有任何写入尝试时为 100
    pub success_rate_percent: f64,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagnostics {
    /// 创建新的诊断实例。
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            events_emitted: AtomicU64::new(0),
            events_filtered: AtomicU64::new(0),
            low_writes: AtomicU64::new(0),
            high_writes: AtomicU64::new(0),
            sink_errors: AtomicU64::new(0),
            field_fallbacks: AtomicU64::new(0),
        }
    }

    pub fn increment_events_filtered(&self) {
        self.events_filtered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_low_writes(&self) {
        self.low_writes.fetch_add(1, Ordering::Relaxed);
        self.events_emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_high_writes(&self) {
        self.high_writes.fetch_add(1, Ordering::Relaxed);
        self.events_emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_sink_errors(&self) {
        self.sink_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_field_fallbacks(&self, count: u64) {
        if count > 0 {
            self.field_fallbacks.fetch_add(count, Ordering::Relaxed);
        }
    }

    /// 获取诊断数据的快照。
    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        let events_emitted = self.events_emitted.load(Ordering::Relaxed);
        let sink_errors = self.sink_errors.load(Ordering::Relaxed);

        let attempts = events_emitted + sink_errors;
        let success_rate_percent = if attempts > 0 {
            (events_emitted as f64 / attempts as f64) * 100.0
        } else {
            100.0
        };

        DiagnosticsSnapshot {
            uptime: self.start_time.elapsed(),
            events_emitted,
            events_filtered: self.events_filtered.load(Ordering::Relaxed),
            low_writes: self.low_writes.load(Ordering::Relaxed),
            high_writes: self.high_writes.load(Ordering::Relaxed),
            sink_errors,
            field_fallbacks: self.field_fallbacks.load(Ordering::Relaxed),
            success_rate_percent,
        }
    }
}
