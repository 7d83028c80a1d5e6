//! 按级别分流示例
//!
//! DEBUG / INFO / WARNING 写入 stdout，ERROR / CRITICAL 写入 stderr。
//! 运行 `cargo run --example segregation 2>/dev/null` 只会看到前者。

use splitlog::{load_config_from_file, EnvConfig, LogRouter, RouterConfig, Severity};
use std::path::Path;

#[derive(Debug)]
struct QuotaExceeded {
    limit: u32,
}

impl std::fmt::Display for QuotaExceeded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "quota of {} requests exceeded", self.limit)
    }
}

impl std::error::Error for QuotaExceeded {}

fn main() -> anyhow::Result<()> {
    // 可选：第一个参数为 TOML 配置文件路径
    let config = match std::env::args().nth(1) {
        Some(path) => load_config_from_file(Path::new(&path))?,
        None => RouterConfig::default(),
    };
    let config = EnvConfig::apply(config)?;
    let router = LogRouter::from_config(config)?;

    let root = router.logger("root");
    for _ in 0..3 {
        root.debug("test")?;
        root.info("test")?;
        root.warning("test")?;
    }

    let api = router.logger("api");
    let event = api
        .event(Severity::Info, "request served")
        .with_field("status", 200)
        .with_field("path", "/users");
    api.emit(event)?;

    api.error("test")?;
    api.exception("request rejected", &QuotaExceeded { limit: 100 })?;
    api.critical("test")?;

    router.flush()?;

    let stats = router.diagnostics();
    eprintln!(
        "low={} high={} filtered={}",
        stats.low_writes, stats.high_writes, stats.events_filtered
    );
    Ok(())
}
