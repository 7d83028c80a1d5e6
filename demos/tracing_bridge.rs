//! 通过 tracing 宏记录日志
//!
//! 路由器被安装为全局订阅器后，普通的 `tracing` 宏调用即按级别分流。

use splitlog::{init_with_config, ContextFieldsConfig, RouterConfig};
use tracing::{debug, error, info, warn};

fn main() -> anyhow::Result<()> {
    let mut config = RouterConfig::default();
    config.context_fields = ContextFieldsConfig {
        timestamp: true,
        process: true,
        ..Default::default()
    };
    let router = init_with_config(config)?;

    info!("test");
    warn!("test");
    error!("test");
    debug!(user_id = 12345, action = "login", "user logged in");

    router.flush()?;
    Ok(())
}
