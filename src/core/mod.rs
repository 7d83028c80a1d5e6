//! splitlog 核心模块
//!
//! 本模块包含事件定义、严重级别、格式化器、路由表、路由器以及 tracing 桥接层。

pub mod event;
pub mod formatter;
pub mod layer;
pub mod router;
pub mod routing;
pub mod severity;

// 重新导出核心类型
pub use event::{ExceptionInfo, FieldValue, LogEvent};
pub use formatter::Formatter;
pub use layer::{install_global, RouterLayer};
pub use router::{Delivery, LogRouter, LogRouterBuilder, Logger};
pub use routing::{RouteTable, RoutingRule, SinkRole};
pub use severity::Severity;
