//! 用户提示
//!
//! 请求失败的错误提示与守卫的权限警告都经由 [`Notifier`] 发出。

use tracing::{error, warn};

/// 提示通道
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    fn error(&self, message: &str);
    fn warning(&self, message: &str);
}

/// 写入日志的默认实现
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn error(&self, message: &str) {
        error!(target: "notify", "{}", message);
    }

    fn warning(&self, message: &str) {
        warn!(target: "notify", "{}", message);
    }
}
