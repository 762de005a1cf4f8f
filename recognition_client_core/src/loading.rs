//! 全局加载状态计数
//!
//! 每个请求派发时加一、结束时减一（成功、失败、被丢弃均会结束）。
//! 仅在 0→1 与 1→0 时翻转可见状态，多个并发请求共享同一个加载提示。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

/// 加载计数器
#[derive(Clone)]
pub struct LoadingCounter {
    inner: Arc<Inner>,
}

struct Inner {
    count: AtomicUsize,
    visible: watch::Sender<bool>,
}

impl Default for LoadingCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadingCounter {
    pub fn new() -> Self {
        let (visible, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                count: AtomicUsize::new(0),
                visible,
            }),
        }
    }

    /// 当前进行中的请求数
    pub fn count(&self) -> usize {
        self.inner.count.load(Ordering::SeqCst)
    }

    pub fn is_visible(&self) -> bool {
        *self.inner.visible.borrow()
    }

    /// 订阅加载提示的显示/隐藏
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.inner.visible.subscribe()
    }

    /// 开始一个请求，返回的守卫在释放时结束该请求
    pub fn begin(&self) -> LoadingGuard {
        if self.inner.count.fetch_add(1, Ordering::SeqCst) == 0 {
            debug!("[Loading] Start");
            self.inner.visible.send_replace(true);
        }
        LoadingGuard {
            counter: self.clone(),
        }
    }

    fn end(&self) {
        let previous = self
            .inner
            .count
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| Some(n.saturating_sub(1)))
            .unwrap_or(0);
        if previous == 1 {
            debug!("[Loading] End");
            self.inner.visible.send_replace(false);
        }
    }
}

/// 加载守卫
#[must_use = "the request is considered finished as soon as the guard is dropped"]
pub struct LoadingGuard {
    counter: LoadingCounter,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.counter.end();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_flips_only_on_edges() {
        let counter = LoadingCounter::new();
        let rx = counter.subscribe();
        assert!(!counter.is_visible());

        let a = counter.begin();
        assert!(*rx.borrow());
        let b = counter.begin();
        assert_eq!(counter.count(), 2);

        drop(a);
        assert!(counter.is_visible());
        drop(b);
        assert!(!counter.is_visible());
        assert_eq!(counter.count(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_guards_return_to_zero() {
        let counter = LoadingCounter::new();
        let mut handles = Vec::new();
        for i in 0..32u64 {
            let counter = counter.clone();
            handles.push(tokio::spawn(async move {
                let _guard = counter.begin();
                tokio::time::sleep(std::time::Duration::from_millis(i % 5)).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(counter.count(), 0);
        assert!(!counter.is_visible());
    }
}
