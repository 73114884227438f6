//! Idempotent Teardown - 幂等清理守卫
//!
//! 多个触发源调用同一清理动作时，每个句柄同一时刻最多只有一次清理在执行；
//! 清理完成后守卫在冷却窗口内保持"已尝试"，窗口结束后由重置定时器清除。

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// 单个句柄的守卫状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GuardSlot {
    /// 清理正在执行
    InFlight,
    /// 清理已完成，冷却到指定时刻
    CoolingDown { until: Instant },
}

struct GuardInner {
    slots: DashMap<String, GuardSlot>,
    cooldown: Duration,
}

/// 幂等清理守卫（按句柄 key 区分）
#[derive(Clone)]
pub struct IdempotentTeardown {
    inner: Arc<GuardInner>,
}

impl IdempotentTeardown {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            inner: Arc::new(GuardInner {
                slots: DashMap::new(),
                cooldown,
            }),
        }
    }

    /// 尝试取得清理许可
    ///
    /// 已有清理在执行或仍在冷却窗口内时返回 `None`。
    pub fn try_acquire(&self, key: &str) -> Option<TeardownPermit> {
        let now = Instant::now();
        match self.inner.slots.entry(key.to_string()) {
            Entry::Vacant(vacant) => {
                vacant.insert(GuardSlot::InFlight);
            }
            Entry::Occupied(mut occupied) => match *occupied.get() {
                GuardSlot::InFlight => return None,
                GuardSlot::CoolingDown { until } if now < until => return None,
                GuardSlot::CoolingDown { .. } => {
                    occupied.insert(GuardSlot::InFlight);
                }
            },
        }

        tracing::trace!(key = %key, "Teardown permit acquired");
        Some(TeardownPermit {
            key: key.to_string(),
            inner: Arc::clone(&self.inner),
        })
    }

    /// 指定句柄是否处于"已尝试"状态（执行中或冷却中）
    pub fn is_attempted(&self, key: &str) -> bool {
        match self.inner.slots.get(key).map(|slot| *slot) {
            Some(GuardSlot::InFlight) => true,
            Some(GuardSlot::CoolingDown { until }) => Instant::now() < until,
            None => false,
        }
    }

    /// 在守卫下执行清理动作，未取得许可时不执行并返回 `None`
    pub async fn run<F, Fut, T>(&self, key: &str, action: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let permit = self.try_acquire(key)?;
        let output = action().await;
        drop(permit);
        Some(output)
    }
}

/// 清理许可
///
/// 释放时（包括调用方 future 被丢弃）进入冷却，并安排重置定时器。
pub struct TeardownPermit {
    key: String,
    inner: Arc<GuardInner>,
}

impl TeardownPermit {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for TeardownPermit {
    fn drop(&mut self) {
        let until = Instant::now() + self.inner.cooldown;
        self.inner
            .slots
            .insert(self.key.clone(), GuardSlot::CoolingDown { until });

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            // 无运行时时依赖 try_acquire 的惰性过期判断
            return;
        };

        let inner = Arc::clone(&self.inner);
        let key = self.key.clone();
        runtime.spawn(async move {
            tokio::time::sleep_until(until).await;
            let removed = inner.slots.remove_if(&key, |_, slot| {
                matches!(slot, GuardSlot::CoolingDown { until: u } if *u <= Instant::now())
            });
            if removed.is_some() {
                tracing::trace!(key = %key, "Teardown guard reset");
            }
        });
    }
}
