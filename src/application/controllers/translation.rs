//! Translation Cache - 按语言缓存译文并合并并发请求
//!
//! 同一内容版本下每种语言最多请求一次；同一语言在 `Loading` 期间的重复请求
//! 不会产生第二次网络调用，而是等待同一个结果。内容变化时整体失效。

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures_util::future::join_all;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

use crate::application::ports::TranslationPort;
use crate::domain::{Language, TranslationEntry};
use crate::infrastructure::events::EventPublisher;

/// 单语言缓存槽
struct Slot {
    entry: TranslationEntry,
    /// 发起请求时的内容版本
    version: u64,
    /// 结果广播，等待者订阅它
    settled: watch::Sender<TranslationEntry>,
}

impl Slot {
    fn loading(version: u64) -> Self {
        let (settled, _) = watch::channel(TranslationEntry::Loading);
        Self {
            entry: TranslationEntry::Loading,
            version,
            settled,
        }
    }
}

/// 请求方在本次调用中的角色
enum Role {
    Cached(TranslationEntry),
    Waiter(watch::Receiver<TranslationEntry>),
    Leader(u64, watch::Receiver<TranslationEntry>),
}

struct CacheShared {
    translator: Arc<dyn TranslationPort>,
    events: Arc<EventPublisher>,
    slots: DashMap<Language, Slot>,
    content_version: AtomicU64,
}

/// 翻译缓存
#[derive(Clone)]
pub struct TranslationCache {
    inner: Arc<CacheShared>,
}

impl TranslationCache {
    pub fn new(translator: Arc<dyn TranslationPort>, events: Arc<EventPublisher>) -> Self {
        Self {
            inner: Arc::new(CacheShared {
                translator,
                events,
                slots: DashMap::new(),
                content_version: AtomicU64::new(0),
            }),
        }
    }

    /// 当前内容版本
    pub fn content_version(&self) -> u64 {
        self.inner.content_version.load(Ordering::SeqCst)
    }

    /// 同步读取条目状态
    pub fn get(&self, language: Language) -> TranslationEntry {
        self.inner
            .slots
            .get(&language)
            .map(|slot| slot.entry.clone())
            .unwrap_or_default()
    }

    /// 所有语言的当前状态
    pub fn entries(&self) -> Vec<(Language, TranslationEntry)> {
        Language::ALL
            .into_iter()
            .map(|language| (language, self.get(language)))
            .collect()
    }

    /// 请求指定语言的译文
    ///
    /// - `Ready`: 直接返回缓存
    /// - `Loading`: 等待进行中的请求
    /// - `NotRequested` / `Failed`: 发起一次请求
    pub async fn request(&self, language: Language) -> TranslationEntry {
        let rx = match self.claim(language) {
            Role::Cached(entry) => return entry,
            Role::Waiter(rx) => {
                tracing::debug!(language = %language, "Joining in-flight translation request");
                rx
            }
            Role::Leader(version, rx) => {
                // 请求在独立任务中完成，调用方被取消时槽位仍会落定
                let cache = self.clone();
                tokio::spawn(async move { cache.fetch(language, version).await });
                rx
            }
        };
        self.wait_settled(language, rx).await
    }

    /// 并发请求多种语言
    pub async fn request_many(&self, languages: &[Language]) -> Vec<(Language, TranslationEntry)> {
        let requests = languages.iter().map(|&language| async move {
            (language, self.request(language).await)
        });
        join_all(requests).await
    }

    /// 源内容变化：所有条目回到 `NotRequested`
    pub fn invalidate(&self) {
        let version = self.inner.content_version.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.slots.clear();
        tracing::info!(content_version = version, "Translation cache invalidated");
        self.inner.events.publish_translations_invalidated(version);
    }

    async fn wait_settled(
        &self,
        language: Language,
        mut rx: watch::Receiver<TranslationEntry>,
    ) -> TranslationEntry {
        match rx.wait_for(TranslationEntry::is_settled).await {
            Ok(entry) => entry.clone(),
            // 请求期间缓存已失效
            Err(_) => self.get(language),
        }
    }

    fn claim(&self, language: Language) -> Role {
        match self.inner.slots.entry(language) {
            Entry::Occupied(mut occupied) => match &occupied.get().entry {
                TranslationEntry::Ready(_) => Role::Cached(occupied.get().entry.clone()),
                TranslationEntry::Loading => Role::Waiter(occupied.get().settled.subscribe()),
                TranslationEntry::NotRequested | TranslationEntry::Failed(_) => {
                    let version = self.content_version();
                    let slot = Slot::loading(version);
                    let rx = slot.settled.subscribe();
                    occupied.insert(slot);
                    Role::Leader(version, rx)
                }
            },
            Entry::Vacant(vacant) => {
                let version = self.content_version();
                let slot = Slot::loading(version);
                let rx = slot.settled.subscribe();
                vacant.insert(slot);
                Role::Leader(version, rx)
            }
        }
    }

    async fn fetch(&self, language: Language, version: u64) {
        tracing::debug!(language = %language, content_version = version, "Requesting translation");

        let settled = match self.inner.translator.translate(language).await {
            Ok(text) => TranslationEntry::Ready(text),
            Err(e) => TranslationEntry::Failed(e.to_string()),
        };

        let applied = match self.inner.slots.get_mut(&language) {
            Some(mut slot)
                if slot.version == version
                    && slot.entry == TranslationEntry::Loading
                    && self.content_version() == version =>
            {
                slot.entry = settled.clone();
                slot.settled.send_replace(settled.clone());
                true
            }
            _ => false,
        };

        if !applied {
            tracing::debug!(
                language = %language,
                content_version = version,
                "Discarding stale translation response"
            );
            return;
        }

        match &settled {
            TranslationEntry::Ready(text) => {
                tracing::info!(language = %language, text_len = text.len(), "Translation ready");
                self.inner.events.publish_translation_ready(language.code());
            }
            TranslationEntry::Failed(error) => {
                tracing::warn!(language = %language, error = %error, "Translation failed");
                self.inner
                    .events
                    .publish_translation_failed(language.code(), error);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::error::ClientError;
    use crate::application::testing::FakeTranslator;

    fn cache(fake: &Arc<FakeTranslator>) -> TranslationCache {
        TranslationCache::new(fake.clone(), EventPublisher::new().arc())
    }

    #[tokio::test]
    async fn test_get_defaults_to_not_requested() {
        let fake = FakeTranslator::new();
        let cache = cache(&fake);

        assert_eq!(cache.get(Language::Spanish), TranslationEntry::NotRequested);
        assert!(cache
            .entries()
            .iter()
            .all(|(_, entry)| *entry == TranslationEntry::NotRequested));
    }

    #[tokio::test]
    async fn test_back_to_back_requests_coalesce() {
        let fake = FakeTranslator::new();
        let cache = cache(&fake);

        let (first, second) = tokio::join!(
            cache.request(Language::Spanish),
            cache.request(Language::Spanish)
        );

        assert_eq!(fake.call_count(), 1);
        assert_eq!(first, second);
        assert_eq!(first, TranslationEntry::Ready("[es#1] translated".to_string()));
    }

    #[tokio::test]
    async fn test_loading_is_visible_while_in_flight() {
        let fake = FakeTranslator::new();
        let gate = fake.hold();
        let cache = cache(&fake);

        let pending = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.request(Language::French).await })
        };
        while fake.call_count() == 0 {
            tokio::task::yield_now().await;
        }
        assert_eq!(cache.get(Language::French), TranslationEntry::Loading);

        gate.notify_one();
        let entry = pending.await.unwrap();
        assert!(entry.is_settled());
        assert_eq!(cache.get(Language::French), entry);
    }

    #[tokio::test]
    async fn test_cancelled_request_still_settles_slot() {
        let fake = FakeTranslator::new();
        let gate = fake.hold();
        let cache = cache(&fake);

        let first = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            cache.request(Language::Spanish),
        )
        .await;
        assert!(first.is_err());
        assert_eq!(cache.get(Language::Spanish), TranslationEntry::Loading);

        gate.notify_one();
        let second = tokio::time::timeout(
            std::time::Duration::from_secs(2),
            cache.request(Language::Spanish),
        )
        .await
        .unwrap();

        assert_eq!(second, TranslationEntry::Ready("[es#1] translated".to_string()));
        assert_eq!(cache.get(Language::Spanish), second);
        assert_eq!(fake.call_count(), 1);
    }

    #[tokio::test]
    async fn test_ready_entry_is_not_refetched() {
        let fake = FakeTranslator::new();
        let cache = cache(&fake);

        cache.request(Language::German).await;
        cache.request(Language::German).await;

        assert_eq!(fake.call_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_entry_retries_on_request() {
        let fake = FakeTranslator::new();
        fake.fail_next(ClientError::transport(Some(500), "upstream"));
        let cache = cache(&fake);

        let entry = cache.request(Language::Urdu).await;
        assert!(matches!(entry, TranslationEntry::Failed(_)));
        assert_eq!(cache.get(Language::Urdu), entry);

        let entry = cache.request(Language::Urdu).await;
        assert_eq!(entry, TranslationEntry::Ready("[ur#2] translated".to_string()));
        assert_eq!(fake.call_count(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_resets_and_refetches() {
        let fake = FakeTranslator::new();
        let cache = cache(&fake);

        cache
            .request_many(&[Language::Spanish, Language::Hindi])
            .await;
        assert_eq!(fake.call_count(), 2);

        cache.invalidate();
        assert_eq!(cache.content_version(), 1);
        assert_eq!(cache.get(Language::Spanish), TranslationEntry::NotRequested);
        assert_eq!(cache.get(Language::Hindi), TranslationEntry::NotRequested);

        let entry = cache.request(Language::Spanish).await;
        assert_eq!(fake.call_count(), 3);
        assert_eq!(entry, TranslationEntry::Ready("[es#3] translated".to_string()));
    }

    #[tokio::test]
    async fn test_response_for_previous_content_is_discarded() {
        let fake = FakeTranslator::new();
        let gate = fake.hold();
        let cache = cache(&fake);

        let pending = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.request(Language::Spanish).await })
        };
        while fake.call_count() == 0 {
            tokio::task::yield_now().await;
        }

        cache.invalidate();
        gate.notify_one();

        let entry = pending.await.unwrap();
        assert_eq!(entry, TranslationEntry::NotRequested);
        assert_eq!(cache.get(Language::Spanish), TranslationEntry::NotRequested);
    }
}
