//! Event Publisher Implementation
//!
//! 客户端核心事件广播，UI 外壳订阅后渲染状态变化

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// 客户端事件类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// 会话创建成功
    ConversationStarted {
        conversation_id: String,
        conversation_url: String,
    },
    /// 会话创建失败
    ConversationFailed {
        kind: String,
        error: String,
    },
    /// 会话结束（confirmed 表示远端确认了清理）
    ConversationEnded {
        conversation_id: String,
        trigger: String,
        confirmed: bool,
    },
    /// 翻译完成
    TranslationReady {
        language: String,
    },
    /// 翻译失败
    TranslationFailed {
        language: String,
        error: String,
    },
    /// 翻译缓存失效
    TranslationsInvalidated {
        content_version: u64,
    },
    /// 开始播放
    PlaybackStarted {
        buffer_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        duration_ms: Option<u64>,
    },
    /// 播放停止（reason: stopped / finished / superseded）
    PlaybackStopped {
        buffer_id: String,
        reason: String,
    },
    /// 播放失败
    PlaybackFailed {
        kind: String,
        error: String,
    },
    /// 内容处理完成
    ContentProcessed {
        content_version: u64,
        videos: usize,
    },
}

/// 事件发布器
pub struct EventPublisher {
    channel: broadcast::Sender<ClientEvent>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { channel: tx }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 订阅所有事件
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.channel.subscribe()
    }

    pub fn publish_conversation_started(&self, conversation_id: &str, conversation_url: &str) {
        self.publish(ClientEvent::ConversationStarted {
            conversation_id: conversation_id.to_string(),
            conversation_url: conversation_url.to_string(),
        });
    }

    pub fn publish_conversation_failed(&self, kind: &str, error: &str) {
        self.publish(ClientEvent::ConversationFailed {
            kind: kind.to_string(),
            error: error.to_string(),
        });
    }

    pub fn publish_conversation_ended(
        &self,
        conversation_id: &str,
        trigger: &str,
        confirmed: bool,
    ) {
        self.publish(ClientEvent::ConversationEnded {
            conversation_id: conversation_id.to_string(),
            trigger: trigger.to_string(),
            confirmed,
        });
    }

    pub fn publish_translation_ready(&self, language: &str) {
        self.publish(ClientEvent::TranslationReady {
            language: language.to_string(),
        });
    }

    pub fn publish_translation_failed(&self, language: &str, error: &str) {
        self.publish(ClientEvent::TranslationFailed {
            language: language.to_string(),
            error: error.to_string(),
        });
    }

    pub fn publish_translations_invalidated(&self, content_version: u64) {
        self.publish(ClientEvent::TranslationsInvalidated { content_version });
    }

    pub fn publish_playback_started(&self, buffer_id: &str, duration_ms: Option<u64>) {
        self.publish(ClientEvent::PlaybackStarted {
            buffer_id: buffer_id.to_string(),
            duration_ms,
        });
    }

    pub fn publish_playback_stopped(&self, buffer_id: &str, reason: &str) {
        self.publish(ClientEvent::PlaybackStopped {
            buffer_id: buffer_id.to_string(),
            reason: reason.to_string(),
        });
    }

    pub fn publish_playback_failed(&self, kind: &str, error: &str) {
        self.publish(ClientEvent::PlaybackFailed {
            kind: kind.to_string(),
            error: error.to_string(),
        });
    }

    pub fn publish_content_processed(&self, content_version: u64, videos: usize) {
        self.publish(ClientEvent::ContentProcessed {
            content_version,
            videos,
        });
    }

    fn publish(&self, event: ClientEvent) {
        if let Err(e) = self.channel.send(event) {
            tracing::debug!(error = %e, "Failed to publish event (no receivers)");
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}
