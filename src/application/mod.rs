//! 应用层 - 客户端核心
//!
//! 包含：
//! - ports: 协作方与音频后端的端口定义
//! - controllers: 会话生命周期、翻译缓存、音频播放、内容服务
//! - teardown: 幂等清理守卫
//! - error: 错误分类

pub mod controllers;
pub mod error;
pub mod ports;
pub mod teardown;

#[cfg(test)]
pub(crate) mod testing;

pub use controllers::{
    AudioPlaybackController, ContentService, SessionLifecycleController, TranslationCache,
};
pub use error::{ClientError, ErrorKind};
pub use ports::{
    AudioBackendPort, ContentPort, ConversationCreated, ConversationPort, PlaybackEnded,
    PlaybackResource, SpeechPort, StartConversationRequest, TranslationPort,
};
pub use teardown::{IdempotentTeardown, TeardownPermit};
