//! Domain Layer - 领域层
//!
//! 客户端核心的值对象与状态:
//! - session: 远程会话句柄、阶段与结束触发源
//! - translation: 单语言翻译条目
//! - playback: 音频播放状态
//! - content: 待处理视频链接
//! - language: 语言与界面分区

mod content;
mod errors;
mod language;
mod playback;
mod session;
mod translation;

pub use content::VideoUrl;
pub use errors::DomainError;
pub use language::{Language, Section};
pub use playback::{PlaybackSnapshot, PlaybackState};
pub use session::{
    DisplayName, ExitTrigger, RemoteResourceHandle, SessionPhase, SessionSnapshot,
};
pub use translation::TranslationEntry;
