//! Application Ports - 出站端口定义
//!
//! 定义客户端核心与协作方、音频后端之间的抽象接口

mod audio_backend;
mod content;
mod conversation;
mod speech;
mod translation;

pub use audio_backend::{AudioBackendPort, PlaybackEnded, PlaybackResource};
pub use content::ContentPort;
pub use conversation::{ConversationCreated, ConversationPort, StartConversationRequest};
pub use speech::SpeechPort;
pub use translation::TranslationPort;
