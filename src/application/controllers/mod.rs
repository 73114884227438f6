//! Controllers - 客户端核心控制器
//!
//! 每个控制器独占自己的状态，UI 外壳只读取快照并派发意图。

mod audio;
mod content;
mod session;
mod translation;

pub use audio::AudioPlaybackController;
pub use content::ContentService;
pub use session::SessionLifecycleController;
pub use translation::TranslationCache;
