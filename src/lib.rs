//! Echoframe - 实时对话与内容学习客户端核心
//!
//! 架构设计: Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - 会话句柄、翻译条目、播放状态、语言与分区
//!
//! 应用层 (application/):
//! - Ports: 协作方端口（Conversation, Translation, Speech, Content）与音频后端端口
//! - Controllers: 会话生命周期、翻译缓存、音频播放、内容服务
//! - Teardown: 幂等清理守卫
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: HTTP 协作方客户端、symphonia 缓冲播放后端
//! - Events: 客户端事件广播
//! - Console: 交互式命令行外壳

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
