//! Domain Errors

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("未知语言: {0}")]
    UnknownLanguage(String),

    #[error("未知界面分区: {0}")]
    UnknownSection(String),

    #[error("显示名称不能为空")]
    EmptyDisplayName,

    #[error("会话句柄不完整: id 与 url 必须同时存在")]
    IncompleteHandle,

    #[error("无效的 YouTube 链接: {0}")]
    InvalidVideoUrl(String),
}
