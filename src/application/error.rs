//! 客户端核心错误定义
//!
//! 所有异步操作最终落到成功状态或以下分类之一

use serde::Serialize;
use thiserror::Error;

use crate::domain::DomainError;

/// 错误分类（暴露给 UI）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Capacity,
    Transport,
    NoContent,
    Decode,
    StaleResponseDiscard,
}

/// 客户端错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// 必填输入缺失，在任何网络调用之前拒绝
    #[error("Validation error: {0}")]
    Validation(String),

    /// 协作方并发/配额上限
    #[error("Capacity reached: {0}")]
    Capacity(String),

    /// 网络或解析失败
    #[error("Transport error{}: {message}", status_suffix(.status))]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// 后端尚无已处理的内容
    #[error("No processed content yet")]
    NoContent,

    /// 音频解码失败
    #[error("Decode error: {0}")]
    Decode(String),

    /// 已被取代的请求完成，结果被丢弃
    #[error("Stale response discarded")]
    Stale,
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default()
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn capacity(message: impl Into<String>) -> Self {
        Self::Capacity(message.into())
    }

    pub fn transport(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Transport {
            status,
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Validation(_) => ErrorKind::Validation,
            ClientError::Capacity(_) => ErrorKind::Capacity,
            ClientError::Transport { .. } => ErrorKind::Transport,
            ClientError::NoContent => ErrorKind::NoContent,
            ClientError::Decode(_) => ErrorKind::Decode,
            ClientError::Stale => ErrorKind::StaleResponseDiscard,
        }
    }

    /// 过期丢弃不向用户展示
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, ClientError::Stale)
    }
}

impl From<DomainError> for ClientError {
    fn from(err: DomainError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        let status = err.status().map(|s| s.as_u16());
        if err.is_timeout() {
            Self::transport(status, "Request timeout")
        } else if err.is_connect() {
            Self::transport(status, format!("Cannot connect to backend: {}", err))
        } else if err.is_decode() {
            Self::transport(status, format!("Invalid response body: {}", err))
        } else {
            Self::transport(status, err.to_string())
        }
    }
}
