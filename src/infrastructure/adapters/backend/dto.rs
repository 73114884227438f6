//! Collaborator Wire Types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Serialize)]
pub(super) struct StartConversationBody<'a> {
    pub language: &'a str,
    pub person: &'a str,
}

/// 创建会话响应
///
/// 成功时携带 id/url；失败时后端可能以 200 返回 `{error, message}`。
#[derive(Debug, Default, Deserialize)]
pub(super) struct StartConversationReply {
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub conversation_url: Option<String>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
}

impl StartConversationReply {
    /// 错误载荷中的状态码（`error` 字段为数字时）
    pub fn error_code(&self) -> Option<u16> {
        self.error
            .as_ref()
            .and_then(|v| v.as_u64())
            .and_then(|v| u16::try_from(v).ok())
    }

    /// 可读的错误描述
    pub fn error_message(&self) -> Option<String> {
        self.message.clone().or_else(|| match &self.error {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) if !other.is_null() => Some(other.to_string()),
            _ => None,
        })
    }

    pub fn is_error(&self) -> bool {
        self.error.as_ref().is_some_and(|v| !v.is_null())
    }
}

#[derive(Debug, Serialize)]
pub(super) struct TranslateBody<'a> {
    pub languages: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TranslateReply {
    #[serde(default)]
    pub translations: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub(super) struct ProcessVideosBody<'a> {
    pub videos: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ProcessVideosReply {
    pub summarization: SummarizationReply,
}

#[derive(Debug, Deserialize)]
pub(super) struct SummarizationReply {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// 结构化错误体（`{"error": "..."}` 或 `{"detail": "..."}`）
#[derive(Debug, Default, Deserialize)]
pub(super) struct ErrorReply {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorReply {
    pub fn into_message(self) -> Option<String> {
        self.error.or(self.message).or(self.detail)
    }
}
