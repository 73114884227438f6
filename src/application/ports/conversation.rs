//! Conversation Port - 远程会话协作方
//!
//! POST /start-conversation {language, person} → {conversation_id, conversation_url}
//! POST /end-conversation/{conversation_id}

use async_trait::async_trait;
use serde::Serialize;

use crate::application::error::ClientError;

/// 创建会话请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartConversationRequest {
    /// 语言显示名称，例如 "English"
    pub language: String,
    /// 参与者名称
    pub person: String,
}

/// 创建会话的原始响应
///
/// 字段可能缺失（空串），由控制器负责校验成完整句柄。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationCreated {
    pub conversation_id: String,
    pub conversation_url: String,
}

#[async_trait]
pub trait ConversationPort: Send + Sync {
    /// 创建远程会话
    async fn start_conversation(
        &self,
        request: StartConversationRequest,
    ) -> Result<ConversationCreated, ClientError>;

    /// 结束远程会话
    async fn end_conversation(&self, conversation_id: &str) -> Result<(), ClientError>;
}
