//! Conversation Session - 远程会话句柄与状态
//!
//! 会话由后端分配的不透明 id 与可嵌入的展示 URL 标识。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DomainError;

/// 远程会话句柄
///
/// 不变量:
/// - id 非空当且仅当 presentation_url 非空
/// - 句柄只能整体创建或整体清除，不存在半填充状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteResourceHandle {
    id: String,
    presentation_url: String,
}

impl RemoteResourceHandle {
    pub fn new(
        id: impl Into<String>,
        presentation_url: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let id = id.into().trim().to_string();
        let presentation_url = presentation_url.into().trim().to_string();
        if id.is_empty() || presentation_url.is_empty() {
            return Err(DomainError::IncompleteHandle);
        }
        Ok(Self { id, presentation_url })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn presentation_url(&self) -> &str {
        &self.presentation_url
    }
}

/// 参与者显示名称（去除首尾空白后非空）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(name: &str) -> Result<Self, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::EmptyDisplayName);
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 会话阶段
///
/// `NoSession → Starting → Active → Ending → NoSession`，
/// 创建失败时 `Starting → NoSession`。`Ending` 永远不会回到 `Active`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    NoSession,
    Starting,
    Active,
    Ending,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::NoSession => "no_session",
            SessionPhase::Starting => "starting",
            SessionPhase::Active => "active",
            SessionPhase::Ending => "ending",
        }
    }
}

/// 触发会话结束的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitTrigger {
    /// 宿主界面离开会话分区
    SectionChanged,
    /// 标签页不可见
    VisibilityHidden,
    /// 页面卸载
    PageUnload,
    /// 视图销毁
    ViewTeardown,
    /// 在已有会话时重新开始
    Restart,
    /// 用户主动结束
    UserRequested,
}

impl ExitTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitTrigger::SectionChanged => "section_changed",
            ExitTrigger::VisibilityHidden => "visibility_hidden",
            ExitTrigger::PageUnload => "page_unload",
            ExitTrigger::ViewTeardown => "view_teardown",
            ExitTrigger::Restart => "restart",
            ExitTrigger::UserRequested => "user_requested",
        }
    }
}

impl std::fmt::Display for ExitTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 会话只读快照（供 UI 渲染）
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub handle: Option<RemoteResourceHandle>,
    pub last_error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl SessionSnapshot {
    pub fn empty() -> Self {
        Self {
            phase: SessionPhase::NoSession,
            handle: None,
            last_error: None,
            updated_at: Utc::now(),
        }
    }

    /// 当前会话 id，无会话时为空串
    pub fn conversation_id(&self) -> &str {
        self.handle.as_ref().map(|h| h.id()).unwrap_or("")
    }

    /// 当前展示 URL，无会话时为空串
    pub fn presentation_url(&self) -> &str {
        self.handle.as_ref().map(|h| h.presentation_url()).unwrap_or("")
    }

    pub fn is_loading(&self) -> bool {
        self.phase == SessionPhase::Starting
    }
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}
