//! Translation Entry - 单语言翻译条目状态

use serde::Serialize;

/// 翻译条目状态
///
/// 同一内容版本下：`NotRequested → Loading → {Ready | Failed}`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum TranslationEntry {
    NotRequested,
    Loading,
    Ready(String),
    Failed(String),
}

impl TranslationEntry {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranslationEntry::NotRequested => "not_requested",
            TranslationEntry::Loading => "loading",
            TranslationEntry::Ready(_) => "ready",
            TranslationEntry::Failed(_) => "failed",
        }
    }

    /// 是否已得到最终结果
    pub fn is_settled(&self) -> bool {
        matches!(self, TranslationEntry::Ready(_) | TranslationEntry::Failed(_))
    }
}

impl Default for TranslationEntry {
    fn default() -> Self {
        TranslationEntry::NotRequested
    }
}
