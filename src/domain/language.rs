//! 语言与界面分区

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::DomainError;

/// 支持的语言（固定枚举集合）
///
/// 会话创建请求使用显示名称（"English"），翻译与文本请求使用语言代码（"en"）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Spanish,
    French,
    German,
    Urdu,
    Hindi,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::English,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Urdu,
        Language::Hindi,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Spanish => "es",
            Language::French => "fr",
            Language::German => "de",
            Language::Urdu => "ur",
            Language::Hindi => "hi",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Spanish => "Spanish",
            Language::French => "French",
            Language::German => "German",
            Language::Urdu => "Urdu",
            Language::Hindi => "Hindi",
        }
    }

    /// 按语言代码或显示名称解析（忽略大小写）
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|lang| {
            lang.code().eq_ignore_ascii_case(s) || lang.display_name().eq_ignore_ascii_case(s)
        })
    }
}

impl FromStr for Language {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| DomainError::UnknownLanguage(s.to_string()))
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// 宿主界面的分区
///
/// 离开 `Conversation` 分区是会话结束的触发源之一。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Upload,
    Ask,
    Podcast,
    Conversation,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Upload => "upload",
            Section::Ask => "ask",
            Section::Podcast => "podcast",
            Section::Conversation => "conversation",
        }
    }
}

impl FromStr for Section {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "upload" => Ok(Section::Upload),
            "ask" => Ok(Section::Ask),
            "podcast" => Ok(Section::Podcast),
            "conversation" | "live" => Ok(Section::Conversation),
            _ => Err(DomainError::UnknownSection(s.to_string())),
        }
    }
}
