//! Translation Port - 翻译协作方
//!
//! POST /translate {languages: [code]} → {translations: {code: text}}

use async_trait::async_trait;

use crate::application::error::ClientError;
use crate::domain::Language;

#[async_trait]
pub trait TranslationPort: Send + Sync {
    /// 获取当前内容在指定语言下的译文
    async fn translate(&self, language: Language) -> Result<String, ClientError>;
}
