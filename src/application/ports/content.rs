//! Content Port - 内容处理协作方
//!
//! POST /process-videos {videos: [url]} → {summarization: {response} | {error}}
//! GET /podcast-text?lang={code} → 纯文本

use async_trait::async_trait;

use crate::application::error::ClientError;
use crate::domain::{Language, VideoUrl};

#[async_trait]
pub trait ContentPort: Send + Sync {
    /// 提交视频进行摘要，返回摘要文本
    async fn process_videos(&self, videos: &[VideoUrl]) -> Result<String, ClientError>;

    /// 获取已处理的播客文本，尚无内容时返回 `ClientError::NoContent`
    async fn podcast_text(&self, language: Language) -> Result<String, ClientError>;
}
