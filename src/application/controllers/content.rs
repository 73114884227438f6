//! Content Service - 视频摘要提交与内容版本
//!
//! 新内容处理成功后递增内容版本，翻译缓存随之失效。

use std::collections::HashSet;
use std::sync::Arc;

use crate::application::error::ClientError;
use crate::application::ports::ContentPort;
use crate::domain::{Language, VideoUrl};
use crate::infrastructure::events::EventPublisher;

use super::TranslationCache;

/// 内容服务
#[derive(Clone)]
pub struct ContentService {
    content: Arc<dyn ContentPort>,
    translations: TranslationCache,
    events: Arc<EventPublisher>,
}

impl ContentService {
    pub fn new(
        content: Arc<dyn ContentPort>,
        translations: TranslationCache,
        events: Arc<EventPublisher>,
    ) -> Self {
        Self {
            content,
            translations,
            events,
        }
    }

    /// 提交视频进行摘要
    ///
    /// 空白和重复链接被忽略；存在无效链接或列表为空时在网络调用前拒绝。
    pub async fn process_videos<S: AsRef<str>>(&self, urls: &[S]) -> Result<String, ClientError> {
        let mut seen = HashSet::new();
        let mut videos = Vec::new();
        for url in urls.iter().map(|u| u.as_ref().trim()).filter(|u| !u.is_empty()) {
            let video = VideoUrl::parse(url)?;
            if seen.insert(video.clone()) {
                videos.push(video);
            }
        }
        if videos.is_empty() {
            return Err(ClientError::validation("At least one YouTube URL is required"));
        }

        tracing::info!(videos = videos.len(), "Submitting videos for summarization");
        let summary = self.content.process_videos(&videos).await.map_err(|e| {
            tracing::warn!(error = %e, "Video summarization failed");
            e
        })?;

        self.translations.invalidate();
        let version = self.translations.content_version();
        self.events.publish_content_processed(version, videos.len());
        tracing::info!(content_version = version, summary_len = summary.len(), "Videos processed");
        Ok(summary)
    }

    /// 获取已处理的播客文本
    pub async fn podcast_text(&self, language: Language) -> Result<String, ClientError> {
        self.content.podcast_text(language).await
    }
}
