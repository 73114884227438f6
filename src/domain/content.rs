//! Content - 待处理的视频链接

use serde::Serialize;

use super::DomainError;

const YOUTUBE_HOSTS: &[&str] = &["youtube.com/", "youtu.be/"];

/// YouTube 视频链接
///
/// 接受 `http(s)://(www.)youtube.com/...` 与 `http(s)://(www.)youtu.be/...`。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VideoUrl(String);

impl VideoUrl {
    pub fn parse(url: &str) -> Result<Self, DomainError> {
        let url = url.trim();
        let rest = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"))
            .ok_or_else(|| DomainError::InvalidVideoUrl(url.to_string()))?;
        let rest = rest.strip_prefix("www.").unwrap_or(rest);

        if YOUTUBE_HOSTS.iter().any(|host| rest.starts_with(host)) {
            Ok(Self(url.to_string()))
        } else {
            Err(DomainError::InvalidVideoUrl(url.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VideoUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
