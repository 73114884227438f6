//! HTTP Collaborator Client - 调用后端 HTTP 服务
//!
//! 实现会话、翻译、语音、内容四个端口
//!
//! 后端 API:
//! - POST /start-conversation {language, person} → {conversation_id, conversation_url}
//! - POST /end-conversation/{conversation_id}
//! - POST /translate {languages} → {translations}
//! - GET  /generate-speech → 音频字节
//! - POST /process-videos {videos} → {summarization}
//! - GET  /podcast-text?lang={code} → 纯文本
//!
//! 所有请求只尝试一次，失败直接分类返回。

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;

use super::dto::{
    ErrorReply, ProcessVideosBody, ProcessVideosReply, StartConversationBody,
    StartConversationReply, TranslateBody, TranslateReply,
};
use crate::application::error::ClientError;
use crate::application::ports::{
    ContentPort, ConversationCreated, ConversationPort, SpeechPort, StartConversationRequest,
    TranslationPort,
};
use crate::domain::{Language, VideoUrl};

/// HTTP 客户端配置
#[derive(Debug, Clone)]
pub struct HttpCollaboratorConfig {
    /// 后端基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpCollaboratorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 60,
        }
    }
}

impl HttpCollaboratorConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// 后端 HTTP 客户端
pub struct HttpCollaboratorClient {
    client: Client,
    config: HttpCollaboratorConfig,
}

impl HttpCollaboratorClient {
    pub fn new(config: HttpCollaboratorConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClientError::transport(None, e.to_string()))?;

        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// 非 2xx 响应转为传输错误，优先使用结构化错误体中的描述
    async fn ensure_success(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorReply>(&body)
            .ok()
            .and_then(ErrorReply::into_message)
            .unwrap_or(body);
        Err(ClientError::transport(Some(status.as_u16()), message))
    }
}

/// 会话创建失败的分类：429 或描述中含 "concurrent" 视为容量错误
fn classify_start_failure(status: Option<u16>, message: String) -> ClientError {
    let capacity = status == Some(StatusCode::TOO_MANY_REQUESTS.as_u16())
        || message.to_lowercase().contains("concurrent");
    if capacity {
        ClientError::capacity(message)
    } else {
        ClientError::transport(status, message)
    }
}

#[async_trait]
impl ConversationPort for HttpCollaboratorClient {
    async fn start_conversation(
        &self,
        request: StartConversationRequest,
    ) -> Result<ConversationCreated, ClientError> {
        let url = self.url("/start-conversation");
        tracing::debug!(
            url = %url,
            language = %request.language,
            "Sending start-conversation request"
        );

        let response = self
            .client
            .post(&url)
            .json(&StartConversationBody {
                language: &request.language,
                person: &request.person,
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let reply: StartConversationReply = match serde_json::from_str(&body) {
            Ok(reply) => reply,
            Err(_) if !status.is_success() => {
                return Err(classify_start_failure(Some(status.as_u16()), body));
            }
            Err(e) => {
                return Err(ClientError::transport(
                    Some(status.as_u16()),
                    format!("Invalid start-conversation response: {}", e),
                ))
            }
        };

        if !status.is_success() || reply.is_error() {
            let code = if status.is_success() {
                reply.error_code()
            } else {
                Some(status.as_u16())
            };
            let message = reply
                .error_message()
                .unwrap_or_else(|| format!("HTTP {}", status));
            return Err(classify_start_failure(code, message));
        }

        Ok(ConversationCreated {
            conversation_id: reply.conversation_id.unwrap_or_default(),
            conversation_url: reply.conversation_url.unwrap_or_default(),
        })
    }

    async fn end_conversation(&self, conversation_id: &str) -> Result<(), ClientError> {
        let url = self.url(&format!("/end-conversation/{}", conversation_id));
        tracing::debug!(url = %url, "Sending end-conversation request");

        let response = self.client.post(&url).send().await?;
        Self::ensure_success(response).await?;
        Ok(())
    }
}

#[async_trait]
impl TranslationPort for HttpCollaboratorClient {
    async fn translate(&self, language: Language) -> Result<String, ClientError> {
        let url = self.url("/translate");
        let response = self
            .client
            .post(&url)
            .json(&TranslateBody {
                languages: vec![language.code()],
            })
            .send()
            .await?;

        let mut reply: TranslateReply = Self::ensure_success(response).await?.json().await?;
        reply.translations.remove(language.code()).ok_or_else(|| {
            ClientError::transport(None, format!("No translation returned for {}", language))
        })
    }
}

#[async_trait]
impl SpeechPort for HttpCollaboratorClient {
    async fn generate_speech(&self) -> Result<Vec<u8>, ClientError> {
        let url = self.url("/generate-speech");
        let response = Self::ensure_success(self.client.get(&url).send().await?).await?;

        let is_json = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("application/json"));

        let bytes = response.bytes().await?;
        if is_json {
            // 生成失败时后端以 JSON 错误体代替音频
            let message = serde_json::from_slice::<ErrorReply>(&bytes)
                .ok()
                .and_then(ErrorReply::into_message)
                .unwrap_or_else(|| String::from_utf8_lossy(&bytes).into_owned());
            return Err(ClientError::transport(None, message));
        }

        tracing::debug!(audio_size = bytes.len(), "Speech audio downloaded");
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ContentPort for HttpCollaboratorClient {
    async fn process_videos(&self, videos: &[VideoUrl]) -> Result<String, ClientError> {
        let url = self.url("/process-videos");
        let response = self
            .client
            .post(&url)
            .json(&ProcessVideosBody {
                videos: videos.iter().map(VideoUrl::as_str).collect(),
            })
            .send()
            .await?;

        let reply: ProcessVideosReply = Self::ensure_success(response).await?.json().await?;
        match (reply.summarization.response, reply.summarization.error) {
            (_, Some(error)) => Err(ClientError::transport(None, error)),
            (Some(summary), None) => Ok(summary),
            (None, None) => Err(ClientError::transport(None, "Empty summarization response")),
        }
    }

    async fn podcast_text(&self, language: Language) -> Result<String, ClientError> {
        let url = self.url("/podcast-text");
        let response = self
            .client
            .get(&url)
            .query(&[("lang", language.code())])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NoContent);
        }
        Ok(Self::ensure_success(response).await?.text().await?)
    }
}
