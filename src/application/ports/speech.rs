//! Speech Port - 语音合成协作方
//!
//! GET /generate-speech → 音频字节

use async_trait::async_trait;

use crate::application::error::ClientError;

#[async_trait]
pub trait SpeechPort: Send + Sync {
    /// 获取合成音频的原始字节
    async fn generate_speech(&self) -> Result<Vec<u8>, ClientError>;
}
