//! Buffered Playback Backend - 基于 symphonia 的音频解码与临时缓冲区
//!
//! 解码合成音频以校验格式并计算时长，解码后的载荷写入临时缓冲区文件；
//! 播放进度由 tokio 定时器驱动，时长耗尽时发送播放结束通知。
//! 释放资源时删除缓冲区文件。

use async_trait::async_trait;
use std::io::Cursor;
use std::path::PathBuf;
use std::time::Duration;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::application::error::ClientError;
use crate::application::ports::{AudioBackendPort, PlaybackEnded, PlaybackResource};

/// 解码结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedInfo {
    pub sample_rate: u32,
    pub channels: u8,
    pub frames: u64,
}

impl DecodedInfo {
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_micros(self.frames * 1_000_000 / self.sample_rate as u64)
    }
}

/// 解码音频字节，统计帧数
pub fn decode_audio(data: &[u8]) -> Result<DecodedInfo, ClientError> {
    let cursor = Cursor::new(data.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

    let probed = symphonia::default::get_probe()
        .format(
            &Hint::new(),
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| ClientError::decode(format!("Probe failed: {}", e)))?;

    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| ClientError::decode("No audio track found"))?;

    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| ClientError::decode("Unknown sample rate"))?;

    let channels = track
        .codec_params
        .channels
        .map(|c| c.count() as u8)
        .unwrap_or(1);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| ClientError::decode(format!("Decoder creation failed: {}", e)))?;

    let track_id = track.id;
    let mut frames: u64 = 0;

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => {
                return Err(ClientError::decode(format!("Packet read error: {}", e)));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => frames += decoded.frames() as u64,
            Err(SymphoniaError::DecodeError(e)) => {
                tracing::warn!("Decode error (skipping packet): {}", e);
            }
            Err(e) => return Err(ClientError::decode(format!("Decode failed: {}", e))),
        }
    }

    if frames == 0 {
        return Err(ClientError::decode("Audio contains no frames"));
    }

    Ok(DecodedInfo {
        sample_rate,
        channels,
        frames,
    })
}

/// 缓冲播放后端
pub struct BufferedPlaybackBackend {
    buffer_dir: PathBuf,
}

impl BufferedPlaybackBackend {
    pub fn new(buffer_dir: impl Into<PathBuf>) -> Self {
        Self {
            buffer_dir: buffer_dir.into(),
        }
    }
}

#[async_trait]
impl AudioBackendPort for BufferedPlaybackBackend {
    async fn load(&self, bytes: Vec<u8>) -> Result<Box<dyn PlaybackResource>, ClientError> {
        let (info, bytes) = tokio::task::spawn_blocking(move || {
            decode_audio(&bytes).map(|info| (info, bytes))
        })
        .await
        .map_err(|e| ClientError::decode(format!("Decode task failed: {}", e)))??;

        tokio::fs::create_dir_all(&self.buffer_dir)
            .await
            .map_err(|e| ClientError::decode(format!("Cannot create buffer dir: {}", e)))?;

        let buffer_id = uuid::Uuid::new_v4().to_string();
        let buffer_path = self.buffer_dir.join(format!("{}.audio", buffer_id));
        tokio::fs::write(&buffer_path, &bytes)
            .await
            .map_err(|e| ClientError::decode(format!("Cannot write audio buffer: {}", e)))?;

        tracing::debug!(
            buffer_id = %buffer_id,
            sample_rate = info.sample_rate,
            channels = info.channels,
            duration_ms = info.duration().as_millis() as u64,
            "Audio buffer created"
        );

        Ok(Box::new(BufferedPlayback {
            buffer_id,
            buffer_path,
            duration: info.duration(),
            position: Duration::ZERO,
            started_at: None,
            timer: None,
            released: false,
        }))
    }
}

/// 基于临时缓冲区文件的可播放资源
pub struct BufferedPlayback {
    buffer_id: String,
    buffer_path: PathBuf,
    duration: Duration,
    position: Duration,
    started_at: Option<Instant>,
    timer: Option<JoinHandle<()>>,
    released: bool,
}

impl BufferedPlayback {
    /// 当前播放位置
    fn position(&self) -> Duration {
        let running = self.started_at.map(|t| t.elapsed()).unwrap_or_default();
        (self.position + running).min(self.duration)
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl PlaybackResource for BufferedPlayback {
    fn buffer_id(&self) -> &str {
        &self.buffer_id
    }

    fn duration(&self) -> Duration {
        self.duration
    }

    fn start(&mut self) -> PlaybackEnded {
        let (tx, rx) = oneshot::channel();
        if self.released {
            // 发送端直接销毁，接收方得到 Err
            return rx;
        }

        self.cancel_timer();
        let remaining = self.duration.saturating_sub(self.position);
        self.started_at = Some(Instant::now());
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(remaining).await;
            let _ = tx.send(());
        }));
        rx
    }

    fn pause(&mut self) {
        self.position = self.position();
        self.started_at = None;
        self.cancel_timer();
    }

    fn rewind(&mut self) {
        self.position = Duration::ZERO;
        if self.started_at.is_some() {
            self.started_at = Some(Instant::now());
        }
    }

    fn release(&mut self) {
        self.cancel_timer();
        self.started_at = None;
        if self.released {
            return;
        }
        self.released = true;

        let buffer_id = self.buffer_id.clone();
        let buffer_path = self.buffer_path.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    log_revoke(&buffer_id, tokio::fs::remove_file(&buffer_path).await);
                });
            }
            Err(_) => log_revoke(&buffer_id, std::fs::remove_file(&buffer_path)),
        }
    }
}

impl Drop for BufferedPlayback {
    fn drop(&mut self) {
        self.cancel_timer();
        if !self.released {
            self.released = true;
            log_revoke(&self.buffer_id, std::fs::remove_file(&self.buffer_path));
        }
    }
}

fn log_revoke(buffer_id: &str, result: std::io::Result<()>) {
    match result {
        Ok(()) => tracing::debug!(buffer_id = %buffer_id, "Audio buffer revoked"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            buffer_id = %buffer_id,
            error = %e,
            "Failed to remove audio buffer"
        ),
    }
}
