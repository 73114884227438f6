//! Audio Playback Controller - 单实例音频播放
//!
//! 任意时刻最多持有一个可播放资源。`Playing` 时再次播放会先停止并释放当前资源，
//! 播放自然结束或显式停止时都会回收资源的临时缓冲区。

use std::sync::Arc;
use tokio::sync::{watch, Mutex};

use crate::application::error::ClientError;
use crate::application::ports::{AudioBackendPort, PlaybackEnded, PlaybackResource, SpeechPort};
use crate::domain::{PlaybackSnapshot, PlaybackState};
use crate::infrastructure::events::EventPublisher;

struct AudioState {
    phase: PlaybackState,
    resource: Option<Box<dyn PlaybackResource>>,
    /// 每次获取/停止递增，用于识别过期的获取结果和结束通知
    generation: u64,
    last_error: Option<String>,
}

impl AudioState {
    fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            state: self.phase,
            buffer_id: self.resource.as_ref().map(|r| r.buffer_id().to_string()),
            duration_ms: self
                .resource
                .as_ref()
                .map(|r| r.duration().as_millis() as u64),
            last_error: self.last_error.clone(),
            updated_at: chrono::Utc::now(),
        }
    }
}

struct AudioShared {
    speech: Arc<dyn SpeechPort>,
    backend: Arc<dyn AudioBackendPort>,
    events: Arc<EventPublisher>,
    state: Mutex<AudioState>,
    snapshot_tx: watch::Sender<PlaybackSnapshot>,
}

impl AudioShared {
    fn publish(&self, state: &AudioState) {
        self.snapshot_tx.send_replace(state.snapshot());
    }

    /// 暂停、归零、释放当前资源并进入 `Stopped`
    fn stop_locked(&self, state: &mut AudioState, reason: &str) {
        state.generation += 1;
        if let Some(mut resource) = state.resource.take() {
            resource.pause();
            resource.rewind();
            resource.release();
            tracing::debug!(
                buffer_id = %resource.buffer_id(),
                reason = reason,
                "Audio resource released"
            );
            self.events
                .publish_playback_stopped(resource.buffer_id(), reason);
        }
        state.phase = PlaybackState::Stopped;
        self.publish(state);
    }

    /// 播放自然结束
    async fn finish(&self, generation: u64) {
        let mut state = self.state.lock().await;
        if state.generation != generation || state.phase != PlaybackState::Playing {
            return;
        }
        if let Some(mut resource) = state.resource.take() {
            resource.release();
            tracing::info!(buffer_id = %resource.buffer_id(), "Playback finished");
            self.events
                .publish_playback_stopped(resource.buffer_id(), "finished");
        }
        state.phase = PlaybackState::Stopped;
        self.publish(&state);
    }
}

/// 音频播放控制器
#[derive(Clone)]
pub struct AudioPlaybackController {
    inner: Arc<AudioShared>,
}

impl AudioPlaybackController {
    pub fn new(
        speech: Arc<dyn SpeechPort>,
        backend: Arc<dyn AudioBackendPort>,
        events: Arc<EventPublisher>,
    ) -> Self {
        let (snapshot_tx, _) = watch::channel(PlaybackSnapshot::idle());
        Self {
            inner: Arc::new(AudioShared {
                speech,
                backend,
                events,
                state: Mutex::new(AudioState {
                    phase: PlaybackState::Idle,
                    resource: None,
                    generation: 0,
                    last_error: None,
                }),
                snapshot_tx,
            }),
        }
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.inner.snapshot_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.inner.snapshot_tx.subscribe()
    }

    /// 获取并播放合成音频
    ///
    /// 正在播放时先同步停止并释放当前资源；正在获取时，先前的获取结果将被丢弃。
    pub async fn play(&self) -> Result<(), ClientError> {
        let generation = {
            let mut state = self.inner.state.lock().await;
            match state.phase {
                PlaybackState::Playing => self.inner.stop_locked(&mut state, "superseded"),
                PlaybackState::Acquiring => {
                    tracing::debug!("Superseding pending audio acquisition");
                    state.generation += 1;
                    state.phase = PlaybackState::Stopped;
                }
                PlaybackState::Idle | PlaybackState::Stopped => {}
            }
            debug_assert!(state.phase.can_acquire() && state.resource.is_none());
            state.generation += 1;
            state.phase = PlaybackState::Acquiring;
            state.last_error = None;
            self.inner.publish(&state);
            state.generation
        };

        let loaded = match self.inner.speech.generate_speech().await {
            Ok(bytes) => {
                tracing::debug!(audio_size = bytes.len(), "Speech audio received");
                self.inner.backend.load(bytes).await
            }
            Err(e) => Err(e),
        };

        let mut state = self.inner.state.lock().await;

        if state.generation != generation {
            drop(state);
            if let Ok(mut resource) = loaded {
                resource.release();
            }
            tracing::debug!(generation = generation, "Discarding stale audio acquisition");
            return Err(ClientError::Stale);
        }

        let mut resource = match loaded {
            Ok(resource) => resource,
            Err(e) => {
                state.phase = PlaybackState::Stopped;
                state.last_error = Some(e.to_string());
                self.inner.publish(&state);
                tracing::warn!(kind = ?e.kind(), error = %e, "Failed to acquire audio");
                self.inner
                    .events
                    .publish_playback_failed(&format!("{:?}", e.kind()), &e.to_string());
                return Err(e);
            }
        };

        let ended = resource.start();
        let buffer_id = resource.buffer_id().to_string();
        let duration_ms = resource.duration().as_millis() as u64;
        state.resource = Some(resource);
        state.phase = PlaybackState::Playing;
        self.inner.publish(&state);
        drop(state);

        self.watch_playback_end(generation, ended);

        tracing::info!(buffer_id = %buffer_id, duration_ms = duration_ms, "Playback started");
        self.inner
            .events
            .publish_playback_started(&buffer_id, Some(duration_ms));
        Ok(())
    }

    /// 停止播放并释放资源；`Idle` / `Stopped` 时无操作
    pub async fn stop(&self) {
        let mut state = self.inner.state.lock().await;
        match state.phase {
            PlaybackState::Idle | PlaybackState::Stopped => {}
            PlaybackState::Acquiring | PlaybackState::Playing => {
                self.inner.stop_locked(&mut state, "stopped");
                tracing::info!("Playback stopped");
            }
        }
    }

    /// 宿主视图销毁时调用
    pub async fn on_view_teardown(&self) {
        self.stop().await;
    }

    fn watch_playback_end(&self, generation: u64, ended: PlaybackEnded) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            // 资源被提前释放时发送端销毁，这里得到 Err 并直接退出
            if ended.await.is_ok() {
                inner.finish(generation).await;
            }
        });
    }
}
