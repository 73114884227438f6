//! 测试用协作方替身（计数 + 可控响应）

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{oneshot, Notify};

use crate::application::error::ClientError;
use crate::application::ports::{
    AudioBackendPort, ContentPort, ConversationCreated, ConversationPort, PlaybackEnded,
    PlaybackResource, SpeechPort, StartConversationRequest, TranslationPort,
};
use crate::domain::{Language, VideoUrl};

pub fn created(id: &str, url: &str) -> ConversationCreated {
    ConversationCreated {
        conversation_id: id.to_string(),
        conversation_url: url.to_string(),
    }
}

/// 会话协作方替身
#[derive(Default)]
pub struct FakeConversations {
    start_results: Mutex<VecDeque<Result<ConversationCreated, ClientError>>>,
    end_result: Mutex<Option<ClientError>>,
    pub start_requests: Mutex<Vec<StartConversationRequest>>,
    pub end_calls: Mutex<Vec<String>>,
    /// 设置后创建请求会挂起直到 `notify_one`
    pub start_gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeConversations {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_start(&self, result: Result<ConversationCreated, ClientError>) {
        self.start_results.lock().unwrap().push_back(result);
    }

    pub fn fail_end(&self, err: ClientError) {
        *self.end_result.lock().unwrap() = Some(err);
    }

    pub fn hold_start(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.start_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn start_count(&self) -> usize {
        self.start_requests.lock().unwrap().len()
    }

    pub fn end_calls(&self) -> Vec<String> {
        self.end_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConversationPort for FakeConversations {
    async fn start_conversation(
        &self,
        request: StartConversationRequest,
    ) -> Result<ConversationCreated, ClientError> {
        self.start_requests.lock().unwrap().push(request);
        let gate = self.start_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        tokio::task::yield_now().await;
        self.start_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::transport(None, "no scripted response")))
    }

    async fn end_conversation(&self, conversation_id: &str) -> Result<(), ClientError> {
        self.end_calls.lock().unwrap().push(conversation_id.to_string());
        tokio::task::yield_now().await;
        match self.end_result.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// 翻译协作方替身
#[derive(Default)]
pub struct FakeTranslator {
    pub calls: Mutex<Vec<Language>>,
    failures: Mutex<VecDeque<ClientError>>,
    pub gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeTranslator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_next(&self, err: ClientError) {
        self.failures.lock().unwrap().push_back(err);
    }

    pub fn hold(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl TranslationPort for FakeTranslator {
    async fn translate(&self, language: Language) -> Result<String, ClientError> {
        let call_no = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(language);
            calls.len()
        };
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        tokio::task::yield_now().await;
        if let Some(err) = self.failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        Ok(format!("[{}#{}] translated", language.code(), call_no))
    }
}

/// 语音协作方替身
#[derive(Default)]
pub struct FakeSpeech {
    pub calls: AtomicUsize,
    failures: Mutex<VecDeque<ClientError>>,
}

impl FakeSpeech {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_next(&self, err: ClientError) {
        self.failures.lock().unwrap().push_back(err);
    }
}

#[async_trait]
impl SpeechPort for FakeSpeech {
    async fn generate_speech(&self) -> Result<Vec<u8>, ClientError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::task::yield_now().await;
        if let Some(err) = self.failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        Ok(vec![n as u8; 16])
    }
}

/// 资源生命周期记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceEvent {
    Loaded(String),
    Started(String),
    Paused(String),
    Rewound(String),
    Released(String),
}

/// 音频后端替身：记录每个资源的生命周期事件
#[derive(Default)]
pub struct FakeAudioBackend {
    pub events: Arc<Mutex<Vec<ResourceEvent>>>,
    /// 每个资源的结束通知发送端，测试可手动触发播放结束
    pub finishers: Arc<Mutex<Vec<(String, oneshot::Sender<()>)>>>,
    loaded: AtomicUsize,
    decode_failures: Mutex<VecDeque<ClientError>>,
}

impl FakeAudioBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_next_decode(&self, err: ClientError) {
        self.decode_failures.lock().unwrap().push_back(err);
    }

    pub fn events(&self) -> Vec<ResourceEvent> {
        self.events.lock().unwrap().clone()
    }

    /// 模拟指定资源自然播放结束
    pub fn finish(&self, buffer_id: &str) -> bool {
        let mut finishers = self.finishers.lock().unwrap();
        match finishers.iter().position(|(id, _)| id == buffer_id) {
            Some(index) => finishers.remove(index).1.send(()).is_ok(),
            None => false,
        }
    }
}

#[async_trait]
impl AudioBackendPort for FakeAudioBackend {
    async fn load(&self, _bytes: Vec<u8>) -> Result<Box<dyn PlaybackResource>, ClientError> {
        if let Some(err) = self.decode_failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        let id = format!("buf-{}", self.loaded.fetch_add(1, Ordering::SeqCst) + 1);
        self.events
            .lock()
            .unwrap()
            .push(ResourceEvent::Loaded(id.clone()));
        Ok(Box::new(FakeResource {
            id,
            events: self.events.clone(),
            finishers: self.finishers.clone(),
            released: false,
        }))
    }
}

struct FakeResource {
    id: String,
    events: Arc<Mutex<Vec<ResourceEvent>>>,
    finishers: Arc<Mutex<Vec<(String, oneshot::Sender<()>)>>>,
    released: bool,
}

impl FakeResource {
    fn record(&self, event: ResourceEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl PlaybackResource for FakeResource {
    fn buffer_id(&self) -> &str {
        &self.id
    }

    fn duration(&self) -> Duration {
        Duration::from_secs(1)
    }

    fn start(&mut self) -> PlaybackEnded {
        let (tx, rx) = oneshot::channel();
        self.finishers.lock().unwrap().push((self.id.clone(), tx));
        self.record(ResourceEvent::Started(self.id.clone()));
        rx
    }

    fn pause(&mut self) {
        self.record(ResourceEvent::Paused(self.id.clone()));
    }

    fn rewind(&mut self) {
        self.record(ResourceEvent::Rewound(self.id.clone()));
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.finishers
            .lock()
            .unwrap()
            .retain(|(id, _)| id != &self.id);
        self.record(ResourceEvent::Released(self.id.clone()));
    }
}

/// 内容协作方替身
#[derive(Default)]
pub struct FakeContent {
    pub processed: Mutex<Vec<Vec<String>>>,
    pub summary_error: Mutex<Option<ClientError>>,
    pub texts: Mutex<Vec<(Language, String)>>,
}

impl FakeContent {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl ContentPort for FakeContent {
    async fn process_videos(&self, videos: &[VideoUrl]) -> Result<String, ClientError> {
        self.processed
            .lock()
            .unwrap()
            .push(videos.iter().map(|v| v.as_str().to_string()).collect());
        match self.summary_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(format!("summary of {} videos", videos.len())),
        }
    }

    async fn podcast_text(&self, language: Language) -> Result<String, ClientError> {
        self.texts
            .lock()
            .unwrap()
            .iter()
            .find(|(lang, _)| *lang == language)
            .map(|(_, text)| text.clone())
            .ok_or(ClientError::NoContent)
    }
}
