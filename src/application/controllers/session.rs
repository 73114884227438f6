//! Session Lifecycle Controller - 远程会话生命周期
//!
//! 每次显式"开始"只创建一个远程会话，并保证无论哪个退出信号先触发，
//! 会话都只被清理一次:
//! - 宿主界面离开会话分区
//! - 标签页不可见
//! - 页面卸载
//! - 视图销毁
//!
//! 所有触发源都调用 `end_session`，由 `IdempotentTeardown` 决定谁真正发出清理请求。
//! 每次创建都携带一个代次（generation），过期的创建响应不会复活已清除的句柄。

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};

use crate::application::error::ClientError;
use crate::application::ports::{ConversationCreated, ConversationPort, StartConversationRequest};
use crate::application::teardown::{IdempotentTeardown, TeardownPermit};
use crate::domain::{
    DisplayName, ExitTrigger, Language, RemoteResourceHandle, Section, SessionPhase,
    SessionSnapshot,
};
use crate::infrastructure::events::EventPublisher;

/// 控制器内部状态（只在短临界区内修改，不跨越网络等待）
struct SessionState {
    phase: SessionPhase,
    handle: Option<RemoteResourceHandle>,
    generation: u64,
    last_error: Option<String>,
}

impl SessionState {
    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            handle: self.handle.clone(),
            last_error: self.last_error.clone(),
            updated_at: chrono::Utc::now(),
        }
    }
}

struct SessionShared {
    conversations: Arc<dyn ConversationPort>,
    teardown: IdempotentTeardown,
    events: Arc<EventPublisher>,
    state: Mutex<SessionState>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

impl SessionShared {
    fn publish(&self, state: &SessionState) {
        self.snapshot_tx.send_replace(state.snapshot());
    }

    /// 发出清理请求并清除本地句柄；失败只记录日志
    async fn tear_down(
        &self,
        permit: TeardownPermit,
        conversation_id: String,
        trigger: ExitTrigger,
    ) {
        let result = self.conversations.end_conversation(&conversation_id).await;
        if let Err(e) = &result {
            tracing::warn!(
                conversation_id = %conversation_id,
                error = %e,
                "Conversation teardown failed, clearing local handle anyway"
            );
        }

        self.events
            .publish_conversation_ended(&conversation_id, trigger.as_str(), result.is_ok());

        let mut state = self.state.lock().await;
        let still_current = state
            .handle
            .as_ref()
            .is_some_and(|h| h.id() == conversation_id);
        if still_current {
            state.handle = None;
            state.phase = SessionPhase::NoSession;
            self.publish(&state);
        }
        drop(state);
        drop(permit);
    }
}

/// 会话生命周期控制器
#[derive(Clone)]
pub struct SessionLifecycleController {
    inner: Arc<SessionShared>,
}

impl SessionLifecycleController {
    pub fn new(
        conversations: Arc<dyn ConversationPort>,
        events: Arc<EventPublisher>,
        teardown_cooldown: Duration,
    ) -> Self {
        let (snapshot_tx, _) = watch::channel(SessionSnapshot::empty());
        Self {
            inner: Arc::new(SessionShared {
                conversations,
                teardown: IdempotentTeardown::new(teardown_cooldown),
                events,
                state: Mutex::new(SessionState {
                    phase: SessionPhase::NoSession,
                    handle: None,
                    generation: 0,
                    last_error: None,
                }),
                snapshot_tx,
            }),
        }
    }

    /// 当前状态快照
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.snapshot_tx.borrow().clone()
    }

    /// 订阅状态变化（UI 只读句柄）
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.snapshot_tx.subscribe()
    }

    /// 开始会话
    ///
    /// 已有活动会话时先以 `Restart` 结束旧会话；正在创建中的请求被新请求取代。
    pub async fn start_session(
        &self,
        display_name: &str,
        language: Language,
    ) -> Result<RemoteResourceHandle, ClientError> {
        let person = DisplayName::new(display_name)?;

        let generation = loop {
            {
                let mut state = self.inner.state.lock().await;
                if matches!(state.phase, SessionPhase::NoSession | SessionPhase::Starting) {
                    if state.phase == SessionPhase::Starting {
                        tracing::debug!(
                            generation = state.generation,
                            "Superseding pending conversation creation"
                        );
                    }
                    state.generation += 1;
                    state.phase = SessionPhase::Starting;
                    state.handle = None;
                    state.last_error = None;
                    self.inner.publish(&state);
                    break state.generation;
                }
            }
            self.end_session(ExitTrigger::Restart).await;
        };

        tracing::info!(
            person = %person.as_str(),
            language = %language,
            generation = generation,
            "Starting conversation"
        );

        let result = self
            .inner
            .conversations
            .start_conversation(StartConversationRequest {
                language: language.display_name().to_string(),
                person: person.as_str().to_string(),
            })
            .await;

        let mut state = self.inner.state.lock().await;

        if state.generation != generation {
            drop(state);
            tracing::debug!(generation = generation, "Discarding stale conversation creation");
            if let Ok(created) = result {
                self.discard_orphan(created.conversation_id);
            }
            return Err(ClientError::Stale);
        }

        let mut orphan = None;
        let outcome = result.and_then(|created| {
            let ConversationCreated {
                conversation_id,
                conversation_url,
            } = created;
            RemoteResourceHandle::new(conversation_id.clone(), conversation_url).map_err(|e| {
                if !conversation_id.trim().is_empty() {
                    orphan = Some(conversation_id);
                }
                ClientError::transport(None, format!("Invalid conversation response: {}", e))
            })
        });

        match &outcome {
            Ok(handle) => {
                state.phase = SessionPhase::Active;
                state.handle = Some(handle.clone());
                tracing::info!(
                    conversation_id = %handle.id(),
                    conversation_url = %handle.presentation_url(),
                    "Conversation started"
                );
                self.inner
                    .events
                    .publish_conversation_started(handle.id(), handle.presentation_url());
            }
            Err(e) => {
                state.phase = SessionPhase::NoSession;
                state.handle = None;
                state.last_error = Some(e.to_string());
                tracing::warn!(kind = ?e.kind(), error = %e, "Failed to start conversation");
                self.inner
                    .events
                    .publish_conversation_failed(&format!("{:?}", e.kind()), &e.to_string());
            }
        }
        self.inner.publish(&state);
        drop(state);

        if let Some(conversation_id) = orphan {
            self.discard_orphan(conversation_id);
        }

        outcome
    }

    /// 结束会话（幂等）
    ///
    /// 无活动会话时直接返回；并发调用只有第一个发出清理请求，所有调用方都等待句柄清除。
    /// 清理失败只记录日志，本地句柄仍然清除。
    pub async fn end_session(&self, trigger: ExitTrigger) {
        let conversation_id = {
            let mut state = self.inner.state.lock().await;
            match state.phase {
                SessionPhase::NoSession => {
                    tracing::trace!(trigger = %trigger, "No active conversation to end");
                    return;
                }
                SessionPhase::Starting => {
                    // 放弃进行中的创建，其响应到达时按过期处理
                    state.generation += 1;
                    state.phase = SessionPhase::NoSession;
                    self.inner.publish(&state);
                    tracing::info!(trigger = %trigger, "Pending conversation creation abandoned");
                    return;
                }
                SessionPhase::Active | SessionPhase::Ending => {}
            }

            let Some(handle) = state.handle.as_ref() else {
                state.phase = SessionPhase::NoSession;
                self.inner.publish(&state);
                return;
            };
            let conversation_id = handle.id().to_string();
            if state.phase == SessionPhase::Active {
                state.phase = SessionPhase::Ending;
                self.inner.publish(&state);
            }
            conversation_id
        };

        let Some(permit) = self.inner.teardown.try_acquire(&conversation_id) else {
            tracing::debug!(
                conversation_id = %conversation_id,
                trigger = %trigger,
                "Teardown already attempted, waiting for it to settle"
            );
            self.wait_until_cleared(&conversation_id).await;
            return;
        };

        tracing::info!(
            conversation_id = %conversation_id,
            trigger = %trigger,
            "Ending conversation"
        );

        // 清理任务持有许可，调用方被取消时清理仍会完成
        let inner = Arc::clone(&self.inner);
        let id = conversation_id.clone();
        tokio::spawn(async move { inner.tear_down(permit, id, trigger).await });

        self.wait_until_cleared(&conversation_id).await;
    }

    /// 宿主界面分区切换
    pub async fn on_section_changed(&self, from: Section, to: Section) {
        if from == Section::Conversation && to != Section::Conversation {
            self.end_session(ExitTrigger::SectionChanged).await;
        }
    }

    /// 标签页可见性变化
    pub async fn on_visibility_changed(&self, visible: bool) {
        if !visible {
            self.end_session(ExitTrigger::VisibilityHidden).await;
        }
    }

    pub async fn on_page_unload(&self) {
        self.end_session(ExitTrigger::PageUnload).await;
    }

    pub async fn on_view_teardown(&self) {
        self.end_session(ExitTrigger::ViewTeardown).await;
    }

    async fn wait_until_cleared(&self, conversation_id: &str) {
        let mut rx = self.inner.snapshot_tx.subscribe();
        let _ = rx
            .wait_for(|snapshot| snapshot.conversation_id() != conversation_id)
            .await;
    }

    /// 清理没有本地句柄可引用的远程会话（过期或不完整的创建响应）
    fn discard_orphan(&self, conversation_id: String) {
        if conversation_id.trim().is_empty() {
            return;
        }
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let outcome = inner
                .teardown
                .run(&conversation_id, || {
                    inner.conversations.end_conversation(&conversation_id)
                })
                .await;
            match outcome {
                Some(Ok(())) => {
                    tracing::info!(
                        conversation_id = %conversation_id,
                        "Orphaned conversation ended"
                    )
                }
                Some(Err(e)) => tracing::warn!(
                    conversation_id = %conversation_id,
                    error = %e,
                    "Failed to end orphaned conversation"
                ),
                None => {}
            }
        });
    }
}
