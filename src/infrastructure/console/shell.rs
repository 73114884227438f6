//! Console Shell - 将文本命令转换为控制器意图
//!
//! 外壳只持有当前分区和可见性，所有会话、翻译和播放状态都由控制器拥有。

use std::future::Future;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::application::{
    AudioPlaybackController, ClientError, ContentService, SessionLifecycleController,
    TranslationCache,
};
use crate::domain::{ExitTrigger, Language, Section, TranslationEntry};

use super::command::{ShellCommand, HELP};

/// 命令执行结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellOutcome {
    Continue(String),
    Quit,
}

pub struct ConsoleShell {
    sessions: SessionLifecycleController,
    translations: TranslationCache,
    content: ContentService,
    audio: AudioPlaybackController,
    section: Section,
    visible: bool,
}

impl ConsoleShell {
    pub fn new(
        sessions: SessionLifecycleController,
        translations: TranslationCache,
        content: ContentService,
        audio: AudioPlaybackController,
    ) -> Self {
        Self {
            sessions,
            translations,
            content,
            audio,
            section: Section::Upload,
            visible: true,
        }
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub async fn execute(&mut self, command: ShellCommand) -> ShellOutcome {
        let output = match command {
            ShellCommand::Start { name, language } => {
                self.section = Section::Conversation;
                match self.sessions.start_session(&name, language).await {
                    Ok(handle) => format!(
                        "conversation {} started: {}",
                        handle.id(),
                        handle.presentation_url()
                    ),
                    Err(e) => describe_error("start failed", &e),
                }
            }
            ShellCommand::End => {
                self.sessions.end_session(ExitTrigger::UserRequested).await;
                "conversation ended".to_string()
            }
            ShellCommand::Section(to) => {
                let from = self.section;
                self.section = to;
                self.sessions.on_section_changed(from, to).await;
                format!("section: {}", to.as_str())
            }
            ShellCommand::Hide => {
                self.visible = false;
                self.sessions.on_visibility_changed(false).await;
                "page hidden".to_string()
            }
            ShellCommand::Show => {
                self.visible = true;
                self.sessions.on_visibility_changed(true).await;
                "page visible".to_string()
            }
            ShellCommand::Translate(languages) => {
                let results = self.translations.request_many(&languages).await;
                results
                    .into_iter()
                    .map(|(language, entry)| format_entry(language, &entry))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            ShellCommand::Text(language) => match self.content.podcast_text(language).await {
                Ok(text) => text,
                Err(e) => describe_error("podcast text unavailable", &e),
            },
            ShellCommand::Process(urls) => match self.content.process_videos(&urls).await {
                Ok(summary) => summary,
                Err(e) => describe_error("processing failed", &e),
            },
            ShellCommand::Play => match self.audio.play().await {
                Ok(()) => {
                    let snapshot = self.audio.snapshot();
                    format!(
                        "playing {} ({} ms)",
                        snapshot.buffer_id.unwrap_or_default(),
                        snapshot.duration_ms.unwrap_or_default()
                    )
                }
                Err(e) => describe_error("playback failed", &e),
            },
            ShellCommand::Stop => {
                self.audio.stop().await;
                "playback stopped".to_string()
            }
            ShellCommand::Status => self.status(),
            ShellCommand::Help => HELP.to_string(),
            ShellCommand::Quit => return ShellOutcome::Quit,
        };
        ShellOutcome::Continue(output)
    }

    /// 读取命令直到 `quit`、输入结束或 `interrupt` 完成
    ///
    /// 无论循环如何结束（包括读写失败），都会执行退出清理。
    pub async fn run<R, W, S>(
        &mut self,
        input: R,
        mut output: W,
        interrupt: S,
    ) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
        S: Future<Output = ()>,
    {
        let outcome = self.read_commands(input, &mut output, interrupt).await;
        self.shutdown().await;
        outcome
    }

    async fn read_commands<R, W, S>(
        &mut self,
        input: R,
        output: &mut W,
        interrupt: S,
    ) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
        S: Future<Output = ()>,
    {
        let mut lines = input.lines();
        tokio::pin!(interrupt);

        output.write_all(format!("{}\n", HELP).as_bytes()).await?;

        loop {
            output.write_all(b"> ").await?;
            output.flush().await?;

            let line = tokio::select! {
                line = lines.next_line() => line?,
                _ = &mut interrupt => None,
            };
            let Some(line) = line else {
                return Ok(());
            };

            let command = match ShellCommand::parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    output.write_all(format!("error: {}\n", e).as_bytes()).await?;
                    continue;
                }
            };

            match self.execute(command).await {
                ShellOutcome::Continue(text) => {
                    output.write_all(format!("{}\n", text).as_bytes()).await?;
                }
                ShellOutcome::Quit => return Ok(()),
            }
        }
    }

    /// 页面卸载与视图销毁
    pub async fn shutdown(&self) {
        self.sessions.on_page_unload().await;
        self.sessions.on_view_teardown().await;
        self.audio.on_view_teardown().await;
    }

    fn status(&self) -> String {
        let session = self.sessions.snapshot();
        let playback = self.audio.snapshot();
        let mut lines = vec![
            format!(
                "section: {} ({})",
                self.section.as_str(),
                if self.visible { "visible" } else { "hidden" }
            ),
            format!(
                "conversation: {} id={} url={}",
                session.phase.as_str(),
                session.conversation_id(),
                session.presentation_url()
            ),
            format!(
                "audio: {} buffer={}",
                playback.state.as_str(),
                playback.buffer_id.as_deref().unwrap_or("-")
            ),
            format!("content version: {}", self.translations.content_version()),
        ];
        if let Some(error) = session.last_error.as_deref() {
            lines.push(format!("last conversation error: {}", error));
        }
        for (language, entry) in self.translations.entries() {
            lines.push(format_entry(language, &entry));
        }
        lines.join("\n")
    }
}

fn format_entry(language: Language, entry: &TranslationEntry) -> String {
    match entry {
        TranslationEntry::Ready(text) => format!("[{}] {}", language.code(), text),
        TranslationEntry::Failed(error) => {
            format!("[{}] failed: {}", language.code(), error)
        }
        other => format!("[{}] {}", language.code(), other.as_str()),
    }
}

fn describe_error(context: &str, error: &ClientError) -> String {
    match error {
        ClientError::Stale => format!("{}: superseded by a newer request", context),
        ClientError::NoContent => format!("{}: no content available yet", context),
        other => format!("{}: {}", context, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{
        created, FakeAudioBackend, FakeContent, FakeConversations, FakeSpeech, FakeTranslator,
        ResourceEvent,
    };
    use crate::domain::SessionPhase;
    use crate::infrastructure::events::EventPublisher;
    use std::pin::Pin;
    use std::sync::Arc;
    use std::task::{Context, Poll};
    use std::time::Duration;

    struct Harness {
        shell: ConsoleShell,
        conversations: Arc<FakeConversations>,
        backend: Arc<FakeAudioBackend>,
        content: Arc<FakeContent>,
    }

    fn harness() -> Harness {
        let events = EventPublisher::new().arc();
        let conversations = FakeConversations::new();
        let translator = FakeTranslator::new();
        let backend = FakeAudioBackend::new();
        let content = FakeContent::new();

        let sessions = SessionLifecycleController::new(
            conversations.clone(),
            events.clone(),
            Duration::from_secs(3),
        );
        let translations = TranslationCache::new(translator, events.clone());
        let content_service =
            ContentService::new(content.clone(), translations.clone(), events.clone());
        let audio = AudioPlaybackController::new(FakeSpeech::new(), backend.clone(), events);

        Harness {
            shell: ConsoleShell::new(sessions, translations, content_service, audio),
            conversations,
            backend,
            content,
        }
    }

    async fn run(shell: &mut ConsoleShell, line: &str) -> String {
        let command = ShellCommand::parse(line).unwrap().unwrap();
        match shell.execute(command).await {
            ShellOutcome::Continue(output) => output,
            ShellOutcome::Quit => panic!("unexpected quit"),
        }
    }

    #[tokio::test]
    async fn test_leaving_conversation_section_ends_session() {
        let mut h = harness();
        h.conversations.push_start(Ok(created("c1", "https://video/c1")));

        let output = run(&mut h.shell, "start Alice en").await;
        assert!(output.contains("c1"));
        assert_eq!(h.shell.section(), Section::Conversation);

        run(&mut h.shell, "section podcast").await;
        assert_eq!(h.conversations.end_calls(), vec!["c1".to_string()]);

        let status = run(&mut h.shell, "status").await;
        assert!(status.contains("conversation: no_session"));
    }

    #[tokio::test]
    async fn test_hide_then_shutdown_tears_down_once() {
        let mut h = harness();
        h.conversations.push_start(Ok(created("c1", "https://video/c1")));
        run(&mut h.shell, "start Alice fr").await;

        run(&mut h.shell, "hide").await;
        h.shell.shutdown().await;

        assert_eq!(h.conversations.end_calls().len(), 1);
        assert_eq!(h.shell.sessions.snapshot().phase, SessionPhase::NoSession);
    }

    #[tokio::test]
    async fn test_translate_reports_each_language() {
        let mut h = harness();
        let output = run(&mut h.shell, "translate es de").await;
        assert!(output.contains("[es] [es#"));
        assert!(output.contains("[de] [de#"));
    }

    #[tokio::test]
    async fn test_podcast_text_without_content() {
        let mut h = harness();
        let output = run(&mut h.shell, "text ur").await;
        assert_eq!(output, "podcast text unavailable: no content available yet");

        h.content
            .texts
            .lock()
            .unwrap()
            .push((Language::Urdu, "episode".to_string()));
        assert_eq!(run(&mut h.shell, "text ur").await, "episode");
    }

    #[tokio::test]
    async fn test_shutdown_stops_audio() {
        let mut h = harness();
        let output = run(&mut h.shell, "play").await;
        assert!(output.starts_with("playing buf-1"));

        h.shell.shutdown().await;
        assert!(h
            .backend
            .events()
            .contains(&ResourceEvent::Released("buf-1".to_string())));
    }

    /// 前 `ok_writes` 次写入成功，之后返回 BrokenPipe
    struct BrokenPipeAfter {
        ok_writes: usize,
    }

    impl AsyncWrite for BrokenPipeAfter {
        fn poll_write(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<std::io::Result<usize>> {
            if self.ok_writes == 0 {
                return Poll::Ready(Err(std::io::ErrorKind::BrokenPipe.into()));
            }
            self.ok_writes -= 1;
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_run_tears_down_when_output_fails() {
        let mut h = harness();
        h.conversations.push_start(Ok(created("c1", "https://video/c1")));

        // 帮助文本与提示符写入成功，命令结果写入失败
        let input: &[u8] = b"start Alice en\nstatus\n";
        let output = BrokenPipeAfter { ok_writes: 2 };
        let err = h
            .shell
            .run(input, output, std::future::pending())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);
        assert_eq!(h.conversations.end_calls(), vec!["c1".to_string()]);
        assert_eq!(h.shell.sessions.snapshot().phase, SessionPhase::NoSession);
    }

    #[tokio::test]
    async fn test_run_until_end_of_input() {
        let mut h = harness();
        h.conversations.push_start(Ok(created("c1", "https://video/c1")));

        let input: &[u8] = b"start Alice en\n\nbogus\nplay\n";
        let mut output = Vec::new();
        h.shell
            .run(input, &mut output, std::future::pending())
            .await
            .unwrap();

        let transcript = String::from_utf8(output).unwrap();
        assert!(transcript.contains("conversation c1 started"));
        assert!(transcript.contains("error: Unknown command: bogus"));
        assert_eq!(h.conversations.end_calls(), vec!["c1".to_string()]);
        assert!(h
            .backend
            .events()
            .contains(&ResourceEvent::Released("buf-1".to_string())));
    }

    #[tokio::test]
    async fn test_quit_outcome() {
        let mut h = harness();
        assert_eq!(h.shell.execute(ShellCommand::Quit).await, ShellOutcome::Quit);
    }
}
