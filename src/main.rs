//! Echoframe - 交互式客户端外壳
//!
//! 从标准输入读取命令驱动会话、翻译、内容与音频控制器；
//! 输入结束、`quit`、ctrl-c 或读写失败时按页面卸载与视图销毁流程清理远程会话和音频资源。

use std::sync::Arc;

use echoframe::application::{
    AudioPlaybackController, ContentService, SessionLifecycleController, TranslationCache,
};
use echoframe::config::{load_config, print_config, AppConfig};
use echoframe::infrastructure::adapters::{
    BufferedPlaybackBackend, HttpCollaboratorClient, HttpCollaboratorConfig,
};
use echoframe::infrastructure::console::ConsoleShell;
use echoframe::infrastructure::events::EventPublisher;
use tokio::io::BufReader;
use tokio::sync::broadcast::error::RecvError;

fn init_tracing(config: &AppConfig) {
    let log_filter = format!("{},echoframe={}", config.log.level, config.log.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    // 日志写到 stderr，stdout 留给命令输出
    if config.log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);
    tracing::info!("Echoframe client shell");
    print_config(&config);

    // 协作方客户端，同时实现四个端口
    let backend_config = HttpCollaboratorConfig::new(&config.backend.base_url)
        .with_timeout(config.backend.timeout_secs);
    let collaborator = Arc::new(HttpCollaboratorClient::new(backend_config)?);

    let playback_backend = Arc::new(BufferedPlaybackBackend::new(&config.audio.buffer_dir));
    let event_publisher = EventPublisher::new().arc();

    let sessions = SessionLifecycleController::new(
        collaborator.clone(),
        event_publisher.clone(),
        config.session.teardown_cooldown(),
    );
    let translations = TranslationCache::new(collaborator.clone(), event_publisher.clone());
    let content = ContentService::new(
        collaborator.clone(),
        translations.clone(),
        event_publisher.clone(),
    );
    let audio = AudioPlaybackController::new(
        collaborator.clone(),
        playback_backend,
        event_publisher.clone(),
    );

    // 事件日志
    let mut events = event_publisher.subscribe();
    let event_logger = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(json) => tracing::debug!(event = %json, "Client event"),
                    Err(e) => tracing::warn!(error = %e, "Failed to serialize event"),
                },
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event logger lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut shell = ConsoleShell::new(sessions, translations, content, audio);
    let interrupt = async {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received shutdown signal");
        }
    };
    let outcome = shell
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout(), interrupt)
        .await;
    event_logger.abort();

    tracing::info!("Shell shutdown complete");

    outcome?;
    Ok(())
}
