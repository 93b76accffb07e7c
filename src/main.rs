//! Soundpost - 社区效果音机器人核心
//!
//! 架构:
//! - Domain: soundboard/, playback/ (Bounded Contexts)
//! - Application: commands, queries, ports
//! - Infrastructure: gateway, voice, persistence, adapters, events

use std::sync::Arc;

use soundpost::application::ports::{SoundRepositoryPort, VoiceTransportPort};
use soundpost::config::{load_config, print_config};
use soundpost::domain::soundboard::AuthorId;
use soundpost::infrastructure::adapters::{
    FileContentStore, LoopbackTransport, LoopbackTransportConfig, ReqwestFetcher,
    ReqwestFetcherConfig,
};
use soundpost::infrastructure::events::EventPublisher;
use soundpost::infrastructure::gateway::{BotContext, Dispatcher, LoggingReplySink};
use soundpost::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteSoundRepository,
};
use soundpost::infrastructure::voice::{VoiceSessionConfig, VoiceSessionRegistry};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    let log_filter = format!("{},soundpost={}", config.log.level, config.log.level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter)),
        )
        .init();

    tracing::info!("Soundpost - 社区效果音机器人核心");
    print_config(&config);

    // 确保数据目录存在
    tokio::fs::create_dir_all(&config.storage.sounds_dir).await?;
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // 初始化数据库
    let db_config = DatabaseConfig {
        database_url: config.database.database_url(),
        max_connections: config.database.max_connections,
    };
    let pool = create_pool(&db_config).await?;
    run_migrations(&pool).await?;

    // 创建 Repository 适配器
    let sound_repo = Arc::new(SqliteSoundRepository::new(pool.clone()));

    // 启动摘要: 注册表现状
    let counts = sound_repo
        .count_by_guild()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read sound effect registry: {}", e))?;
    let total: i64 = counts.iter().map(|c| c.count).sum();
    tracing::info!(
        guilds = counts.len(),
        effects = total,
        "Sound effect registry loaded"
    );

    // 创建 HTTP 下载器
    let fetcher_config = ReqwestFetcherConfig {
        timeout_secs: config.fetch.timeout_secs,
        max_concurrent: config.fetch.max_concurrent,
        max_download_bytes: config.fetch.max_download_bytes,
    };
    let fetcher = Arc::new(ReqwestFetcher::new(fetcher_config)?);

    // 创建内容存储
    let content_store = Arc::new(FileContentStore::new(&config.storage.sounds_dir).await?);

    // 创建事件发布器
    let event_publisher = EventPublisher::new().arc();

    // 创建语音传输 (实现由配置选择, loader 已校验)
    let transport: Arc<dyn VoiceTransportPort> = match config.voice.transport.as_str() {
        "loopback" => Arc::new(LoopbackTransport::new(LoopbackTransportConfig {
            playback_ms: config.voice.loopback_playback_ms,
            connect_delay_ms: 0,
        })),
        other => anyhow::bail!("Unknown voice transport: {}", other),
    };

    // 创建语音会话注册表
    let session_config = VoiceSessionConfig {
        connect_timeout_secs: config.voice.connect_timeout_secs,
        ..VoiceSessionConfig::default()
    };
    let sessions = Arc::new(VoiceSessionRegistry::new(
        session_config,
        transport,
        event_publisher.clone(),
    ));

    // 组装 BotContext
    let context = Arc::new(BotContext::new(
        AuthorId::new(config.gateway.bot_user_id),
        sound_repo,
        fetcher,
        content_store,
        sessions,
        event_publisher,
    ));

    // 入站事件通道; 发送端交给平台网关客户端持有, main 保持通道打开
    let (_gateway_tx, gateway_rx) = mpsc::channel(256);

    let reply_sink = Arc::new(LoggingReplySink);
    let dispatcher = Dispatcher::new(context, reply_sink, gateway_rx);

    tracing::info!("Starting gateway dispatcher...");

    // 运行分发器（带优雅关闭）
    dispatcher
        .run_with_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to listen for ctrl-c");
            tracing::info!("Received shutdown signal");
        })
        .await;

    tracing::info!("Dispatcher shutdown complete");

    Ok(())
}
