//! Cyrene 预订客户端主入口

use clap::Parser;
use cyrene_booking::{cli, config::AppConfig, state::AppState, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // 加载 .env 文件（开发环境）
    // 按优先级加载：.env.local > .env
    if let Ok(env) = std::env::var("CYRENE_ENV") {
        dotenv::from_filename(format!(".env.{}", env)).ok();
    } else {
        dotenv::from_filename(".env.local").ok();
        dotenv::dotenv().ok();
    }

    // 1. 加载配置
    let mut config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        anyhow::anyhow!("Failed to load configuration: {}", e)
    })?;
    if let Some(api_url) = args.api_url {
        config.api.base_url = api_url;
        config.validate()?;
    }

    // 2. 初始化日志
    telemetry::init_telemetry(&config.logging);

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        api = %config.api.base_url,
        "Cyrene client starting"
    );

    // 3. 构建应用状态（会话在此从存储恢复）
    let state = AppState::from_config(config)?;

    // 4. 执行命令
    cli::run(args.command, &state).await
}
