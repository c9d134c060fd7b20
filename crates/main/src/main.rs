//! 主应用程序入口
//!
//! 启动实时推送的注册/心跳/状态接口。

use std::sync::Arc;

use anyhow::Context;
use config::AppConfig;
use infrastructure::Infrastructure;
use tracing_subscriber::EnvFilter;
use web_api::{router, AppState, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    tracing::info!(
        environment = config.environment.as_str(),
        delivery_url = %config.realtime.delivery_url,
        channel = %config.realtime.channel,
        "configuration loaded"
    );

    if config.database.is_none() {
        tracing::warn!("no database configured, using in-memory storage");
    }

    let infrastructure = Infrastructure::connect(&config)
        .await
        .context("connecting infrastructure")?;

    let jwt_service = Arc::new(JwtService::new(config.jwt.clone()));
    let state = AppState::new(Arc::new(infrastructure.realtime_service()), jwt_service);

    let app = router(state);
    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {address}"))?;

    tracing::info!(address = %address, "realtime API listening");
    axum::serve(listener, app).await?;

    Ok(())
}
