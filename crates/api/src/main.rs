use std::sync::Arc;

use anyhow::Context;
use twinapi_api::app::{build_app, services::AppServices};
use twinapi_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = AppConfig::load().context("failed to load configuration")?;
    twinapi_observability::init(&cfg.logger.level, cfg.logger.json);

    let app = build_app(Arc::new(AppServices::in_memory()));

    let listener = tokio::net::TcpListener::bind(&cfg.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.server.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
