use std::sync::Arc;

use anyhow::Context;

use maintrack_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    maintrack_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!(?config, "starting maintrack-api");

    let services = maintrack_api::app::build_services(&config)
        .await
        .context("failed to initialize services")?;
    let app = maintrack_api::app::build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
