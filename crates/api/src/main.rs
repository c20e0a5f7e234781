use std::sync::Arc;

use anyhow::Context;

use siteerp_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    siteerp_observability::init(config.log_format);

    let services = siteerp_api::app::services::build_services(&config)
        .await
        .context("failed to start services")?;
    let app = siteerp_api::app::build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
