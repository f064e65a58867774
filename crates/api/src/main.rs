use anyhow::Context;

use storeops_infra::StoreOpsConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = StoreOpsConfig::from_env().context("invalid configuration")?;
    storeops_observability::init(config.log_format);

    let app = storeops_api::app::build_app(&config)
        .await
        .context("failed to start services")?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
