use anyhow::Context;
use jobportal_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    jobportal_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let app = jobportal_api::app::build_app(&config).await.context("failed to build services")?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        auth_mode = ?config.auth_mode,
        persistent = config.use_persistent_stores,
        "listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
