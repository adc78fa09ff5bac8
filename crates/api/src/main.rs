use anyhow::Context;

use rogerbank_api::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rogerbank_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!(?config, "starting");

    let app = rogerbank_api::app::build_app(&config).await?;

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
