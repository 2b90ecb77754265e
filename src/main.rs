//src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use previdencia_backend::{
    app,
    config::{AppConfig, AppState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Carrega o .env antes do logger para que RUST_LOG valha também de lá
    let config = AppConfig::from_env()?;

    // RUST_LOG controla o nível; padrão "info" com o trace HTTP em debug
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .with_target(false)
        .compact()
        .init();

    let app_state = AppState::new(&config).await?;

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app(app_state)).await?;
    Ok(())
}
