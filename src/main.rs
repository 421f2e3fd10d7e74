use anyhow::Result;
use tracing::info;

use shipdoc::config::ServerConfig;
use shipdoc::server::{router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("shipdoc=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let state = AppState::new(config.options.clone());

    if let Some(source) = config.signature_source.clone() {
        state.prefetch_signature(source);
    }

    let app = router(state);

    info!("Shipment document service listening on http://{}", config.addr);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
