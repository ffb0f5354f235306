//! Trends API server.
//!
//! Reads [`Settings`] from flags and the environment, connects the cache,
//! serves the API until Ctrl-C or SIGTERM, then releases the cache.

use clap::Parser;
use tracing::info;
use trends::TrendCache;
use trends_server::{AppState, Settings, build_router, shutdown_signal};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("trends=info".parse()?)
                .add_directive("trends_server=info".parse()?),
        )
        .init();

    let settings = Settings::parse();
    info!("{} v{} starting", settings.app_name, settings.app_version);
    info!("Environment: {}", settings.environment);

    let addr = settings.listen_addr.clone();
    let state = AppState::connect(settings).await?;
    let app = build_router(state.clone());

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.service.cache().disconnect().await;
    info!("Server shutdown complete");
    Ok(())
}
