use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use photoshare_assets::{
    AssetStore,
    config::ServerConfig,
    http::{self, AppState},
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    let store = Arc::new(AssetStore::new(
        config.uploads_dir.clone(),
        config.thumbnails_dir.clone(),
    ));
    let state = AppState {
        store,
        public_url: config.public_url.clone(),
    };
    let router = http::router(state, config.max_upload_bytes);
    let tcp_listener = tokio::net::TcpListener::bind(&config.bind_address).await?;

    tracing::info!(
        bind_address = %config.bind_address,
        uploads_dir = %config.uploads_dir.display(),
        thumbnails_dir = %config.thumbnails_dir.display(),
        "photo asset server started"
    );

    axum::serve(tcp_listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
