use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use photoguess::{
    api,
    auth::AuthConfig,
    config::ServerConfig,
    content::FsContentStore,
    state::{store::StateStore, AppState},
};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "photoguess=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting photo guessing game...");

    let config = ServerConfig::from_env();
    let auth_config = AuthConfig::from_env();

    let content = Arc::new(FsContentStore::new(&config.upload_dir));
    let store = StateStore::file(&config.data_file);
    let state = match AppState::open(store, content, auth_config).await {
        Ok(state) => Arc::new(state),
        Err(e) => {
            tracing::error!(
                "Could not load game document {}: {}",
                config.data_file.display(),
                e
            );
            std::process::exit(1);
        }
    };

    let app = api::router(state, &config);

    let addr = config.addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    tracing::info!("Listening on http://{}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
