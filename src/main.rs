use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quizroom::{api, config::ServerConfig, llm::LlmConfig, state::AppState, store::StoreConfig};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quizroom=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting quizroom...");

    // Collaborators are chosen once here and injected into every request
    let server_config = ServerConfig::from_env();
    let store_config = StoreConfig::from_env();
    let llm_config = LlmConfig::from_env();

    let store = match store_config.connect().await {
        Ok(store) => {
            tracing::info!("Using {} store", store.name());
            store
        }
        Err(e) => {
            tracing::error!("Failed to connect to store: {}", e);
            std::process::exit(1);
        }
    };

    let llm = match llm_config.build_provider() {
        Ok(provider) => {
            tracing::info!("Using {} LLM provider", provider.name());
            provider
        }
        Err(e) => {
            tracing::error!("Failed to initialize LLM provider: {}", e);
            std::process::exit(1);
        }
    };

    let state = Arc::new(AppState::new(store, llm, llm_config));
    let app = api::router(state, server_config.static_dir);

    let addr = server_config.bind_addr;
    tracing::info!("Listening on http://{}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}
