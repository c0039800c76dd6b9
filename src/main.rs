use axum::Router;
use gsyrocks::config::Config;
use gsyrocks::services::DraftPersistence;
use gsyrocks::AppState;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gsyrocks=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| format!("Failed to load configuration: {}", e))?;

    tracing::info!("Starting gsyrocks API server");
    tracing::info!(
        "Draft store: {:?}, TTL {}s, upload limit {} bytes",
        config.draft_backend,
        config.drafts.ttl.as_secs(),
        config.max_upload_bytes
    );

    // Initialize draft store: Redis falls back to in-memory when unreachable
    let store = gsyrocks::store::create_store(&config).await?;
    tracing::info!("Draft store ready ({})", store.backend_name());

    let state = Arc::new(AppState {
        drafts: DraftPersistence::new(store, config.drafts.ttl),
        max_upload_bytes: config.max_upload_bytes,
    });

    // Build router with CORS and tracing
    let app = Router::new()
        .nest("/api/v1", gsyrocks::routes::create_router(state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = config.server_address();
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
