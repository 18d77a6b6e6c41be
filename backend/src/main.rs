//! Salon site backend
//!
//! Serves the published salon content from flat JSON files and hosts the admin
//! editing sessions (undo/redo history, dirty tracking, publish).

mod api;
mod auth;
mod cache;
mod config;
mod errors;
mod images;
mod models;
mod publish;
mod session;
mod store;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cache::PublicCache;
use config::Config;
use images::ImageStore;
use session::SessionRegistry;
use store::{ContentStore, JsonFileStore};

/// Largest accepted image upload.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ContentStore>,
    pub cache: Arc<PublicCache>,
    pub sessions: Arc<SessionRegistry>,
    pub images: Arc<ImageStore>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting salon backend");
    tracing::info!("Data directory: {:?}", config.data_dir);
    tracing::info!("Image directory: {:?}", config.image_dir);
    tracing::info!("Bind address: {}", config.bind_addr);
    tracing::info!("Idle session ttl: {:?}", config.session_ttl);

    // Warn if PSK is not configured
    if config.api_psk.is_none() {
        tracing::warn!("No admin key configured (SALON_API_PSK). Admin routes are open!");
    }
    if config.last_writer_wins {
        tracing::warn!("Revision check disabled; concurrent publishes overwrite each other");
    }

    let store = JsonFileStore::open(&config.data_dir).await?;
    let revision = store.revision().await?;
    tracing::info!("Content store at revision {}", revision.revision_id);

    let images = ImageStore::open(&config.image_dir).await?;

    // Create application state
    let state = AppState {
        store: Arc::new(store),
        cache: Arc::new(PublicCache::new()),
        sessions: Arc::new(SessionRegistry::new(config.session_ttl)),
        images: Arc::new(images),
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone PSK for the auth layer
    let psk = state.config.api_psk.clone();

    // Admin routes
    let admin_routes = Router::new()
        // Editing sessions
        .route("/sessions", post(api::create_session))
        .route("/sessions/{id}", get(api::get_session))
        .route("/sessions/{id}", delete(api::delete_session))
        .route("/sessions/{id}/sections/{section}", put(api::update_section))
        .route(
            "/sessions/{id}/sections/{section}/reorder",
            post(api::reorder_section),
        )
        .route("/sessions/{id}/sections/{section}/items", post(api::add_item))
        .route(
            "/sessions/{id}/sections/{section}/items/{item_id}",
            delete(api::remove_item),
        )
        .route("/sessions/{id}/undo", post(api::undo))
        .route("/sessions/{id}/redo", post(api::redo))
        .route("/sessions/{id}/reload", post(api::reload_session))
        .route("/sessions/{id}/publish", post(api::publish))
        // Images
        .route(
            "/images",
            post(api::upload_image).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/images/delete", post(api::delete_image))
        // Apply PSK auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::admin_auth_layer(psk.clone(), req, next)
        }));

    // Public content (no auth required)
    let public_routes = Router::new()
        .route("/api/content", get(api::get_content))
        .route("/api/content/revision", get(api::get_revision))
        .route("/health", get(health_check));

    Router::new()
        .nest("/api/admin", admin_routes)
        .merge(public_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
