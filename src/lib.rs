//! Maintenance Dashboard
//!
//! Three independent tools behind one HTTP service.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  MAINTENANCE DASHBOARD                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌────────────────┐  ┌────────────────┐  ┌───────────────┐ │
//! │  │ Recommendation │  │ Anomaly        │  │ Report        │ │
//! │  │ (completion    │  │ Detection      │  │ Viewer        │ │
//! │  │  API client)   │  │ (iso. forest)  │  │ (static link) │ │
//! │  └───────┬────────┘  └───────┬────────┘  └───────────────┘ │
//! │          ▼                   ▼                              │
//! │   Chat completion     Dataset sessions                      │
//! │   service (remote)    (in memory, TTL)                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod logic;
pub mod models;
pub mod session;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};

pub use error::{AppError, AppResult};

use logic::completion::{CompletionClient, CompletionConfig, OpenAiClient};
use logic::recommendation::RecommendationGenerator;
use session::SessionStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: config::Config,
    pub recommender: RecommendationGenerator,
    pub sessions: SessionStore,
}

impl AppState {
    /// State backed by the configured completion service
    pub fn new(config: config::Config) -> Result<Self, reqwest::Error> {
        let client = OpenAiClient::new(CompletionConfig::from(&config))?;
        Ok(Self::with_completion_client(config, Arc::new(client)))
    }

    /// State backed by any completion client
    pub fn with_completion_client(config: config::Config, client: Arc<dyn CompletionClient>) -> Self {
        let sessions = SessionStore::new(
            chrono::Duration::minutes(config.session_ttl_minutes),
            config.max_sessions,
        );

        Self {
            recommender: RecommendationGenerator::new(client),
            sessions,
            config,
        }
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Recommendations
        .route("/api/v1/recommendations", post(handlers::recommendations::generate))

        // Dataset sessions
        .route("/api/v1/datasets", post(handlers::datasets::upload))
        .route("/api/v1/datasets/:id", get(handlers::datasets::get).delete(handlers::datasets::delete))
        .route(
            "/api/v1/datasets/:id/anomalies",
            post(handlers::anomalies::detect).get(handlers::anomalies::latest),
        )

        // One-shot detection
        .route("/api/v1/anomalies", post(handlers::anomalies::detect_upload))

        // Reports
        .route("/api/v1/report", get(handlers::reports::link))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes()));

    Router::new()
        .route("/", get(handlers::dashboard::index))
        .route("/health", get(handlers::health::check))
        .merge(api_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
