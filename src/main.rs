mod models;
mod handlers;
mod routes;
mod docs;
mod websocket;
mod config;
mod hub;
mod services;

use axum::{http::HeaderValue, routing::get, Router};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use routes::create_api_routes;
use docs::ApiDoc;
use config::Config;
use hub::insights::InsightStore;
use hub::registry::RoomRegistry;
use services::analysis::{Analyzer, BuiltinAnalyzer};
use services::feedback::{FeedbackEngine, TemplateFeedback};
use websocket::handler::websocket_handler;
use tracing::{info, error, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use std::panic;
use std::sync::Arc;

/// Shared state handed to every handler and connection task
pub struct AppState {
    pub config: Config,
    pub rooms: RoomRegistry,
    pub insights: InsightStore,
    pub analyzer: Arc<dyn Analyzer>,
    pub feedback: Arc<dyn FeedbackEngine>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let insights = InsightStore::new(config.max_records_per_kind);
        Self {
            rooms: RoomRegistry::new(),
            insights,
            analyzer: Arc::new(BuiltinAnalyzer),
            feedback: Arc::new(TemplateFeedback),
            config,
        }
    }
}

#[tokio::main]
async fn main() {

    // Set panic hook for better error messages
    panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
    }));

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            // Default to info level, but allow debug for our app
            "colabri_rtc=debug,tower_http=debug,axum::rejection=trace,info".into()
        }))
        .init();

    info!("Starting server...");

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        warn!("Using default configuration");
        Config::default()
    });
    info!("Environment: {}", config.environment);

    let app_state = Arc::new(AppState::new(config.clone()));

    // Periodically drop sessions that sit idle with no connections
    let sweep_state = app_state.clone();
    tokio::spawn(async move {
        let max_idle = chrono::Duration::seconds(sweep_state.config.session_idle_secs as i64);
        let every = std::time::Duration::from_secs(sweep_state.config.session_sweep_secs);
        loop {
            tokio::time::sleep(every).await;
            sweep_state.insights.sweep_idle(max_idle, chrono::Utc::now()).await;
        }
    });

    // Create API routes
    let api_routes = create_api_routes(app_state.clone());

    // Combine all routes
    let app_routes = Router::new()
        // Mount the stream endpoint
        .route("/ws/:channel_id", get(websocket_handler))
        .with_state(app_state)
        // Mount API routes
        .nest("/api", api_routes)
        // Mount Swagger UI
        .merge(SwaggerUi::new("/swagger").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add tracing layer
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config));

    // Start the server
    let listener = tokio::net::TcpListener::bind(config.server_address())
        .await
        .unwrap_or_else(|_| panic!("Failed to bind to {}", config.server_address()));

    info!("🚀 Server running on http://{}", config.server_address());
    info!("📡 WebSocket available at ws://{}/ws/:channel_id", config.server_address());
    info!("📚 Swagger UI available at http://{}/swagger", config.server_address());

    axum::serve(listener, app_routes)
        .await
        .expect("Server failed to start");
}

/// Allow the configured origins, or anything when none are configured
fn cors_layer(config: &Config) -> CorsLayer {
    match &config.cors_origins {
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        }
        None => CorsLayer::permissive(),
    }
}
