use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use soven_ai::client::GenerativeModel;
use soven_ai::{
    DeadlineGenerator, DocumentScanner, GeminiClient, NegotiationAssistant, QueryClassifier,
    RequirementResolver,
};
use soven_core::config::Config;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

mod routes;

// ── Shared state ──────────────────────────────────────────────────────────

/// One stateless component per operation, all sharing a single model client.
pub struct AppState {
    pub resolver: RequirementResolver,
    pub scanner: DocumentScanner,
    pub deadlines: DeadlineGenerator,
    pub classifier: QueryClassifier,
    pub negotiator: NegotiationAssistant,
}

impl AppState {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self {
            resolver: RequirementResolver::new(Arc::clone(&model)),
            scanner: DocumentScanner::new(Arc::clone(&model)),
            deadlines: DeadlineGenerator::new(Arc::clone(&model)),
            classifier: QueryClassifier::new(Arc::clone(&model)),
            negotiator: NegotiationAssistant::new(model),
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "soven_server=info,soven_ai=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;
    if config.gemini_api_key.is_empty() {
        warn!("GEMINI_API_KEY is not set; every model call will fail and fall back");
    }

    let model: Arc<dyn GenerativeModel> = Arc::new(
        GeminiClient::new(config.gemini_api_key.clone())
            .with_model(&config.model)
            .with_base_url(&config.base_url)
            .with_timeout(config.http_timeout_s),
    );
    let state = Arc::new(AppState::new(model));

    let app = Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/requirements", post(routes::generate_requirements))
        .route("/api/requirements/:doc_name", get(routes::document_requirements))
        .route("/api/documents/scan", post(routes::scan_document))
        .route("/api/queries/analyse", post(routes::analyse_query))
        .route("/api/deadlines", post(routes::generate_deadlines))
        .route("/api/chat/assist", post(routes::chat_assist))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("{}:{}", config.bind, config.port);
    info!(model = %config.model, "listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down");
}
