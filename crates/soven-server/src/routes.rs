use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use soven_core::progress::{format_transcript, ChatMessage, ProgressSnapshot};
use soven_core::types::{Outcome, VisualReference};
use tracing::warn;

use crate::AppState;

/// How many trailing chat messages the negotiation assistant sees.
const TRANSCRIPT_WINDOW: usize = 10;

// ── Request bodies ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(crate) struct QueryBody {
    query: String,
}

#[derive(Deserialize)]
pub(crate) struct ScanBody {
    #[serde(default = "default_scan_query")]
    query: String,
    doc_type: String,
    image: String,
    #[serde(default)]
    required_elements: Vec<String>,
    #[serde(default)]
    visual_reference: VisualReference,
}

fn default_scan_query() -> String {
    "General legal validation".to_string()
}

#[derive(Deserialize)]
pub(crate) struct AssistBody {
    #[serde(default = "default_main_query")]
    query: String,
    #[serde(default)]
    progress: ProgressSnapshot,
    #[serde(default)]
    messages: Vec<ChatMessage>,
}

fn default_main_query() -> String {
    "General legal consultation".to_string()
}

// ── Handlers ──────────────────────────────────────────────────────────────

pub(crate) async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn generate_requirements(
    State(state): State<Arc<AppState>>,
    Json(body): Json<QueryBody>,
) -> (StatusCode, Json<Value>) {
    if body.query.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "status": "error", "message": "No query provided" })),
        );
    }

    match state.resolver.resolve(&body.query).await {
        Outcome::Answered(checklist) | Outcome::Fallback { value: checklist, .. } => (
            StatusCode::OK,
            Json(json!({ "status": "success", "documents": checklist.documents })),
        ),
        Outcome::Failed { reason } => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "status": "error", "message": reason })),
        ),
    }
}

pub(crate) async fn document_requirements(
    State(state): State<Arc<AppState>>,
    Path(doc_name): Path<String>,
) -> (StatusCode, Json<Value>) {
    match state.resolver.lookup(&doc_name).await {
        Outcome::Answered(doc) | Outcome::Fallback { value: doc, .. } => (
            StatusCode::OK,
            Json(json!({ "status": "success", "document": doc })),
        ),
        Outcome::Failed { reason } => {
            let code = if reason == soven_ai::requirements::NOT_FOUND {
                StatusCode::NOT_FOUND
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (code, Json(json!({ "status": "error", "message": reason })))
        }
    }
}

pub(crate) async fn scan_document(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ScanBody>,
) -> (StatusCode, Json<Value>) {
    if body.image.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "No image found for this document" })),
        );
    }

    let verdict = state
        .scanner
        .scan(
            &body.query,
            &body.doc_type,
            &body.image,
            &body.required_elements,
            &body.visual_reference,
        )
        .await;
    let summary = verdict.summary();

    (
        StatusCode::OK,
        Json(json!({
            "message": "Document scanned successfully!",
            "result": verdict,
            "summary": summary,
        })),
    )
}

pub(crate) async fn analyse_query(
    State(state): State<Arc<AppState>>,
    Json(body): Json<QueryBody>,
) -> (StatusCode, Json<Value>) {
    if body.query.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "No query provided" })),
        );
    }

    let result = state.classifier.classify(&body.query).await;
    (
        StatusCode::OK,
        Json(json!({ "message": "Analysis complete", "result": result })),
    )
}

pub(crate) async fn generate_deadlines(
    State(state): State<Arc<AppState>>,
    Json(body): Json<QueryBody>,
) -> (StatusCode, Json<Value>) {
    if body.query.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "status": "error", "message": "No query provided" })),
        );
    }

    let deadlines = match state.deadlines.generate(&body.query).await {
        Outcome::Answered(deadlines) => deadlines,
        Outcome::Fallback { value, reason } => {
            warn!(reason = %reason, "serving fallback deadline schedule");
            value
        }
        // Unreachable today: generate() never returns Failed.
        Outcome::Failed { reason } => {
            warn!(reason = %reason, "deadline generation failed outright");
            return (
                StatusCode::OK,
                Json(json!({ "status": "error", "message": "Could not generate any valid deadlines" })),
            );
        }
    };

    (
        StatusCode::OK,
        Json(json!({ "status": "success", "deadlines": deadlines })),
    )
}

pub(crate) async fn chat_assist(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AssistBody>,
) -> Json<Value> {
    let progress_summary = body.progress.summary();
    let transcript = format_transcript(&body.messages, TRANSCRIPT_WINDOW);

    let context = state
        .negotiator
        .assist(&body.query, &progress_summary, &transcript)
        .await;

    Json(json!({
        "success": true,
        "suggested_message": context.reply,
        "context": {
            "main_query": body.query,
            "progress_percentage": body.progress.overall_completion(),
            "recent_messages": body.messages.len(),
        },
    }))
}
