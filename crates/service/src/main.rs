use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path as AxumPath, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{routing::get, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use rptqa_core::{MetadataStore, QaError, ReportMetadata};
use rptqa_llm::{Completion, CompletionOptions, LlmClient, LlmError};
use rptqa_qa::{QaResult, QaService};

#[derive(Clone)]
struct AppState {
    qa: Arc<QaService>,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt::init();

    let store = Arc::new(MetadataStore::new());
    let completion: Option<Arc<dyn Completion>> = match LlmClient::from_env() {
        Ok(client) => {
            info!(capability = %client.describe(), "language model configured");
            Some(Arc::new(client))
        }
        Err(LlmError::Unconfigured(var)) => {
            warn!(missing = var, "running degraded: no language model credential");
            None
        }
        Err(err) => return Err(err.into()),
    };

    let timeout_secs: u64 = std::env::var("RPTQA_LLM_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(30);
    let options = CompletionOptions {
        timeout: Duration::from_secs(timeout_secs),
        ..CompletionOptions::default()
    };
    let qa = Arc::new(QaService::new(store, completion).with_options(options));
    let state = Arc::new(AppState { qa });

    let app = Router::new()
        .route("/reports/:id/ask", post(handle_ask))
        .route(
            "/reports/:id/suggested-questions",
            get(handle_suggestions),
        )
        .route(
            "/reports/:id/metadata",
            get(handle_get_metadata).put(handle_put_metadata),
        )
        .route("/health/llm", get(handle_health))
        .with_state(state);

    let addr: SocketAddr = std::env::var("RPTQA_BIND")
        .unwrap_or_else(|_| "0.0.0.0:8000".to_string())
        .parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Debug, Deserialize)]
struct AskRequest {
    question: String,
}

#[derive(Debug, Serialize)]
struct AskResponse {
    success: bool,
    question: String,
    answer: String,
    confidence: f64,
    confidence_reasoning: String,
    sources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorBody>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    kind: &'static str,
    message: String,
}

impl From<QaResult> for AskResponse {
    fn from(result: QaResult) -> Self {
        let error = result.error.map(|err| ErrorBody {
            kind: err.kind(),
            message: err.to_string(),
        });
        Self {
            success: error.is_none(),
            question: result.question,
            answer: result.answer,
            confidence: result.confidence,
            confidence_reasoning: result.confidence_reasoning,
            sources: result.sources,
            error,
        }
    }
}

async fn handle_ask(
    State(state): State<Arc<AppState>>,
    AxumPath(report_id): AxumPath<String>,
    Json(request): Json<AskRequest>,
) -> Json<AskResponse> {
    let result = state.qa.answer_question(&report_id, &request.question).await;
    Json(AskResponse::from(result))
}

#[derive(Debug, Serialize)]
struct SuggestionsResponse {
    report_id: String,
    questions: Vec<String>,
}

async fn handle_suggestions(
    State(state): State<Arc<AppState>>,
    AxumPath(report_id): AxumPath<String>,
) -> Response {
    match state.qa.suggested_questions(&report_id) {
        Ok(questions) => Json(SuggestionsResponse {
            report_id,
            questions,
        })
        .into_response(),
        Err(err) => error_response(err),
    }
}

async fn handle_get_metadata(
    State(state): State<Arc<AppState>>,
    AxumPath(report_id): AxumPath<String>,
) -> Response {
    match state.qa.store().get(&report_id) {
        Some(metadata) => Json(metadata.as_ref().clone()).into_response(),
        None => error_response(QaError::ReportNotFound(report_id)),
    }
}

#[derive(Debug, Serialize)]
struct StoreResponse {
    report_id: String,
    stored: bool,
}

/// Ingest path for the upload/parse collaborator: publishes (or replaces) a
/// parsed metadata record under the id in the URL.
async fn handle_put_metadata(
    State(state): State<Arc<AppState>>,
    AxumPath(report_id): AxumPath<String>,
    Json(mut metadata): Json<ReportMetadata>,
) -> Json<StoreResponse> {
    metadata.report_id = report_id.clone();
    state.qa.store().insert(metadata);
    Json(StoreResponse {
        report_id,
        stored: true,
    })
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    available: bool,
    detail: String,
}

async fn handle_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let health = state.qa.capability_health();
    Json(HealthResponse {
        available: health.available,
        detail: health.detail,
    })
}

fn error_response(err: QaError) -> Response {
    let status = match err {
        QaError::ReportNotFound(_) => StatusCode::NOT_FOUND,
        QaError::InvalidQuestion => StatusCode::BAD_REQUEST,
        _ => StatusCode::SERVICE_UNAVAILABLE,
    };
    (
        status,
        Json(ErrorBody {
            kind: err.kind(),
            message: err.to_string(),
        }),
    )
        .into_response()
}
