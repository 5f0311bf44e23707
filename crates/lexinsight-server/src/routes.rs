use std::{convert::Infallible, sync::Arc};

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json, Response,
    },
};
use lexinsight_agent::AnalysisSession;
use lexinsight_core::{
    document::{CaseDocument, CaseInput},
    transport::AnalysisTransport,
    AnalysisFailure,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio_stream::{wrappers::BroadcastStream, StreamExt};
use tracing::{error, info};

use crate::AppState;

// ── Error helpers ─────────────────────────────────────────────────────────

fn error_json(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn failure_response(failure: &AnalysisFailure) -> Response {
    let status = StatusCode::from_u16(failure.status_code()).unwrap_or(StatusCode::BAD_GATEWAY);
    (
        status,
        Json(json!({
            "error": failure.to_string(),
            "title": failure.title(),
            "description": failure.description(),
        })),
    )
        .into_response()
}

// ── Request body types ────────────────────────────────────────────────────

/// `caseText` must be a non-empty string; anything else is a bad request.
fn case_text_from(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value
        .get("caseText")?
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnalyzeBody {
    #[serde(default)]
    pub case_text: String,
    pub document_name: Option<String>,
    pub document_text: Option<String>,
}

// ── Handlers ──────────────────────────────────────────────────────────────

pub(crate) async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "uptime_s": state.start_time.elapsed().as_secs(),
    }))
}

/// Relay: add the instruction and credential, then pass the upstream SSE
/// body through untouched.
pub(crate) async fn analyze_case(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let Some(case_text) = case_text_from(&body) else {
        return error_json(StatusCode::BAD_REQUEST, "Case text is required");
    };

    if !state.gateway.is_configured() {
        error!(category = "relay", "GATEWAY_API_KEY is not configured");
        return error_json(StatusCode::INTERNAL_SERVER_ERROR, "AI service not configured");
    }

    info!(category = "relay", case_len = case_text.len(), "starting case analysis");

    match state.gateway.open(&case_text).await {
        Ok(stream) => {
            info!(category = "relay", "streaming response from gateway");
            (
                [
                    (header::CONTENT_TYPE, "text/event-stream"),
                    (header::CACHE_CONTROL, "no-cache"),
                ],
                Body::from_stream(stream),
            )
                .into_response()
        }
        Err(AnalysisFailure::RateLimited) => error_json(
            StatusCode::TOO_MANY_REQUESTS,
            "Rate limit exceeded, please try again later.",
        ),
        Err(AnalysisFailure::QuotaExhausted) => {
            error_json(StatusCode::PAYMENT_REQUIRED, "AI service quota reached.")
        }
        Err(e) => {
            error!(category = "relay", "AI gateway error: {e}");
            error_json(StatusCode::INTERNAL_SERVER_ERROR, "AI gateway error")
        }
    }
}

/// Run the whole pipeline here and answer with the normalized analysis.
/// Nothing is kept between requests.
pub(crate) async fn analyze(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let Ok(body) = serde_json::from_slice::<AnalyzeBody>(&body) else {
        return failure_response(&AnalysisFailure::EmptyInput);
    };
    if !state.gateway.is_configured() {
        error!(category = "relay", "GATEWAY_API_KEY is not configured");
        return error_json(StatusCode::INTERNAL_SERVER_ERROR, "AI service not configured");
    }

    let mut input = CaseInput::new(body.case_text);
    if let Some(text) = body.document_text {
        input = input.with_document(CaseDocument {
            name: body.document_name.unwrap_or_else(|| "document".into()),
            text,
        });
    }

    let mut session = AnalysisSession::new(
        Arc::clone(&state.gateway),
        state.profile.clone(),
        state.timeout,
    );
    match session.analyze(&input).await {
        Ok(analysis) => Json(analysis).into_response(),
        Err(failure) => failure_response(&failure),
    }
}

// SSE logs

pub(crate) async fn sse_logs(
    State(state): State<Arc<AppState>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    // Subscribe before snapshotting the ring so no event falls in between.
    let rx = state.log_tx.subscribe();
    let history: Vec<String> = state
        .log_ring
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .iter()
        .cloned()
        .collect();

    let replay = tokio_stream::iter(history).map(|data| Ok::<_, Infallible>(Event::default().data(data)));
    let live = BroadcastStream::new(rx).filter_map(|msg| msg.ok().map(|data| Ok(Event::default().data(data))));
    Sse::new(replay.chain(live)).keep_alive(
        KeepAlive::new()
            .interval(std::time::Duration::from_secs(15))
            .text("ping"),
    )
}
