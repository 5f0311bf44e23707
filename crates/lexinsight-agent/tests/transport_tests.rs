// Tests for the HTTP transports against an in-process upstream.
//
// Covers:
//   - the gateway request carries bearer auth, model, both messages and stream:true
//   - the relay request carries {caseText} and the publishable key
//   - 429 / 402 / 500 answers map to RateLimited / QuotaExhausted / Service
//   - a 200 SSE body is handed back untouched and drives a full session
//   - a missing gateway credential fails without any request
//   - an unreachable endpoint is a transport failure

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use futures_util::TryStreamExt;
use lexinsight_agent::{AnalysisSession, EndpointTransport, GatewayTransport};
use lexinsight_core::{document::CaseInput, transport::AnalysisTransport, AnalysisFailure};
use lexinsight_domains::legal::legal_profile;
use serde_json::{json, Value};

#[derive(Default)]
struct Seen {
    auth: Option<String>,
    body: Option<Value>,
}

#[derive(Clone)]
struct Upstream {
    status: StatusCode,
    body: String,
    seen: Arc<Mutex<Seen>>,
}

async fn handler(State(up): State<Upstream>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    {
        let mut seen = up.seen.lock().unwrap();
        seen.auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        seen.body = Some(body);
    }
    let content_type = if up.status.is_success() {
        "text/event-stream"
    } else {
        "application/json"
    };
    (up.status, [("content-type", content_type)], up.body).into_response()
}

/// Serve `status`/`body` on 127.0.0.1:0; returns the base URL.
async fn spawn_upstream(status: StatusCode, body: &str) -> (String, Arc<Mutex<Seen>>) {
    let seen = Arc::new(Mutex::new(Seen::default()));
    let state = Upstream {
        status,
        body: body.to_string(),
        seen: Arc::clone(&seen),
    };
    let app = Router::new().route("/v1/chat", post(handler)).with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/v1/chat"), seen)
}

fn sse(texts: &[&str]) -> String {
    let mut body = String::new();
    for t in texts {
        body.push_str(&format!(
            "data: {}\n\n",
            json!({"choices": [{"delta": {"content": t}}]})
        ));
    }
    body.push_str("data: [DONE]\n\n");
    body
}

async fn read_all(t: &dyn AnalysisTransport, case: &str) -> Result<String, AnalysisFailure> {
    let stream = t.open(case).await?;
    let chunks: Vec<bytes::Bytes> = stream.try_collect().await.unwrap();
    Ok(chunks
        .iter()
        .map(|c| String::from_utf8_lossy(c).into_owned())
        .collect())
}

// =============================================================================
// Gateway
// =============================================================================

#[tokio::test]
async fn test_gateway_request_shape() {
    let body = sse(&["ok"]);
    let (url, seen) = spawn_upstream(StatusCode::OK, &body).await;
    let gw = GatewayTransport::new(url, "sk-test", "google/gemini-2.5-flash", legal_profile()).unwrap();

    assert_eq!(read_all(&gw, "Wrongful termination").await.unwrap(), body);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.auth.as_deref(), Some("Bearer sk-test"));
    let sent = seen.body.as_ref().unwrap();
    assert_eq!(sent["model"], "google/gemini-2.5-flash");
    assert_eq!(sent["stream"], true);
    assert_eq!(sent["messages"][0]["role"], "system");
    assert!(sent["messages"][1]["content"]
        .as_str()
        .unwrap()
        .ends_with("\n\nWrongful termination"));
}

#[tokio::test]
async fn test_gateway_without_key_fails_fast() {
    let gw = GatewayTransport::new("http://127.0.0.1:9/never", "", "m", legal_profile()).unwrap();
    let err = gw.open("case").await.err().unwrap();
    assert!(matches!(err, AnalysisFailure::Service { status: 500, .. }));
}

#[tokio::test]
async fn test_status_mapping() {
    let cases = [
        (StatusCode::TOO_MANY_REQUESTS, AnalysisFailure::RateLimited),
        (StatusCode::PAYMENT_REQUIRED, AnalysisFailure::QuotaExhausted),
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            AnalysisFailure::Service {
                status: 500,
                message: "AI gateway error".into(),
            },
        ),
    ];
    for (status, expected) in cases {
        let body = json!({"error": "AI gateway error"}).to_string();
        let (url, _) = spawn_upstream(status, &body).await;
        let gw = GatewayTransport::new(url, "sk", "m", legal_profile()).unwrap();
        assert_eq!(gw.open("case").await.err(), Some(expected));
    }
}

// =============================================================================
// Relay endpoint
// =============================================================================

#[tokio::test]
async fn test_endpoint_sends_case_text() {
    let (url, seen) = spawn_upstream(StatusCode::OK, &sse(&["x"])).await;
    let ep = EndpointTransport::new(url, "pk-anon").unwrap();
    read_all(&ep, "Property dispute").await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.auth.as_deref(), Some("Bearer pk-anon"));
    assert_eq!(seen.body, Some(json!({"caseText": "Property dispute"})));
}

#[tokio::test]
async fn test_endpoint_unreachable_is_transport_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let ep = EndpointTransport::new(format!("http://{addr}/x"), "").unwrap();
    assert!(matches!(ep.open("case").await, Err(AnalysisFailure::Transport(_))));
}

#[tokio::test]
async fn test_session_over_http() {
    let reply = r#"{"jurisdiction":{"correctForum":"Labour Court, Chennai","limitationStatus":"Borderline"}}"#;
    let (first, rest) = reply.split_at(40);
    let (url, _) = spawn_upstream(StatusCode::OK, &sse(&[first, rest])).await;
    let ep = EndpointTransport::new(url, "").unwrap();
    let mut session = AnalysisSession::new(ep, legal_profile(), Duration::from_secs(10));

    let analysis = session.analyze(&CaseInput::new("Dismissed without notice")).await.unwrap();
    assert_eq!(analysis.jurisdiction.correct_forum, "Labour Court, Chennai");
    assert_eq!(analysis.jurisdiction.limitation_status.as_str(), "Borderline");
    assert_eq!(analysis.raw_analysis, reply);
}
