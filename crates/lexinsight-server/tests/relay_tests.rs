// Route tests for the relay service, driven with tower::ServiceExt::oneshot
// against an in-process fake gateway.
//
// Covers:
//   - missing / non-string / empty caseText → 400 "Case text is required"
//   - no gateway credential → 500 "AI service not configured"
//   - gateway 429 / 402 / 503 → 429 / 402 / 500 with the relay's own messages
//   - gateway 200 → text/event-stream with the body passed through byte for byte
//   - /api/analyze returns a normalized analysis, or the mapped failure as JSON
//   - /api/logs replays the ring, then tails live lines
//   - /api/health and CORS preflight

use std::{sync::Arc, time::Duration, time::Instant};

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::IntoResponse,
    routing::post,
    Router,
};
use lexinsight_agent::GatewayTransport;
use lexinsight_domains::legal::legal_profile;
use lexinsight_server::{
    build_router,
    logging::{BroadcastLayer, LogRing},
    AppState,
};
use serde_json::{json, Value};
use tokio::sync::broadcast;
use tokio_stream::StreamExt;
use tower::ServiceExt;

/// Fake chat-completions gateway answering every POST with `status`/`body`.
async fn spawn_gateway(status: StatusCode, body: String) -> String {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(move || {
            let body = body.clone();
            async move { (status, [("content-type", "text/event-stream")], body).into_response() }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/v1/chat/completions")
}

fn app(gateway_url: &str, api_key: &str) -> Router {
    let (log_tx, _) = broadcast::channel(16);
    let layer = BroadcastLayer::new(log_tx.clone());
    app_with_logs(gateway_url, api_key, log_tx, layer.ring)
}

fn app_with_logs(
    gateway_url: &str,
    api_key: &str,
    log_tx: broadcast::Sender<String>,
    log_ring: LogRing,
) -> Router {
    let gateway = GatewayTransport::new(gateway_url, api_key, "google/gemini-2.5-flash", legal_profile()).unwrap();
    build_router(Arc::new(AppState {
        gateway: Arc::new(gateway),
        profile: legal_profile(),
        timeout: Duration::from_secs(10),
        start_time: Instant::now(),
        log_tx,
        log_ring,
    }))
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_text(resp: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    serde_json::from_str(&body_text(resp).await).unwrap()
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

// =============================================================================
// Relay input validation
// =============================================================================

#[tokio::test]
async fn test_case_text_required() {
    let app = app("http://127.0.0.1:9/unused", "sk");
    for body in ["{}", r#"{"caseText": 42}"#, r#"{"caseText": ""}"#, "not json"] {
        let resp = app
            .clone()
            .oneshot(post_json("/functions/v1/analyze-case", body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body {body}");
        assert_eq!(body_json(resp).await, json!({"error": "Case text is required"}));
    }
}

#[tokio::test]
async fn test_missing_credential() {
    let app = app("http://127.0.0.1:9/unused", "");
    let resp = app
        .oneshot(post_json("/functions/v1/analyze-case", r#"{"caseText":"x"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(resp).await, json!({"error": "AI service not configured"}));
}

// =============================================================================
// Upstream status mapping
// =============================================================================

#[tokio::test]
async fn test_upstream_failures_mapped() {
    let cases = [
        (
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::TOO_MANY_REQUESTS,
            "Rate limit exceeded, please try again later.",
        ),
        (
            StatusCode::PAYMENT_REQUIRED,
            StatusCode::PAYMENT_REQUIRED,
            "AI service quota reached.",
        ),
        (
            StatusCode::SERVICE_UNAVAILABLE,
            StatusCode::INTERNAL_SERVER_ERROR,
            "AI gateway error",
        ),
    ];
    for (upstream, expected, message) in cases {
        let url = spawn_gateway(upstream, "upstream said no".into()).await;
        let resp = app(&url, "sk")
            .oneshot(post_json("/functions/v1/analyze-case", r#"{"caseText":"x"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), expected);
        assert_eq!(body_json(resp).await, json!({ "error": message }));
    }
}

#[tokio::test]
async fn test_success_passes_stream_through() {
    let upstream = format!(": keep-alive\n\n{}", sse(&["Section ", "138"]));
    let url = spawn_gateway(StatusCode::OK, upstream.clone()).await;
    let resp = app(&url, "sk")
        .oneshot(post_json("/functions/v1/analyze-case", r#"{"caseText":"Cheque bounced"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "text/event-stream"
    );
    assert_eq!(body_text(resp).await, upstream);
}

// =============================================================================
// Server-side analysis
// =============================================================================

#[tokio::test]
async fn test_server_side_analysis() {
    let reply = r#"{"riskOutcome":{"successProbability":"LOW"},"precedents":{"judicialAttitude":"Strict"}}"#;
    let url = spawn_gateway(StatusCode::OK, sse(&[&reply[..30], &reply[30..]])).await;
    let resp = app(&url, "sk")
        .oneshot(post_json(
            "/api/analyze",
            r#"{"caseText":"Anticipatory bail","documentName":"fir.txt","documentText":"FIR 12/2024"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let analysis = body_json(resp).await;
    assert_eq!(analysis["riskOutcome"]["successProbability"], "LOW");
    assert_eq!(analysis["precedents"]["judicialAttitude"], "Strict");
    assert_eq!(analysis["inputSummary"], "Anticipatory bail");
    assert_eq!(analysis["factEvidence"]["evidenceStrength"], "Moderate");
}

#[tokio::test]
async fn test_server_side_analysis_failure_is_described() {
    let url = spawn_gateway(StatusCode::TOO_MANY_REQUESTS, "{}".into()).await;
    let resp = app(&url, "sk")
        .oneshot(post_json("/api/analyze", r#"{"caseText":"x"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = body_json(resp).await;
    assert_eq!(body["title"], "Rate limit exceeded");
    assert_eq!(body["description"], "Too many requests. Please wait a moment and try again.");
}

#[tokio::test]
async fn test_server_side_malformed_body_is_described() {
    for body in ["not json", r#"{"caseText": 42}"#] {
        let resp = app("http://127.0.0.1:9/unused", "sk")
            .oneshot(post_json("/api/analyze", body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body {body}");
        let body = body_json(resp).await;
        assert_eq!(body["title"], "Input required");
        assert!(body["description"].is_string());
    }
}

#[tokio::test]
async fn test_server_side_blank_input() {
    let resp = app("http://127.0.0.1:9/unused", "sk")
        .oneshot(post_json("/api/analyze", r#"{"caseText":"  "}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["title"], "Input required");
}

// =============================================================================
// Misc
// =============================================================================

#[tokio::test]
async fn test_health() {
    let resp = app("http://127.0.0.1:9/unused", "")
        .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert!(body["uptime_s"].is_u64());
}

#[tokio::test]
async fn test_cors_preflight() {
    let resp = app("http://127.0.0.1:9/unused", "")
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/functions/v1/analyze-case")
                .header("origin", "http://localhost:5173")
                .header("access-control-request-method", "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(resp.status().is_success());
    assert!(resp.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_logs_replay_ring_then_tail_live() {
    let (log_tx, _) = broadcast::channel(16);
    let layer = BroadcastLayer::new(log_tx.clone());
    let ring = Arc::clone(&layer.ring);
    ring.lock()
        .unwrap()
        .push_back(r#"{"message":"relay configured"}"#.to_string());

    // A writer that panicked while holding the lock must not hide the replay.
    let poisoner = Arc::clone(&ring);
    let _ = std::thread::spawn(move || {
        let _guard = poisoner.lock().unwrap();
        panic!("writer died holding the log ring");
    })
    .join();
    assert!(ring.is_poisoned());

    let resp = app_with_logs("http://127.0.0.1:9/unused", "", log_tx.clone(), ring)
        .oneshot(Request::builder().uri("/api/logs").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let mut frames = resp.into_body().into_data_stream();

    let replayed = frames.next().await.unwrap().unwrap();
    assert!(String::from_utf8_lossy(&replayed).contains("relay configured"));

    log_tx.send(r#"{"message":"case analysis complete"}"#.to_string()).unwrap();
    let live = frames.next().await.unwrap().unwrap();
    assert!(String::from_utf8_lossy(&live).contains("case analysis complete"));
}
