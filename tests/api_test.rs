//! REST API tests, router driven in-process

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tower::ServiceExt;

use ruster_graph::api::{create_router, AppState};
use ruster_graph::providers::RuleBasedInsight;
use ruster_graph::utils::TransactionCache;
use ruster_graph::{AnalysisConfig, StaticProvider, TransactionRecord};

fn provider() -> StaticProvider {
    StaticProvider::default()
        .with(
            "WalletA",
            vec![TransactionRecord::new("5xSig1", "WalletA", 1_700_000_000).to("WalletB")],
        )
        .with(
            "WalletC",
            vec![TransactionRecord::new("5xSig2", "WalletC", 1_700_000_100).to("Exchange")],
        )
}

fn state() -> AppState {
    AppState::new(
        Arc::new(provider()),
        TransactionCache::new(),
        Arc::new(RuleBasedInsight),
        AnalysisConfig::default(),
    )
}

fn app() -> (Router, Arc<AppState>) {
    let state = Arc::new(state());
    (create_router(state.clone()), state)
}

fn locked_app() -> Router {
    let keys: HashSet<String> = ["team-key".to_string()].into_iter().collect();
    create_router(Arc::new(state().with_api_keys(keys)))
}

fn get(uri: &str, client: &str, key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri).header("X-Forwarded-For", client);
    if let Some(key) = key {
        builder = builder.header("X-API-Key", key);
    }
    builder.body(Body::empty()).unwrap()
}

fn post(uri: &str, client: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("X-Forwarded-For", client)
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app();
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "healthy");
}

#[tokio::test]
async fn test_analyze_direct_transfer() {
    let (app, state) = app();
    let response = app
        .oneshot(post(
            "/v1/analyze",
            "10.0.0.1",
            json!({"addresses": ["WalletA", "WalletB"], "with_insight": true}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let data = &body["data"];
    assert!(!data["analysis_id"].as_str().unwrap().is_empty());
    assert_eq!(data["summary"]["confidenceScore"], 40);
    assert_eq!(data["summary"]["pairs"][0]["type"], "DIRECT");
    assert_eq!(data["graph"]["nodes"][0]["group"], "INPUT");
    assert_eq!(data["graph"]["links"][0]["weight"], 5.0);
    assert!(data["insight"].as_str().unwrap().contains("40/100"));

    assert_eq!(state.telemetry.get_stats().total_analyses, 1);
}

#[tokio::test]
async fn test_analyze_without_insight_omits_field() {
    let (app, _) = app();
    let response = app
        .oneshot(post(
            "/v1/analyze",
            "10.0.0.2",
            json!({"addresses": ["WalletA", "WalletC"], "time_window_seconds": 10}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["data"].get("insight").is_none());
    assert_eq!(body["data"]["summary"]["confidenceScore"], 0);
}

#[tokio::test]
async fn test_analyze_rejects_bad_address_count() {
    let (app, _) = app();
    let response = app
        .oneshot(post(
            "/v1/analyze",
            "10.0.0.3",
            json!({"addresses": ["WalletA", "WalletA"]}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_analyze_no_data() {
    let (app, state) = app();
    let response = app
        .oneshot(post(
            "/v1/analyze",
            "10.0.0.4",
            json!({"addresses": ["Unknown1", "Unknown2"]}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "ANALYSIS_NO_DATA");
    assert_eq!(state.telemetry.get_stats().failed_analyses, 1);
}

#[tokio::test]
async fn test_analyze_offline() {
    let (app, _) = app();
    let response = app
        .oneshot(post(
            "/v1/analyze/offline",
            "10.0.0.5",
            json!({
                "entities": [
                    {"address": "A", "transactions": [{"signature": "s1", "blockTime": 100, "sender": "A", "recipients": ["X"]}]},
                    {"address": "B", "transactions": [{"signature": "s2", "blockTime": 130, "sender": "B", "recipients": ["X"]}]}
                ],
                "config": {"time_window_seconds": 60}
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let pair = &body["data"]["summary"]["pairs"][0];
    assert_eq!(pair["type"], "TIME_PROXIMATE");
    assert_eq!(pair["score"], 30);
    assert_eq!(body["data"]["summary"]["uniqueCounterpartyCount"], 1);
}

#[tokio::test]
async fn test_export_csv() {
    let (app, _) = app();
    let response = app
        .oneshot(post(
            "/v1/export/csv",
            "10.0.0.6",
            json!({"pairs": [{"entityA": "A", "entityB": "B", "reason": "say \"hi\"", "score": 50, "type": "DIRECT"}]}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert_eq!(
        text,
        "EntityA,EntityB,Type,Reason,Score\n\"A\",\"B\",\"DIRECT\",\"say \"\"hi\"\"\",\"50\"\n"
    );
}

#[tokio::test]
async fn test_invalid_api_key_rejected() {
    let (app, _) = app();
    let request = Request::builder()
        .uri("/v1/stats")
        .header("X-API-Key", "not-a-key")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_stats() {
    let (app, _) = app();
    let request = Request::builder()
        .uri("/v1/stats")
        .header("X-Forwarded-For", "10.0.0.7")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("X-RateLimit-Remaining"));
    let body = body_json(response).await;
    assert_eq!(body["data"]["total_analyses"], 0);
}

#[tokio::test]
async fn test_allow_list_requires_key() {
    let response = locked_app()
        .oneshot(get("/v1/stats", "10.0.0.8", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = locked_app()
        .oneshot(get("/v1/stats", "10.0.0.9", Some("sk_live_123")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = locked_app()
        .oneshot(get("/v1/stats", "10.0.0.10", Some("team-key")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_allow_list_keeps_health_open() {
    let response = locked_app()
        .oneshot(get("/health", "10.0.0.11", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
