use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use rheto_scoring::{create_router, AppError, AppResult, AppState, Config, TextGenerator};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// 按模型返回预设回复；未配置的模型返回失败
struct MockGenerator {
    replies: Vec<(&'static str, &'static str)>,
    calls: Mutex<Vec<String>>,
}

impl MockGenerator {
    fn new(replies: &[(&'static str, &'static str)]) -> Arc<Self> {
        Arc::new(Self {
            replies: replies.to_vec(),
            calls: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate_text(&self, _: &str, _: &str, model_id: &str) -> AppResult<String> {
        self.calls.lock().unwrap().push(model_id.to_string());
        self.replies
            .iter()
            .find(|(model, _)| *model == model_id)
            .map(|(_, reply)| reply.to_string())
            .ok_or_else(|| AppError::provider(model_id, "upstream unavailable"))
    }
}

fn test_config() -> Config {
    Config {
        llm_model_name: "primary".to_string(),
        llm_fallback_model_name: Some("fallback".to_string()),
        ..Config::default()
    }
}

fn app(generator: Arc<MockGenerator>) -> Router {
    create_router(Arc::new(AppState::with_generator(&test_config(), generator)))
}

async fn post(router: Router, path: &str, body: Value) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(path)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// 发送任意请求体，可选 Content-Type
async fn post_raw(
    router: Router,
    path: &str,
    content_type: Option<&str>,
    body: &'static str,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method("POST").uri(path);
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }
    let response = router
        .oneshot(builder.body(Body::from(body)).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health_check() {
    let response = app(MockGenerator::new(&[]))
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(serde_json::from_slice::<Value>(&bytes).unwrap(), json!({"status": "ok"}));
}

#[tokio::test]
async fn test_score_justification_clamps_and_totals() {
    let generator = MockGenerator::new(&[(
        "primary",
        "Here is my grading:\n{\"clarity\": 5, \"depth\": 2.4, \"logical_structure\": 3, \"comment\": \"ok\"}",
    )]);
    let (status, body) = post(
        app(generator),
        "/score-justification",
        json!({"question": "Is the sky blue?", "userAnswer": "Yes, because of Rayleigh scattering."}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"clarity": 3, "depth": 2, "logical_structure": 3, "total": 0.8})
    );
}

#[tokio::test]
async fn test_score_justification_missing_answer_is_bad_request() {
    let generator = MockGenerator::new(&[("primary", "{}")]);
    let (status, body) = post(
        app(generator.clone()),
        "/score-justification",
        json!({"question": "Is the sky blue?"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Missing question or userAnswer"));
    assert!(generator.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_score_creativity_uses_fallback_model() {
    let generator = MockGenerator::new(&[(
        "fallback",
        r#"{"fluency": 8, "flexibility": 6, "originality": 7, "refinement_gain": 0}"#,
    )]);
    let (status, body) = post(
        app(generator.clone()),
        "/score-creativity",
        json!({"ideas": ["doorstop", "bookend", "garden border"]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    // 0.3*8 + 0.25*6 + 0.25*7 + 0.2*0 = 5.65 -> 6
    assert_eq!(body["total"], json!(6));
    assert_eq!(*generator.calls.lock().unwrap(), vec!["primary", "fallback"]);
}

#[tokio::test]
async fn test_score_creativity_invalid_ideas() {
    let (status, body) = post(
        app(MockGenerator::new(&[])),
        "/score-creativity",
        json!({"ideas": "doorstop"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Missing or invalid ideas array"));
}

#[tokio::test]
async fn test_provider_failure_is_server_error() {
    let (status, body) = post(
        app(MockGenerator::new(&[])),
        "/score-story",
        json!({"story": "Once upon a time."}),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("fallback"));
}

#[tokio::test]
async fn test_malformed_model_output_is_server_error() {
    let generator = MockGenerator::new(&[("primary", "I'd rather not grade this.")]);
    let (status, _) = post(
        app(generator),
        "/score-concept-map",
        json!({"centralConcept": "Energy", "nodes": ["Kinetic"]}),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_score_concept_map() {
    let generator = MockGenerator::new(&[(
        "primary",
        r#"{"accuracy": 4, "connections": 2, "hierarchy": 1}"#,
    )]);
    let (status, body) = post(
        app(generator),
        "/score-concept-map",
        json!({
            "centralConcept": "Energy",
            "nodes": ["Kinetic", "Potential"],
            "links": [{"from": "Energy", "to": "Kinetic", "label": "includes"}]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"accuracy": 4, "connections": 2, "hierarchy": 1, "total": 70})
    );
}

#[tokio::test]
async fn test_score_memory() {
    let router = app(MockGenerator::new(&[]));

    let (status, body) = post(
        router.clone(),
        "/score-memory",
        json!({"immediateRecallAccuracy": 80, "retentionCurve": 90, "averageRecallTime": 5}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], json!(100));
    assert_eq!(body["immediateRecallAccuracy"], json!(80));

    let (status, body) = post(
        router.clone(),
        "/score-memory",
        json!({"immediateRecallAccuracy": 0, "retentionCurve": 90, "averageRecallTime": 0}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"immediateRecallAccuracy": 0, "retentionCurve": 0, "averageRecallTime": 10.0, "total": 0})
    );

    let (status, body) = post(
        router,
        "/score-memory",
        json!({"immediateRecallAccuracy": 80, "retentionCurve": null, "averageRecallTime": 5}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("retentionCurve"));
}

#[tokio::test]
async fn test_score_justification_lexical() {
    let (status, body) = post(
        app(MockGenerator::new(&[])),
        "/score-justification-lexical",
        json!({
            "text": "Plants make food from light because chlorophyll absorbs it.",
            "reference": "Plants convert light into chemical energy using chlorophyll."
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let final_score = body["final_score"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&final_score));
    assert!(body["feedback"].as_array().map_or(false, |f| !f.is_empty()));
}

#[tokio::test]
async fn test_generate_topic_per_session() {
    let generator = MockGenerator::new(&[("primary", r#"{"topic": "Should homework be banned?"}"#)]);
    let router = app(generator);

    let (status, body) = post(
        router.clone(),
        "/generate-topic",
        json!({"kind": "justification", "sessionId": "abc"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"topic": "Should homework be banned?", "kind": "justification"})
    );

    let (status, _) = post(router, "/generate-topic", json!({"kind": "haiku"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unreadable_body_is_json_bad_request() {
    let router = app(MockGenerator::new(&[]));

    // 没有 Content-Type 的空请求体
    let (status, body) = post_raw(router.clone(), "/score-memory", None, "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    // 不是合法 JSON
    let (status, body) = post_raw(
        router.clone(),
        "/score-memory",
        Some("application/json"),
        "{not json",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("JSON"));

    let generator = MockGenerator::new(&[("primary", "{}")]);
    let (status, body) = post_raw(
        app(generator.clone()),
        "/score-justification",
        Some("text/plain"),
        "question=hi",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert!(generator.calls.lock().unwrap().is_empty());
}
