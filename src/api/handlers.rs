//! 路由处理函数

use axum::{extract::State, Json};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::api::{AppState, JsonBody};
use crate::error::AppResult;
use crate::models::requests::HealthResponse;
use crate::models::{
    parse_body, ConceptMapRequest, CreativityRequest, GradingRequest, JustificationRequest,
    LexicalRequest, StoryRequest, TopicRequest, TopicResponse,
};
use crate::scoring::{self, LexicalScore, MemoryMetrics, MemoryScore};
use crate::workflow::GradeOutcome;

type Shared = State<Arc<AppState>>;

/// 健康检查
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// 所有模型评分入口共用
async fn grade<R: GradingRequest>(state: &AppState, body: Value) -> AppResult<Json<GradeOutcome>> {
    let request: R = parse_body(body, R::INVALID_MESSAGE)?;
    let outcome = state.grading.grade_request(&request).await?;
    Ok(Json(outcome))
}

pub async fn score_justification(
    State(state): Shared,
    JsonBody(body): JsonBody,
) -> AppResult<Json<GradeOutcome>> {
    grade::<JustificationRequest>(&state, body).await
}

pub async fn score_creativity(
    State(state): Shared,
    JsonBody(body): JsonBody,
) -> AppResult<Json<GradeOutcome>> {
    grade::<CreativityRequest>(&state, body).await
}

pub async fn score_story(
    State(state): Shared,
    JsonBody(body): JsonBody,
) -> AppResult<Json<GradeOutcome>> {
    grade::<StoryRequest>(&state, body).await
}

pub async fn score_concept_map(
    State(state): Shared,
    JsonBody(body): JsonBody,
) -> AppResult<Json<GradeOutcome>> {
    grade::<ConceptMapRequest>(&state, body).await
}

/// 记忆效率分（不调用模型）
pub async fn score_memory(JsonBody(body): JsonBody) -> AppResult<Json<MemoryScore>> {
    let metrics = MemoryMetrics::from_json(&body)?;
    debug!("记忆评分请求: {:?}", metrics);

    let score = metrics.score();
    debug!("记忆评分结果: {:?}", score);
    Ok(Json(score))
}

/// 词汇层面论证评分（不调用模型）
pub async fn score_justification_lexical(JsonBody(body): JsonBody) -> AppResult<Json<LexicalScore>> {
    let request: LexicalRequest = parse_body(body, "Missing text or reference")?;
    Ok(Json(scoring::score_lexical(&request.text, &request.reference)))
}

/// 生成练习话题
pub async fn generate_topic(
    State(state): Shared,
    JsonBody(body): JsonBody,
) -> AppResult<Json<TopicResponse>> {
    let request: TopicRequest = parse_body(body, "Missing topic kind")?;
    let topic = state
        .topics
        .next_topic(request.session_id.as_deref(), &request.kind)
        .await?;
    Ok(Json(topic))
}
