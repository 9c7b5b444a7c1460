//! HTTP 接口层
//!
//! 只负责请求解析、调用流程层、把结果或错误转成 JSON 响应

pub mod handlers;

use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::models::requests::ErrorResponse;
use crate::services::{LlmService, ModelSelection, SessionHistories, TextGenerator};
use crate::workflow::{GradingFlow, TopicFlow};

/// JSON 请求体
///
/// 缺少 Content-Type 或内容不是合法 JSON 时，同样返回 400 和 `{"error": ...}`
#[derive(FromRequest, serde::Deserialize)]
#[from_request(via(Json), rejection(AppError))]
pub struct JsonBody(pub Value);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::invalid_request(format!("请求体不是有效的 JSON: {}", rejection.body_text()))
    }
}

/// 路由共享状态
pub struct AppState {
    pub grading: GradingFlow,
    pub topics: TopicFlow,
}

impl AppState {
    /// 使用真实 LLM 服务
    pub fn from_config(config: &Config) -> Self {
        Self::with_generator(config, Arc::new(LlmService::new(config)))
    }

    /// 使用指定的文本生成实现（测试时注入）
    pub fn with_generator(config: &Config, generator: Arc<dyn TextGenerator>) -> Self {
        let models = ModelSelection::from_config(config);
        Self {
            grading: GradingFlow::new(generator.clone(), models.clone()),
            topics: TopicFlow::new(
                generator,
                models,
                SessionHistories::new(config.topic_history_capacity, config.max_topic_sessions),
            ),
        }
    }
}

/// 创建路由
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/score-justification", post(handlers::score_justification))
        .route("/score-creativity", post(handlers::score_creativity))
        .route("/score-story", post(handlers::score_story))
        .route("/score-concept-map", post(handlers::score_concept_map))
        .route("/score-memory", post(handlers::score_memory))
        .route(
            "/score-justification-lexical",
            post(handlers::score_justification_lexical),
        )
        .route("/generate-topic", post(handlers::generate_topic))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            warn!("请求被拒绝: {}", self);
            StatusCode::BAD_REQUEST
        } else {
            error!("请求处理失败: {}", self);
            StatusCode::INTERNAL_SERVER_ERROR
        };

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
