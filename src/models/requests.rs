//! 请求/响应数据结构
//!
//! 请求体先按 `serde_json::Value` 接收，再由 `parse_body` 转换，
//! 这样字段缺失或类型不对时可以返回统一的 400 错误信息。

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::models::task::{GradingTask, CONCEPT_MAP, CREATIVITY, JUSTIFICATION, STORY};

/// 把请求 JSON 转成具体的请求类型，失败时使用给定的错误信息
pub fn parse_body<T: DeserializeOwned>(body: Value, message: &str) -> AppResult<T> {
    serde_json::from_value(body).map_err(|_| AppError::invalid_request(message))
}

/// 需要模型打分的请求
pub trait GradingRequest: DeserializeOwned {
    /// 请求格式不对时的错误信息
    const INVALID_MESSAGE: &'static str;

    /// 对应的评分任务
    fn task(&self) -> &'static GradingTask;

    /// 校验内容，并生成用户消息中"待评内容"部分
    fn content(&self) -> AppResult<String>;
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// 论证题评分请求
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JustificationRequest {
    pub question: Option<String>,
    pub user_answer: Option<String>,
}

impl GradingRequest for JustificationRequest {
    const INVALID_MESSAGE: &'static str = "Missing question or userAnswer";

    fn task(&self) -> &'static GradingTask {
        &JUSTIFICATION
    }

    fn content(&self) -> AppResult<String> {
        match (non_empty(&self.question), non_empty(&self.user_answer)) {
            (Some(question), Some(answer)) => {
                Ok(format!("Question: {}\nUser answer: {}", question, answer))
            }
            _ => Err(AppError::invalid_request(Self::INVALID_MESSAGE)),
        }
    }
}

/// 发散思维（砖头的用途）评分请求
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreativityRequest {
    pub ideas: Vec<String>,
    pub refined_idea: Option<String>,
}

impl GradingRequest for CreativityRequest {
    const INVALID_MESSAGE: &'static str = "Missing or invalid ideas array";

    fn task(&self) -> &'static GradingTask {
        &CREATIVITY
    }

    fn content(&self) -> AppResult<String> {
        let ideas: Vec<String> = self
            .ideas
            .iter()
            .enumerate()
            .map(|(i, idea)| format!("{}. {}", i + 1, idea.trim()))
            .collect();

        let mut content = format!(
            "User's creative ideas for uses of a brick:\n{}",
            ideas.join("\n")
        );
        if let Some(refined) = non_empty(&self.refined_idea) {
            content.push_str(&format!("\n\nRefined idea: {}", refined));
        }
        Ok(content)
    }
}

/// 短篇故事评分请求
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryRequest {
    pub story: Option<String>,
    pub prompt: Option<String>,
}

impl GradingRequest for StoryRequest {
    const INVALID_MESSAGE: &'static str = "Missing story";

    fn task(&self) -> &'static GradingTask {
        &STORY
    }

    fn content(&self) -> AppResult<String> {
        let story =
            non_empty(&self.story).ok_or_else(|| AppError::invalid_request(Self::INVALID_MESSAGE))?;
        Ok(match non_empty(&self.prompt) {
            Some(prompt) => format!("Story prompt: {}\n\nUser's story:\n{}", prompt, story),
            None => format!("User's story:\n{}", story),
        })
    }
}

/// 概念图中的一条连线
#[derive(Debug, Clone, Deserialize)]
pub struct ConceptLink {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
}

/// 概念图评分请求
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptMapRequest {
    pub central_concept: String,
    pub nodes: Vec<String>,
    #[serde(default)]
    pub links: Vec<ConceptLink>,
}

impl GradingRequest for ConceptMapRequest {
    const INVALID_MESSAGE: &'static str = "Missing centralConcept or nodes";

    fn task(&self) -> &'static GradingTask {
        &CONCEPT_MAP
    }

    fn content(&self) -> AppResult<String> {
        if self.central_concept.trim().is_empty() || self.nodes.is_empty() {
            return Err(AppError::invalid_request(Self::INVALID_MESSAGE));
        }

        let links: Vec<String> = self
            .links
            .iter()
            .map(|link| match link.label.as_deref().map(str::trim) {
                Some(label) if !label.is_empty() => {
                    format!("- {} --[{}]--> {}", link.from, label, link.to)
                }
                _ => format!("- {} --> {}", link.from, link.to),
            })
            .collect();

        Ok(format!(
            "Central concept: {}\nNodes: {}\nLinks:\n{}",
            self.central_concept.trim(),
            self.nodes.join(", "),
            if links.is_empty() {
                "(none)".to_string()
            } else {
                links.join("\n")
            }
        ))
    }
}

/// 词汇层面论证评分请求（不调用模型）
#[derive(Debug, Clone, Deserialize)]
pub struct LexicalRequest {
    pub text: String,
    pub reference: String,
}

/// 话题生成请求
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicRequest {
    pub kind: String,
    pub session_id: Option<String>,
}

/// 话题生成结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicResponse {
    pub topic: String,
    pub kind: String,
}

/// 健康检查
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// 错误响应
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
