//! 评分流程 - 流程层
//!
//! 核心职责：定义"一次模型评分"的完整流程
//!
//! 流程顺序：
//! 1. 按任务定义拼系统消息和用户消息
//! 2. 调用模型（主模型失败时换备用模型重试一次）
//! 3. 提取 JSON → 按细则校验截断 → 计算综合分

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::AppResult;
use crate::models::{GradingRequest, GradingTask};
use crate::scoring::{self, ScoreRecord};
use crate::services::{generate_with_fallback, ModelSelection, TextGenerator};
use crate::utils::truncate_text;

/// 一次评分的结果
#[derive(Debug, Clone, PartialEq)]
pub struct GradeOutcome {
    pub task: &'static str,
    /// 实际给出评分的模型
    pub model: String,
    pub scores: ScoreRecord,
    pub total: f64,
    /// 综合分的小数位数，0 时按整数输出
    pub decimals: u32,
}

/// 序列化为扁平对象：`{字段: 分数, ..., "total": 综合分}`
impl Serialize for GradeOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries = self.scores.entries();
        let mut map = serializer.serialize_map(Some(entries.len() + 1))?;
        for entry in entries {
            map.serialize_entry(&entry.field, &entry.value)?;
        }
        if self.decimals == 0 {
            map.serialize_entry("total", &(self.total as i64))?;
        } else {
            map.serialize_entry("total", &self.total)?;
        }
        map.end()
    }
}

/// 评分流程
///
/// - 不持有任何请求状态
/// - 只依赖文本生成能力（services）和纯评分函数（scoring）
pub struct GradingFlow {
    generator: Arc<dyn TextGenerator>,
    models: ModelSelection,
}

impl GradingFlow {
    pub fn new(generator: Arc<dyn TextGenerator>, models: ModelSelection) -> Self {
        Self { generator, models }
    }

    /// 处理一个评分请求
    pub async fn grade_request<R: GradingRequest>(&self, request: &R) -> AppResult<GradeOutcome> {
        let content = request.content()?;
        self.grade(request.task(), &content).await
    }

    /// 用指定任务对一段内容评分
    pub async fn grade(&self, task: &'static GradingTask, content: &str) -> AppResult<GradeOutcome> {
        let system_prompt = task.system_prompt();
        let user_prompt = build_user_prompt(task, content);

        let (raw, model) =
            generate_with_fallback(self.generator.as_ref(), &system_prompt, &user_prompt, &self.models)
                .await?;
        debug!("[{}] 模型 {} 原始输出: {}", task.name, model, truncate_text(&raw, 300));

        let formula = task.formula();
        let scores = scoring::score(&raw, &task.rubric())?;
        let total = scoring::compute_composite(&scores, &formula);

        info!("[{}] ✓ 评分完成，总分 {} (模型: {})", task.name, total, model);

        Ok(GradeOutcome {
            task: task.name,
            model,
            scores,
            total,
            decimals: formula.decimals(),
        })
    }
}

/// 用户消息：待评内容 + 评分细则 + 回复格式
pub fn build_user_prompt(task: &GradingTask, content: &str) -> String {
    let max_points = task.rubric().max_points();

    let rubric_lines: Vec<String> = task
        .fields
        .iter()
        .map(|f| format!("{} (0–{}): {}", display_name(f.name), f.max, f.description))
        .collect();
    let format_lines: Vec<String> = task
        .fields
        .iter()
        .map(|f| format!("  \"{}\": <number 0-{}>", f.name, f.max))
        .collect();

    format!(
        "{}\n\nEvaluation rubric (0–{}):\n{}\n\nReply ONLY with JSON in this format:\n{{\n{}\n}}",
        content,
        max_points,
        rubric_lines.join("\n"),
        format_lines.join(",\n")
    )
}

/// `logical_structure` -> `Logical structure`
fn display_name(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, ScoringError};
    use crate::models::task::{CREATIVITY, JUSTIFICATION};
    use crate::models::JustificationRequest;
    use async_trait::async_trait;

    /// 固定返回一段文本
    struct CannedGenerator(&'static str);

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn generate_text(&self, _: &str, _: &str, _: &str) -> AppResult<String> {
            Ok(self.0.to_string())
        }
    }

    fn flow(reply: &'static str) -> GradingFlow {
        GradingFlow::new(
            Arc::new(CannedGenerator(reply)),
            ModelSelection {
                primary: "primary".to_string(),
                fallback: None,
            },
        )
    }

    #[test]
    fn test_user_prompt_contains_rubric_and_format() {
        let prompt = build_user_prompt(&JUSTIFICATION, "Question: q\nUser answer: a");
        assert!(prompt.starts_with("Question: q"));
        assert!(prompt.contains("Evaluation rubric (0–10):"));
        assert!(prompt.contains("Logical structure (0–4): Are premises"));
        assert!(prompt.contains("\"logical_structure\": <number 0-4>"));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("refinement_gain"), "Refinement gain");
        assert_eq!(display_name(""), "");
    }

    #[tokio::test]
    async fn test_grade_justification() {
        let flow = flow("Scores: {\"clarity\": 3, \"depth\": 2, \"logical_structure\": 9}");
        let outcome = flow.grade(&JUSTIFICATION, "content").await.unwrap();

        assert_eq!(outcome.scores.get("logical_structure"), Some(4));
        // (3 + 2 + 4) / 10
        assert_eq!(outcome.total, 0.9);
        assert_eq!(outcome.model, "primary");
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            serde_json::json!({"clarity": 3, "depth": 2, "logical_structure": 4, "total": 0.9})
        );
    }

    #[tokio::test]
    async fn test_grade_creativity_weighted() {
        let flow = flow(r#"{"fluency": 10, "flexibility": 10, "originality": 10, "refinement_gain": 10}"#);
        let outcome = flow.grade(&CREATIVITY, "ideas").await.unwrap();
        assert_eq!(outcome.total, 10.0);

        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["total"], serde_json::json!(10));
        assert!(value["total"].is_i64());
    }

    #[tokio::test]
    async fn test_grade_malformed_output() {
        let flow = flow("Sorry, I can't help with that.");
        let err = flow.grade(&JUSTIFICATION, "content").await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Scoring(ScoringError::MalformedModelOutput { .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_request_never_calls_model() {
        let flow = flow("{}");
        let request = JustificationRequest {
            question: None,
            user_answer: Some("x".to_string()),
        };
        let err = flow.grade_request(&request).await.unwrap_err();
        assert!(err.is_client_error());
    }
}
