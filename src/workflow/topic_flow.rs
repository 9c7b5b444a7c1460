//! 话题生成流程 - 流程层
//!
//! 让模型生成一个练习话题，并尽量避开该会话最近出现过的话题。
//! 历史记录只在读写时加锁，不会在等待模型时持有锁。

use phf::phf_map;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult, ScoringError};
use crate::models::TopicResponse;
use crate::scoring::extract_json;
use crate::services::{generate_with_fallback, ModelSelection, SessionHistories, TextGenerator};

/// 未提供会话 ID 时使用的会话
pub const DEFAULT_SESSION: &str = "anonymous";

/// 话题类型 -> 提示词里的描述
static TOPIC_KINDS: phf::Map<&'static str, &'static str> = phf_map! {
    "justification" => "thought-provoking question that asks the user to choose a position and justify it",
    "creativity" => "common everyday object for an alternative-uses brainstorming task",
    "story" => "one-sentence short story prompt",
    "concept_map" => "central concept from school science or humanities suitable for a concept map",
};

const TOPIC_SYSTEM_PROMPT: &str = "You generate practice topics. Respond ONLY with valid JSON. No explanations, no extra text. JSON format: {\"topic\": \"<text>\"}";

/// 话题生成流程
pub struct TopicFlow {
    generator: Arc<dyn TextGenerator>,
    models: ModelSelection,
    histories: Mutex<SessionHistories>,
}

impl TopicFlow {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        models: ModelSelection,
        histories: SessionHistories,
    ) -> Self {
        Self {
            generator,
            models,
            histories: Mutex::new(histories),
        }
    }

    /// 为某个会话生成下一个话题
    pub async fn next_topic(&self, session_id: Option<&str>, kind: &str) -> AppResult<TopicResponse> {
        let description = TOPIC_KINDS
            .get(kind)
            .ok_or_else(|| AppError::invalid_request(format!("Unknown topic kind: {}", kind)))?;
        let session_id = session_id
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SESSION);

        let recent = self.recent_topics(session_id).await;
        let user_prompt = build_topic_prompt(description, &recent);

        let (raw, model) = generate_with_fallback(
            self.generator.as_ref(),
            TOPIC_SYSTEM_PROMPT,
            &user_prompt,
            &self.models,
        )
        .await?;

        let object = extract_json(&raw)?;
        let topic = object
            .get("topic")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ScoringError::InvalidScoreField("topic".to_string()))?
            .to_string();

        {
            let mut histories = self.histories.lock().await;
            let history = histories.session(session_id);
            if history.contains(&topic) {
                warn!("[{}] ⚠️ 模型 {} 返回了最近出现过的话题: {}", session_id, model, topic);
            }
            history.push(topic.clone());
            debug!("保存话题历史的会话数: {}", histories.session_count());
        }

        info!("[{}] ✓ 生成 {} 话题: {}", session_id, kind, topic);

        Ok(TopicResponse {
            topic,
            kind: kind.to_string(),
        })
    }

    /// 某个会话的最近话题（从旧到新）
    pub async fn recent_topics(&self, session_id: &str) -> Vec<String> {
        self.histories.lock().await.snapshot(session_id)
    }
}

fn build_topic_prompt(description: &str, recent: &[String]) -> String {
    let mut prompt = format!("Generate one {}.", description);
    if !recent.is_empty() {
        prompt.push_str("\n\nDo NOT repeat any of these recent topics:\n");
        for topic in recent {
            prompt.push_str(&format!("- {}\n", topic));
        }
    }
    prompt
}
