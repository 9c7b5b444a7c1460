//! LLM 服务 - 业务能力层
//!
//! 只负责"生成文本"能力，不关心评分流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 兼容 OpenAI API 的服务（如 HuggingFace Router 等）
//! - 主模型失败时只用备用模型重试一次，不做退避

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// 文本生成能力
///
/// 评分流程只依赖这个 trait，测试中可以替换成脚本化的实现。
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// 用指定模型生成一段文本
    async fn generate_text(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        model_id: &str,
    ) -> AppResult<String>;
}

/// 主模型 + 可选备用模型
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelection {
    pub primary: String,
    pub fallback: Option<String>,
}

impl ModelSelection {
    pub fn from_config(config: &Config) -> Self {
        Self {
            primary: config.llm_model_name.clone(),
            fallback: config.llm_fallback_model_name.clone(),
        }
    }
}

/// 生成文本：主模型失败时用备用模型重试一次
///
/// # 返回
/// 返回 (生成的文本, 实际使用的模型)
pub async fn generate_with_fallback(
    generator: &dyn TextGenerator,
    system_prompt: &str,
    user_prompt: &str,
    models: &ModelSelection,
) -> AppResult<(String, String)> {
    let primary_err = match generator
        .generate_text(system_prompt, user_prompt, &models.primary)
        .await
    {
        Ok(text) => return Ok((text, models.primary.clone())),
        Err(e) => e,
    };

    match models.fallback.as_deref() {
        Some(fallback) if fallback != models.primary => {
            warn!(
                "主模型 {} 调用失败: {}，改用备用模型 {}",
                models.primary, primary_err, fallback
            );
            let text = generator
                .generate_text(system_prompt, user_prompt, fallback)
                .await?;
            Ok((text, fallback.to_string()))
        }
        _ => Err(primary_err),
    }
}

/// LLM 服务
///
/// 职责：
/// - 调用兼容 OpenAI 的 chat completion 接口
/// - 只返回去掉首尾空白的文本内容
pub struct LlmService {
    client: Client<OpenAIConfig>,
    temperature: f32,
    max_tokens: u32,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
        }
    }
}

#[async_trait]
impl TextGenerator for LlmService {
    async fn generate_text(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        model_id: &str,
    ) -> AppResult<String> {
        debug!("调用 LLM API，模型: {}", model_id);
        debug!("用户消息长度: {} 字符", user_prompt.len());

        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(system_prompt)
            .build()
            .map_err(|e| AppError::provider(model_id, e))?;
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_prompt)
            .build()
            .map_err(|e| AppError::provider(model_id, e))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(model_id)
            .messages(vec![
                ChatCompletionRequestMessage::System(system_msg),
                ChatCompletionRequestMessage::User(user_msg),
            ])
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(|e| AppError::provider(model_id, e))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败 (模型: {}): {}", model_id, e);
            AppError::provider(model_id, e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| AppError::provider(model_id, "LLM 返回内容为空"))?;

        Ok(content.trim().to_string())
    }
}
