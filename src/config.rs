use serde::Deserialize;
use std::path::Path;

use crate::error::{AppError, AppResult};

/// 程序配置
///
/// 优先级：环境变量 > `CONFIG_FILE` 指向的 TOML 文件 > 默认值
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 监听地址
    pub host: String,
    /// 监听端口
    pub port: u16,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 主模型失败时重试一次所用的模型
    pub llm_fallback_model_name: Option<String>,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
    // --- 话题轮换 ---
    /// 每个会话记住的最近话题数量
    pub topic_history_capacity: usize,
    /// 同时保留历史的会话数量上限
    pub max_topic_sessions: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            verbose_logging: false,
            llm_api_key: String::new(),
            llm_api_base_url: "https://router.huggingface.co/v1".to_string(),
            llm_model_name: "openai/gpt-oss-20b:cheapest".to_string(),
            llm_fallback_model_name: Some("meta-llama/Llama-3.1-8B-Instruct:cheapest".to_string()),
            llm_temperature: 0.3,
            llm_max_tokens: 1024,
            topic_history_capacity: 10,
            max_topic_sessions: 1000,
        }
    }
}

impl Config {
    /// 加载配置：先读 `CONFIG_FILE`（如果有），再用环境变量覆盖
    pub fn load() -> AppResult<Self> {
        let base = match std::env::var("CONFIG_FILE") {
            Ok(path) => Self::from_toml_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        Ok(base.with_env_overrides())
    }

    /// 只使用环境变量和默认值
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件读取配置，缺省字段使用默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("无法读取配置文件 {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// 从 TOML 字符串解析配置
    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        Ok(toml::from_str(content)?)
    }

    fn with_env_overrides(self) -> Self {
        let api_key = std::env::var("LLM_API_KEY")
            .or_else(|_| std::env::var("HF_TOKEN"))
            .unwrap_or(self.llm_api_key);
        let fallback = match std::env::var("LLM_FALLBACK_MODEL_NAME") {
            Ok(v) if v.trim().is_empty() => None,
            Ok(v) => Some(v),
            Err(_) => self.llm_fallback_model_name,
        };

        Self {
            host: std::env::var("HOST").unwrap_or(self.host),
            port: env_parse("PORT").unwrap_or(self.port),
            verbose_logging: env_parse("VERBOSE_LOGGING").unwrap_or(self.verbose_logging),
            llm_api_key: api_key,
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(self.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(self.llm_model_name),
            llm_fallback_model_name: fallback,
            llm_temperature: env_parse("LLM_TEMPERATURE").unwrap_or(self.llm_temperature),
            llm_max_tokens: env_parse("LLM_MAX_TOKENS").unwrap_or(self.llm_max_tokens),
            topic_history_capacity: env_parse("TOPIC_HISTORY_CAPACITY")
                .unwrap_or(self.topic_history_capacity),
            max_topic_sessions: env_parse("MAX_TOPIC_SESSIONS").unwrap_or(self.max_topic_sessions),
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
