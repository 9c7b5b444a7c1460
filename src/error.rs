use thiserror::Error;

/// 评分核心错误
///
/// 纯函数层（`scoring/`）只会产生这几类错误，不涉及网络或配置。
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScoringError {
    /// 模型输出中找不到可解析的 JSON 对象
    #[error("模型输出中没有可解析的 JSON 对象: {}", crate::utils::logging::truncate_text(.raw, 200))]
    MalformedModelOutput {
        /// 原始输出，便于排查
        raw: String,
    },
    /// 评分字段缺失或不是数字
    #[error("评分字段缺失或不是数字: {0}")]
    InvalidScoreField(String),
    /// 调用方提供的指标缺失或不是数字
    #[error("指标缺失或不是数字: {0}")]
    InvalidMetrics(String),
}

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 评分错误
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    /// LLM 服务调用失败
    #[error("LLM API调用失败 (模型: {model}): {message}")]
    Provider { model: String, message: String },
    /// 请求参数错误
    #[error("请求参数错误: {0}")]
    InvalidRequest(String),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建 LLM 调用错误
    pub fn provider(model: impl Into<String>, message: impl std::fmt::Display) -> Self {
        AppError::Provider {
            model: model.into(),
            message: message.to_string(),
        }
    }

    /// 创建请求参数错误
    pub fn invalid_request(message: impl Into<String>) -> Self {
        AppError::InvalidRequest(message.into())
    }

    /// 是否属于调用方的输入问题（而不是模型或服务端问题）
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::InvalidRequest(_) | AppError::Scoring(ScoringError::InvalidMetrics(_))
        )
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(format!("TOML解析失败: {}", err))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(AppError::invalid_request("缺少字段").is_client_error());
        assert!(AppError::from(ScoringError::InvalidMetrics("x".into())).is_client_error());
        assert!(!AppError::from(ScoringError::InvalidScoreField("depth".into())).is_client_error());
        assert!(!AppError::provider("m", "timeout").is_client_error());
    }

    #[test]
    fn test_malformed_output_message_is_truncated() {
        let err = ScoringError::MalformedModelOutput {
            raw: "x".repeat(500),
        };
        let message = err.to_string();
        assert!(message.ends_with("..."));
        assert!(message.chars().count() < 300);
    }
}
