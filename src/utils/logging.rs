//! 日志工具模块
//!
//! 提供日志格式化和输出的辅助函数

use tracing::{info, warn};

use crate::config::Config;
use crate::models::GradingTask;

/// 记录程序启动信息
///
/// # 参数
/// - `config`: 当前生效的配置
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 Rheto 评分服务启动");
    info!(
        "⏰ 启动时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🌐 监听地址: {}:{}", config.host, config.port);
    info!("🤖 主模型: {}", config.llm_model_name);
    match &config.llm_fallback_model_name {
        Some(fallback) => info!("🔁 备用模型: {}", fallback),
        None => info!("🔁 未配置备用模型"),
    }
    info!(
        "📝 评分任务: {}",
        GradingTask::names().collect::<Vec<_>>().join(", ")
    );
    info!(
        "📚 话题历史容量: {} (最多 {} 个会话)",
        config.topic_history_capacity, config.max_topic_sessions
    );
    if config.llm_api_key.is_empty() {
        warn!("⚠️ 未设置 LLM_API_KEY / HF_TOKEN，模型调用将会失败");
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（按字符计）
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
