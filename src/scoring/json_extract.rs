//! 从模型输出中恢复 JSON 对象
//!
//! 模型经常在 JSON 前后加解释文字，这里先整体解析，失败再取
//! 第一个 `{` 到最后一个 `}` 之间的内容解析。多个并列对象不做区分，
//! 只看最外层的花括号范围。

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;
use tracing::debug;

use crate::error::ScoringError;
use crate::scoring::compile_regex;

/// 贪婪匹配：第一个 `{` 到最后一个 `}`，允许跨行
fn brace_span() -> Option<&'static Regex> {
    static BRACE_SPAN: OnceLock<Option<Regex>> = OnceLock::new();
    BRACE_SPAN
        .get_or_init(|| compile_regex(r"(?s)\{.*\}"))
        .as_ref()
}

/// 从任意文本中提取一个 JSON 对象
///
/// # 错误
/// 两次尝试都失败时返回 `MalformedModelOutput`，其中带有原始文本
pub fn extract_json(raw: &str) -> Result<Map<String, Value>, ScoringError> {
    if let Ok(Value::Object(object)) = serde_json::from_str::<Value>(raw) {
        return Ok(object);
    }

    let candidate = brace_span().and_then(|re| re.find(raw));
    if let Some(span) = candidate {
        debug!("整体解析失败，尝试花括号范围 {}..{}", span.start(), span.end());
        if let Ok(Value::Object(object)) = serde_json::from_str::<Value>(span.as_str()) {
            return Ok(object);
        }
    }

    Err(ScoringError::MalformedModelOutput {
        raw: raw.to_string(),
    })
}
