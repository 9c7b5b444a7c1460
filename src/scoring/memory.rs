//! 记忆效率分（不调用模型）
//!
//! `raw = 准确率 * 保持曲线拟合度 / (平均回忆时间 / 10)`，截断到 `[0, 100]` 后取整。
//! 准确率 <= 0 时整个分数为 0。

use serde::Serialize;
use serde_json::Value;

use crate::error::ScoringError;
use crate::scoring::composite::round_to;

/// 回忆时间缺失或非正数时使用的默认值
pub const DEFAULT_RECALL_TIME: f64 = 10.0;

/// 调用方提供的三项指标
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryMetrics {
    pub immediate_recall_accuracy: f64,
    pub retention_curve: f64,
    pub average_recall_time: f64,
}

/// 记忆效率评分结果
///
/// 准确率、保持曲线和总分都是整数，只有回显的回忆时间保留两位小数。
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryScore {
    pub immediate_recall_accuracy: i64,
    pub retention_curve: i64,
    pub average_recall_time: f64,
    pub total: i64,
}

impl MemoryMetrics {
    /// 从请求 JSON 中读取指标，三个字段都必须是数字
    pub fn from_json(body: &Value) -> Result<Self, ScoringError> {
        let field = |name: &str| {
            body.get(name)
                .and_then(Value::as_f64)
                .ok_or_else(|| ScoringError::InvalidMetrics(name.to_string()))
        };

        Ok(Self {
            immediate_recall_accuracy: field("immediateRecallAccuracy")?,
            retention_curve: field("retentionCurve")?,
            average_recall_time: field("averageRecallTime")?,
        })
    }

    /// 计算记忆效率分
    pub fn score(&self) -> MemoryScore {
        if self.immediate_recall_accuracy <= 0.0 {
            return MemoryScore {
                immediate_recall_accuracy: 0,
                retention_curve: 0,
                average_recall_time: safe_recall_time(self.average_recall_time),
                total: 0,
            };
        }

        let safe_time = safe_recall_time(self.average_recall_time);
        let raw = (self.immediate_recall_accuracy * self.retention_curve) / (safe_time / 10.0);
        let normalized = raw.clamp(0.0, 100.0);

        MemoryScore {
            immediate_recall_accuracy: self.immediate_recall_accuracy.round() as i64,
            retention_curve: self.retention_curve.round() as i64,
            average_recall_time: round_to(self.average_recall_time, 2),
            total: normalized.round() as i64,
        }
    }
}

fn safe_recall_time(time: f64) -> f64 {
    if time <= 0.0 {
        DEFAULT_RECALL_TIME
    } else {
        time
    }
}
