//! 评分细则与分数校验
//!
//! 模型返回的每个字段都要是数字，四舍五入后截断到 `[0, max]`。
//! 越界的值不会被拒绝，只会被拉回到最近的边界。

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use crate::error::ScoringError;

/// 评分细则中的一个字段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RubricField {
    pub name: String,
    pub max: u32,
}

/// 评分细则：有序的字段列表，每个字段有自己的上限
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rubric {
    fields: Vec<RubricField>,
}

impl Rubric {
    pub fn new(fields: Vec<RubricField>) -> Self {
        Self { fields }
    }

    /// 从静态定义构建，例如 `&[("clarity", 3), ("depth", 3)]`
    pub fn from_pairs(pairs: &[(&str, u32)]) -> Self {
        Self::new(
            pairs
                .iter()
                .map(|(name, max)| RubricField {
                    name: (*name).to_string(),
                    max: *max,
                })
                .collect(),
        )
    }

    /// 满分（所有字段上限之和）
    pub fn max_points(&self) -> u32 {
        self.fields.iter().map(|f| f.max).sum()
    }

    /// 按细则校验解析后的对象，得到截断后的分数记录
    ///
    /// # 错误
    /// 任一细则字段缺失或不是数字时返回 `InvalidScoreField(字段名)`
    pub fn validate(&self, object: &Map<String, Value>) -> Result<ScoreRecord, ScoringError> {
        let mut entries = Vec::with_capacity(self.fields.len());

        for field in &self.fields {
            let raw = object
                .get(&field.name)
                .and_then(Value::as_f64)
                .ok_or_else(|| ScoringError::InvalidScoreField(field.name.clone()))?;

            entries.push(ScoreEntry {
                field: field.name.clone(),
                value: clamp_score(raw, field.max),
                max: field.max,
            });
        }

        Ok(ScoreRecord { entries })
    }
}

/// 四舍五入（远离零）后截断到 `[0, max]`
pub fn clamp_score(raw: f64, max: u32) -> u32 {
    let rounded = raw.round();
    if rounded <= 0.0 {
        0
    } else if rounded >= f64::from(max) {
        max
    } else {
        rounded as u32
    }
}

/// 单个字段的最终分数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreEntry {
    pub field: String,
    pub value: u32,
    pub max: u32,
}

/// 校验后的分数记录，保持细则中的字段顺序
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRecord {
    entries: Vec<ScoreEntry>,
}

impl ScoreRecord {
    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    pub fn get(&self, field: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.value)
    }

    /// 得分之和
    pub fn total_points(&self) -> u32 {
        self.entries.iter().map(|e| e.value).sum()
    }

    /// 满分之和
    pub fn max_points(&self) -> u32 {
        self.entries.iter().map(|e| e.max).sum()
    }

}

impl Serialize for ScoreRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.field, &entry.value)?;
        }
        map.end()
    }
}
