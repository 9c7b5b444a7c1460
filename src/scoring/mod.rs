//! 评分核心（纯函数，不做任何 IO）
//!
//! 流程：模型原始输出 → `extract_json` → `Rubric::validate` → `CompositeFormula::apply`

pub mod composite;
pub mod json_extract;
pub mod lexical;
pub mod memory;
pub mod rubric;

pub use composite::{CompositeFormula, Weight};
pub use json_extract::extract_json;
pub use lexical::{score_justification as score_lexical, LexicalScore};
pub use memory::{MemoryMetrics, MemoryScore};
pub use rubric::{Rubric, RubricField, ScoreEntry, ScoreRecord};

use regex::Regex;
use tracing::warn;

use crate::error::ScoringError;

/// 编译内置正则，失败时记录日志并返回 `None`
pub(crate) fn compile_regex(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!("内置正则 {} 编译失败: {}", pattern, e);
            None
        }
    }
}

/// 从模型原始输出得到校验后的分数记录
pub fn score(raw_output: &str, rubric: &Rubric) -> Result<ScoreRecord, ScoringError> {
    let object = extract_json(raw_output)?;
    rubric.validate(&object)
}

/// 按公式计算综合分
pub fn compute_composite(record: &ScoreRecord, formula: &CompositeFormula) -> f64 {
    formula.apply(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_end_to_end() {
        let rubric = Rubric::from_pairs(&[("clarity", 3), ("depth", 3), ("logical_structure", 4)]);
        let raw = "Grading result:\n{\"clarity\": 2.6, \"depth\": 5, \"logical_structure\": 4, \"note\": \"ok\"}\nDone.";

        let record = score(raw, &rubric).unwrap();
        assert_eq!(record.get("clarity"), Some(3));
        assert_eq!(record.get("depth"), Some(3));
        assert_eq!(record.get("logical_structure"), Some(4));

        let formula = CompositeFormula::PointsOverCeiling {
            scale: 100.0,
            decimals: 0,
        };
        assert_eq!(compute_composite(&record, &formula), 100.0);
    }

    #[test]
    fn test_compile_regex() {
        assert!(compile_regex(r"(?s)\{.*\}").is_some());
        assert!(compile_regex("(unclosed").is_none());
    }

    #[test]
    fn test_score_propagates_field_error() {
        let rubric = Rubric::from_pairs(&[("fluency", 10)]);
        let err = score(r#"{"fluency": "high"}"#, &rubric).unwrap_err();
        assert_eq!(err, ScoringError::InvalidScoreField("fluency".to_string()));
    }
}
