//! 评分任务注册表
//!
//! 每个评分入口对应一个静态任务：角色说明、评分细则和综合分公式。
//! 路由层只负责拼题目内容，其余全部由这里的定义驱动。

use phf::phf_map;

use crate::scoring::{CompositeFormula, Rubric};

/// 细则字段的静态定义
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub max: u32,
    /// 写进提示词的评分说明
    pub description: &'static str,
}

/// 综合分公式的静态定义
#[derive(Debug, Clone, Copy)]
pub enum FormulaSpec {
    WeightedSum {
        weights: &'static [(&'static str, f64)],
        decimals: u32,
    },
    PointsOverCeiling {
        scale: f64,
        decimals: u32,
    },
}

/// 评分任务
#[derive(Debug, Clone, Copy)]
pub struct GradingTask {
    pub name: &'static str,
    /// 系统消息开头的角色说明
    pub role: &'static str,
    pub fields: &'static [FieldSpec],
    pub formula: FormulaSpec,
}

pub const JUSTIFICATION: GradingTask = GradingTask {
    name: "justification",
    role: "You are an AI grader.",
    fields: &[
        FieldSpec {
            name: "clarity",
            max: 3,
            description: "Is reasoning stated in clear, concise language?",
        },
        FieldSpec {
            name: "depth",
            max: 3,
            description: "Does reasoning show understanding beyond surface intuition?",
        },
        FieldSpec {
            name: "logical_structure",
            max: 4,
            description: "Are premises and conclusion linked logically?",
        },
    ],
    formula: FormulaSpec::PointsOverCeiling {
        scale: 1.0,
        decimals: 2,
    },
};

pub const CREATIVITY: GradingTask = GradingTask {
    name: "creativity",
    role: "You are a creativity evaluator.",
    fields: &[
        FieldSpec {
            name: "fluency",
            max: 10,
            description: "Number and diversity of ideas (count of valid unique ideas)",
        },
        FieldSpec {
            name: "flexibility",
            max: 10,
            description: "Range of conceptual categories covered",
        },
        FieldSpec {
            name: "originality",
            max: 10,
            description: "Rarity and uniqueness of ideas",
        },
        FieldSpec {
            name: "refinement_gain",
            max: 10,
            description: "Quality improvement if refined idea provided, else 0",
        },
    ],
    formula: FormulaSpec::WeightedSum {
        weights: &[
            ("fluency", 0.3),
            ("flexibility", 0.25),
            ("originality", 0.25),
            ("refinement_gain", 0.2),
        ],
        decimals: 0,
    },
};

pub const STORY: GradingTask = GradingTask {
    name: "story",
    role: "You are a creative writing evaluator.",
    fields: &[
        FieldSpec {
            name: "originality",
            max: 10,
            description: "How fresh and surprising are the premise and details?",
        },
        FieldSpec {
            name: "coherence",
            max: 10,
            description: "Do events follow from one another and stay consistent?",
        },
        FieldSpec {
            name: "vividness",
            max: 10,
            description: "Does the language create concrete images and voice?",
        },
        FieldSpec {
            name: "structure",
            max: 10,
            description: "Is there a clear beginning, development and ending?",
        },
    ],
    formula: FormulaSpec::PointsOverCeiling {
        scale: 100.0,
        decimals: 0,
    },
};

pub const CONCEPT_MAP: GradingTask = GradingTask {
    name: "concept_map",
    role: "You are a concept map evaluator.",
    fields: &[
        FieldSpec {
            name: "accuracy",
            max: 4,
            description: "Are the stated relationships factually correct?",
        },
        FieldSpec {
            name: "connections",
            max: 3,
            description: "Are meaningful cross-links drawn between related concepts?",
        },
        FieldSpec {
            name: "hierarchy",
            max: 3,
            description: "Do general concepts sit above more specific ones?",
        },
    ],
    formula: FormulaSpec::PointsOverCeiling {
        scale: 100.0,
        decimals: 0,
    },
};

static GRADING_TASKS: phf::Map<&'static str, GradingTask> = phf_map! {
    "justification" => JUSTIFICATION,
    "creativity" => CREATIVITY,
    "story" => STORY,
    "concept_map" => CONCEPT_MAP,
};

impl GradingTask {
    /// 所有已注册的任务名
    pub fn names() -> impl Iterator<Item = &'static str> {
        GRADING_TASKS.keys().copied()
    }

    pub fn rubric(&self) -> Rubric {
        Rubric::from_pairs(
            &self
                .fields
                .iter()
                .map(|f| (f.name, f.max))
                .collect::<Vec<_>>(),
        )
    }

    pub fn formula(&self) -> CompositeFormula {
        match self.formula {
            FormulaSpec::WeightedSum { weights, decimals } => {
                CompositeFormula::weighted(weights, decimals)
            }
            FormulaSpec::PointsOverCeiling { scale, decimals } => {
                CompositeFormula::PointsOverCeiling { scale, decimals }
            }
        }
    }

    /// 系统消息：角色 + 只返回 JSON 的约束
    pub fn system_prompt(&self) -> String {
        let keys: Vec<&str> = self.fields.iter().map(|f| f.name).collect();
        let ranges: Vec<String> = self
            .fields
            .iter()
            .map(|f| format!("{} 0-{}", f.name, f.max))
            .collect();

        format!(
            "{} Respond ONLY with valid JSON. No explanations, no extra text. JSON keys must be: {}. All values are integers ({}).",
            self.role,
            keys.join(", "),
            ranges.join(", ")
        )
    }
}
