//! 综合分计算
//!
//! 两类公式：
//! - 加权求和：`Σ w_i * s_i`，各字段已是 0–10 分制
//! - 得分/满分：`scale * Σ s_i / Σ max_i`
//!
//! 最终结果按 `decimals` 位小数四舍五入（远离零，即 `f64::round`）。

use crate::scoring::rubric::ScoreRecord;

/// 加权求和中的一项
#[derive(Debug, Clone, PartialEq)]
pub struct Weight {
    pub field: String,
    pub weight: f64,
}

/// 综合分公式
#[derive(Debug, Clone, PartialEq)]
pub enum CompositeFormula {
    /// 加权求和，记录中缺少的字段按 0 计
    WeightedSum { weights: Vec<Weight>, decimals: u32 },
    /// 得分占满分的比例乘以 `scale`，满分为 0 时结果为 0
    PointsOverCeiling { scale: f64, decimals: u32 },
}

impl CompositeFormula {
    pub fn weighted(pairs: &[(&str, f64)], decimals: u32) -> Self {
        CompositeFormula::WeightedSum {
            weights: pairs
                .iter()
                .map(|(field, weight)| Weight {
                    field: (*field).to_string(),
                    weight: *weight,
                })
                .collect(),
            decimals,
        }
    }

    /// 结果保留的小数位数，0 表示整数分
    pub fn decimals(&self) -> u32 {
        match self {
            CompositeFormula::WeightedSum { decimals, .. }
            | CompositeFormula::PointsOverCeiling { decimals, .. } => *decimals,
        }
    }

    /// 计算综合分
    pub fn apply(&self, record: &ScoreRecord) -> f64 {
        match self {
            CompositeFormula::WeightedSum { weights, decimals } => {
                let sum: f64 = weights
                    .iter()
                    .map(|w| w.weight * f64::from(record.get(&w.field).unwrap_or(0)))
                    .sum();
                round_to(sum, *decimals)
            }
            CompositeFormula::PointsOverCeiling { scale, decimals } => {
                let ceiling = record.max_points();
                if ceiling == 0 {
                    return 0.0;
                }
                let ratio = f64::from(record.total_points()) / f64::from(ceiling);
                round_to(scale * ratio, *decimals)
            }
        }
    }
}

/// 四舍五入到指定小数位
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
