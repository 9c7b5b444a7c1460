//! 词汇层面的论证评分（不调用模型）
//!
//! 三个信号，均在 `[0, 1]`：
//! - semantic：与参考答案的词袋余弦相似度
//! - reasoning：论证连接词命中数 + 从属连词密度
//! - complexity：平均句长 + 类符/形符比
//!
//! 最终分 = 0.4 * semantic + 0.3 * reasoning + 0.3 * complexity。

use phf::phf_set;
use regex::Regex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use crate::scoring::compile_regex;
use crate::scoring::composite::round_to;

const SEMANTIC_WEIGHT: f64 = 0.4;
const REASONING_WEIGHT: f64 = 0.3;
const COMPLEXITY_WEIGHT: f64 = 0.3;

/// 论证连接词，按整词（或整词组）匹配，每个只计一次
const REASONING_MARKERS: &[&str] = &[
    "because",
    "therefore",
    "thus",
    "hence",
    "so",
    "as a result",
    "consequently",
    "however",
    "but",
    "although",
    "since",
    "due to",
    "for example",
    "for instance",
];

/// 引导从句的词，用来粗略估计从句数量
static SUBORDINATORS: phf::Set<&'static str> = phf_set! {
    "because", "since", "although", "though", "while", "whereas", "when",
    "whenever", "if", "unless", "until", "after", "before", "that", "which",
    "who", "whom", "whose", "where",
};

/// 词汇评分结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LexicalScore {
    pub semantic: f64,
    pub reasoning: f64,
    pub complexity: f64,
    pub final_score: f64,
    pub feedback: Vec<String>,
}

fn whitespace() -> Option<&'static Regex> {
    static WHITESPACE: OnceLock<Option<Regex>> = OnceLock::new();
    WHITESPACE.get_or_init(|| compile_regex(r"\s+")).as_ref()
}

fn word() -> Option<&'static Regex> {
    static WORD: OnceLock<Option<Regex>> = OnceLock::new();
    WORD.get_or_init(|| compile_regex(r"[A-Za-z]+(?:'[A-Za-z]+)?"))
        .as_ref()
}

/// 去掉首尾空白，连续空白合并为一个空格
pub fn clean_text(text: &str) -> String {
    let trimmed = text.trim();
    match whitespace() {
        Some(re) => re.replace_all(trimmed, " ").into_owned(),
        None => trimmed.to_string(),
    }
}

/// 小写的字母词序列
fn words(text: &str) -> Vec<String> {
    match word() {
        Some(re) => re
            .find_iter(text)
            .map(|m| m.as_str().to_lowercase())
            .collect(),
        None => Vec::new(),
    }
}

/// 按 `.` `!` `?` 切句，丢弃空句
fn sentences(text: &str) -> Vec<&str> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// 词袋余弦相似度
pub fn semantic_similarity(answer: &str, reference: &str) -> f64 {
    fn counts(tokens: Vec<String>) -> HashMap<String, f64> {
        let mut map = HashMap::new();
        for token in tokens {
            *map.entry(token).or_insert(0.0) += 1.0;
        }
        map
    }

    let a = counts(words(answer));
    let b = counts(words(reference));
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let dot: f64 = a
        .iter()
        .filter_map(|(token, x)| b.get(token).map(|y| x * y))
        .sum();
    let norm = |m: &HashMap<String, f64>| m.values().map(|v| v * v).sum::<f64>().sqrt();

    (dot / (norm(&a) * norm(&b))).clamp(0.0, 1.0)
}

/// 论证分
pub fn reasoning_score(answer: &str) -> f64 {
    let tokens = words(answer);
    let padded = format!(" {} ", tokens.join(" "));

    let marker_hits = REASONING_MARKERS
        .iter()
        .filter(|marker| padded.contains(&format!(" {} ", marker)))
        .count();
    let marker_score = (marker_hits as f64 / 4.0).min(1.0);

    let subordinate = tokens
        .iter()
        .filter(|t| SUBORDINATORS.contains(t.as_str()))
        .count();
    let sentence_count = sentences(answer).len().max(1);
    let subs_score = (subordinate as f64 / sentence_count as f64).min(1.0);

    (0.6 * marker_score + 0.4 * subs_score).clamp(0.0, 1.0)
}

/// 复杂度分
pub fn complexity_score(answer: &str) -> f64 {
    let tokens = words(answer);
    if tokens.is_empty() {
        return 0.0;
    }

    let sentence_lengths: Vec<usize> = sentences(answer)
        .iter()
        .map(|s| words(s).len())
        .collect();
    let avg_sentence_len = if sentence_lengths.is_empty() {
        0.0
    } else {
        sentence_lengths.iter().sum::<usize>() as f64 / sentence_lengths.len() as f64
    };

    let unique: HashSet<&String> = tokens.iter().collect();
    let ttr = unique.len() as f64 / tokens.len() as f64;

    // 句长 5 -> 0, 20 -> 1；TTR 0.2 -> 0, 0.6 -> 1
    let sent_len_score = ((avg_sentence_len - 5.0) / 15.0).clamp(0.0, 1.0);
    let ttr_score = ((ttr - 0.2) / 0.4).clamp(0.0, 1.0);

    (0.5 * sent_len_score + 0.5 * ttr_score).clamp(0.0, 1.0)
}

fn feedback(semantic: f64, reasoning: f64, complexity: f64) -> Vec<String> {
    let mut items = Vec::new();
    if semantic < 0.5 {
        items.push("Your answer seems off-target compared to the expected response. Cite main points or definitions from the prompt.".to_string());
    }
    if reasoning < 0.5 {
        items.push("Add explicit reasoning: use 'because', 'therefore' or phrases that link cause and effect.".to_string());
    }
    if complexity < 0.4 {
        items.push("Expand your answer with an example or an extra sentence to show depth.".to_string());
    }
    if items.is_empty() {
        items.push("Good work: clear, relevant, and reasoned. Consider adding an example to strengthen it further.".to_string());
    }
    items
}

/// 对回答做词汇层面的评分
pub fn score_justification(answer: &str, reference: &str) -> LexicalScore {
    let answer = clean_text(answer);
    let reference = clean_text(reference);

    let semantic = semantic_similarity(&answer, &reference);
    let reasoning = reasoning_score(&answer);
    let complexity = complexity_score(&answer);
    let final_score = (SEMANTIC_WEIGHT * semantic
        + REASONING_WEIGHT * reasoning
        + COMPLEXITY_WEIGHT * complexity)
        .clamp(0.0, 1.0);

    LexicalScore {
        semantic: round_to(semantic, 3),
        reasoning: round_to(reasoning, 3),
        complexity: round_to(complexity, 3),
        final_score: round_to(final_score, 3),
        feedback: feedback(semantic, reasoning, complexity),
    }
}
