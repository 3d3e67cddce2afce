//! Prompt复杂度评估

use regex::Regex;
use std::sync::LazyLock;

/// 技术术语类别，每命中一类加分一次
static TECHNICAL_TERMS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\b(machine learning|deep learning|transformer|neural network|attention mechanism)\b",
        r"(?i)\b(fine-tuning|training|parameter|embedding|token)\b",
        r"(?i)\b(algorithm|architecture|inference|optimization|quantization)\b",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("technical term pattern is valid"))
    .collect()
});

static CODE_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```|def |class |import |from .* import").expect("code marker pattern is valid")
});

static MATH_DELIMITERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$.*\$|\\\(.*\\\)|\\\[.*\\\]").expect("math delimiter pattern is valid")
});

const TECHNICAL_TERM_WEIGHT: f64 = 0.1;
const CODE_WEIGHT: f64 = 0.2;
const MATH_WEIGHT: f64 = 0.15;
const LENGTH_WEIGHT_CAP: f64 = 0.3;
const WORDS_PER_FULL_LENGTH_WEIGHT: f64 = 500.0;

/// 复杂度评分接口，返回 [0, 1] 区间的分值
pub trait ComplexityScorer: Send + Sync {
    fn score(&self, prompt: &str) -> f64;
}

/// 基于术语、代码、公式与长度的启发式评分
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicScorer;

impl ComplexityScorer for HeuristicScorer {
    fn score(&self, prompt: &str) -> f64 {
        let mut score = 0.0;

        for pattern in TECHNICAL_TERMS.iter() {
            if pattern.is_match(prompt) {
                score += TECHNICAL_TERM_WEIGHT;
            }
        }

        if CODE_MARKERS.is_match(prompt) {
            score += CODE_WEIGHT;
        }

        if MATH_DELIMITERS.is_match(prompt) {
            score += MATH_WEIGHT;
        }

        let word_count = prompt.split_whitespace().count() as f64;
        score += (word_count / WORDS_PER_FULL_LENGTH_WEIGHT).min(LENGTH_WEIGHT_CAP);

        score.min(1.0)
    }
}
