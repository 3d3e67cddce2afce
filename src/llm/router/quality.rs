//! 生成结果的质量检查

/// 模糊、含糊或未完成的措辞
const HEDGING_PHRASES: &[&str] = &[
    "i'm not sure",
    "i believe",
    "might be",
    "it depends",
    "generally speaking",
    "...",
    "etc.",
];

/// 低于该词数的文本视为过短
const MIN_WORD_COUNT: usize = 20;

/// 质量检查接口，返回true表示需要交给高质量模型润色
pub trait QualityChecker: Send + Sync {
    fn needs_escalation(&self, text: &str) -> bool;
}

/// 基于措辞与长度的启发式检查
#[derive(Debug, Clone, Copy, Default)]
pub struct HedgingQualityChecker;

impl QualityChecker for HedgingQualityChecker {
    fn needs_escalation(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        if HEDGING_PHRASES
            .iter()
            .any(|phrase| lowered.contains(phrase))
        {
            return true;
        }

        text.split_whitespace().count() < MIN_WORD_COUNT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::testing::CONFIDENT_TEXT;

    fn check(text: &str) -> bool {
        HedgingQualityChecker.needs_escalation(text)
    }

    #[test]
    fn test_confident_long_text_passes() {
        assert!(!check(CONFIDENT_TEXT));
    }

    #[test]
    fn test_short_text_always_escalates() {
        assert!(check(""));
        assert!(check("A crisp and confident tweet."));
        let nineteen = "word ".repeat(19);
        assert!(check(&nineteen));
        let twenty = "word ".repeat(20);
        assert!(!check(&twenty));
    }

    #[test]
    fn test_hedging_phrases_escalate() {
        for phrase in ["I'm not sure", "I BELIEVE", "might be", "It depends", "Generally speaking", "...", "etc."] {
            let text = format!("{} {}", CONFIDENT_TEXT, phrase);
            assert!(check(&text), "phrase {phrase:?} should escalate");
        }
    }
}
