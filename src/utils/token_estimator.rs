/// Token估算器，用于在后端未返回用量时估算文本的token数量
pub struct TokenEstimator {
    rules: TokenCalculationRules,
}

/// Token计算规则
#[derive(Debug, Clone)]
pub struct TokenCalculationRules {
    /// ASCII字符的平均token比例（字符数/token数）
    pub ascii_char_per_token: f64,
    /// 非ASCII字符（CJK、emoji等）的平均token比例
    pub wide_char_per_token: f64,
    /// 每段文本的基础token开销
    pub base_token_overhead: usize,
}

impl Default for TokenCalculationRules {
    fn default() -> Self {
        Self {
            ascii_char_per_token: 4.0,
            wide_char_per_token: 1.5,
            base_token_overhead: 4,
        }
    }
}

/// Token估算结果
#[derive(Debug, Clone)]
pub struct TokenEstimation {
    /// 估算的token数量
    pub estimated_tokens: usize,
    pub ascii_char_count: usize,
    pub wide_char_count: usize,
}

impl Default for TokenEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenEstimator {
    pub fn new() -> Self {
        Self::with_rules(TokenCalculationRules::default())
    }

    pub fn with_rules(rules: TokenCalculationRules) -> Self {
        Self { rules }
    }

    /// 估算文本的token数量，空文本为0
    pub fn estimate_tokens(&self, text: &str) -> TokenEstimation {
        if text.is_empty() {
            return TokenEstimation {
                estimated_tokens: 0,
                ascii_char_count: 0,
                wide_char_count: 0,
            };
        }

        let ascii_char_count = text.chars().filter(char::is_ascii).count();
        let wide_char_count = text.chars().count() - ascii_char_count;

        let ascii_tokens =
            (ascii_char_count as f64 / self.rules.ascii_char_per_token).ceil() as usize;
        let wide_tokens = (wide_char_count as f64 / self.rules.wide_char_per_token).ceil() as usize;

        TokenEstimation {
            estimated_tokens: ascii_tokens + wide_tokens + self.rules.base_token_overhead,
            ascii_char_count,
            wide_char_count,
        }
    }
}
