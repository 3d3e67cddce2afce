//! 混合模型路由 - 根据复杂度在高能效与高质量模型之间分发请求

use anyhow::Result;
use std::sync::Arc;

use crate::config::{Config, EnvKeys};
use crate::llm::client::{Backend, BackendError, BackendKind, CompletionParams, build_backend};

mod complexity;
mod quality;

pub use complexity::{ComplexityScorer, HeuristicScorer};
pub use quality::{HedgingQualityChecker, QualityChecker};

/// 复杂度低于该值时使用高能效模型
pub const ROUTING_THRESHOLD: f64 = 0.4;

/// 推文字符上限
pub const TWEET_CHAR_LIMIT: usize = 280;

const FAST_ROUTE_TEMPERATURE: f64 = 0.3;
const COMPRESSION_MAX_TOKENS: u32 = 150;
const DEEP_PRECISION: &str = "bf16";
const DEEP_TEMPERATURE: f64 = 0.0;
const DEEP_MAX_TOKENS: u32 = 1024;

/// 单次路由调用的结果
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingDecision {
    pub complexity_score: f64,
    pub chosen_backend: BackendKind,
    /// 实际处理请求的模型名称
    pub model: String,
    pub response_text: String,
    pub token_count: u64,
}

/// 模型路由器
#[derive(Clone)]
pub struct ModelRouter {
    fast: Arc<dyn Backend>,
    deep: Arc<dyn Backend>,
    scorer: Arc<dyn ComplexityScorer>,
    checker: Arc<dyn QualityChecker>,
}

impl ModelRouter {
    /// 使用默认启发式规则创建路由器
    pub fn new(fast: Arc<dyn Backend>, deep: Arc<dyn Backend>) -> Self {
        Self::with_heuristics(
            fast,
            deep,
            Arc::new(HeuristicScorer),
            Arc::new(HedgingQualityChecker),
        )
    }

    pub fn with_heuristics(
        fast: Arc<dyn Backend>,
        deep: Arc<dyn Backend>,
        scorer: Arc<dyn ComplexityScorer>,
        checker: Arc<dyn QualityChecker>,
    ) -> Self {
        Self {
            fast,
            deep,
            scorer,
            checker,
        }
    }

    /// 根据配置创建两个后端
    pub fn from_config(config: &Config) -> Result<Self> {
        let fast = build_backend(&config.fast, EnvKeys::FAST_API_KEY)?;
        let deep = build_backend(&config.deep, EnvKeys::DEEP_API_KEY)?;
        Ok(Self::new(fast, deep))
    }

    /// 高质量模型的固定解码参数，不受 `[deep]` 配置影响
    fn deep_params() -> CompletionParams {
        CompletionParams {
            max_tokens: Some(DEEP_MAX_TOKENS),
            temperature: Some(DEEP_TEMPERATURE),
            precision: Some(DEEP_PRECISION.to_string()),
            ..Default::default()
        }
    }

    fn backend(&self, kind: BackendKind) -> &Arc<dyn Backend> {
        match kind {
            BackendKind::Fast => &self.fast,
            BackendKind::Deep => &self.deep,
        }
    }

    /// 按复杂度路由查询
    pub async fn route_query(&self, prompt: &str) -> Result<RoutingDecision, BackendError> {
        let complexity_score = self.scorer.score(prompt);

        let (chosen_backend, params) = if complexity_score < ROUTING_THRESHOLD {
            (
                BackendKind::Fast,
                CompletionParams::with_temperature(FAST_ROUTE_TEMPERATURE),
            )
        } else {
            (BackendKind::Deep, Self::deep_params())
        };

        let backend = self.backend(chosen_backend);
        tracing::debug!(
            complexity_score,
            backend = %chosen_backend,
            model = backend.model_name(),
            "routing query"
        );

        let completion = backend.call(prompt, &params).await?;

        Ok(RoutingDecision {
            complexity_score,
            chosen_backend,
            model: backend.model_name().to_string(),
            response_text: completion.text,
            token_count: completion.tokens,
        })
    }

    /// 生成推文：高能效模型出初稿，质量不达标时交给高质量模型润色
    pub async fn generate_tweet(&self, prompt: &str) -> Result<String, BackendError> {
        let draft = self
            .fast
            .call(prompt, &CompletionParams::default())
            .await?
            .text;

        let final_text = if self.checker.needs_escalation(&draft) {
            tracing::debug!(model = self.deep.model_name(), "escalating draft for refinement");
            let refine_prompt = format!(
                "Refine this tweet to be accurate, engaging, and concise: {}",
                draft
            );
            self.deep
                .call(&refine_prompt, &Self::deep_params())
                .await?
                .text
        } else {
            draft
        };

        Ok(truncate_chars(&final_text, TWEET_CHAR_LIMIT))
    }

    /// 压缩过长的上下文
    pub async fn compress_prompt(&self, text: &str) -> Result<String, BackendError> {
        let prompt = format!("Compress: {}", text);
        let completion = self
            .fast
            .call(
                &prompt,
                &CompletionParams::with_max_tokens(COMPRESSION_MAX_TOKENS),
            )
            .await?;
        Ok(completion.text)
    }

    /// 直接调用高能效模型
    pub async fn call_fast(&self, prompt: &str, temperature: f64) -> Result<String, BackendError> {
        let completion = self
            .fast
            .call(prompt, &CompletionParams::with_temperature(temperature))
            .await?;
        Ok(completion.text)
    }
}

/// 按字符（而非字节）截断
pub fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
