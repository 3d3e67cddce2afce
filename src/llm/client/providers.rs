//! 后端Provider实现

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::BackendConfig;
use crate::llm::client::utils::estimate_token_usage;
use crate::llm::client::{Backend, BackendError, Completion, CompletionParams};

/// completions接口请求体
#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    stop: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    precision: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
    #[serde(default)]
    usage: Option<CompletionUsage>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    text: String,
}

#[derive(Debug, Deserialize)]
struct CompletionUsage {
    total_tokens: u64,
}

/// 通过HTTP调用completions接口的后端
#[derive(Clone)]
pub struct HttpCompletionBackend {
    config: BackendConfig,
    api_key_env: &'static str,
    client: Client,
}

impl HttpCompletionBackend {
    pub fn new(config: BackendConfig, api_key_env: &'static str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            config,
            api_key_env,
            client,
        })
    }
}

#[async_trait]
impl Backend for HttpCompletionBackend {
    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn call(
        &self,
        prompt: &str,
        params: &CompletionParams,
    ) -> Result<Completion, BackendError> {
        if self.config.api_key.is_empty() {
            return Err(BackendError::MissingApiKey(self.api_key_env));
        }

        let url = &self.config.api_url;
        let body = CompletionRequest {
            prompt,
            model: &self.config.model,
            max_tokens: params.max_tokens.unwrap_or(self.config.max_tokens),
            temperature: params.temperature.unwrap_or(self.config.temperature),
            stop: &params.stop,
            precision: params.precision.as_deref(),
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|source| BackendError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let raw = response
            .text()
            .await
            .map_err(|source| BackendError::Transport {
                url: url.clone(),
                source,
            })?;
        let parsed: CompletionResponse = serde_json::from_str(&raw)
            .map_err(|e| BackendError::MalformedResponse(e.to_string()))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.text)
            .ok_or_else(|| BackendError::MalformedResponse("empty choices".to_string()))?;

        let tokens = match parsed.usage {
            Some(usage) => usage.total_tokens,
            None => estimate_token_usage(prompt, &text).total_tokens,
        };

        tracing::debug!(model = %self.config.model, tokens, "completion finished");
        Ok(Completion { text, tokens })
    }
}

/// 离线模拟后端，输出可预测的文本
#[derive(Debug, Clone)]
pub struct SimulatedBackend {
    model: String,
}

impl SimulatedBackend {
    pub const REFINED_TWEET: &'static str =
        "This is a refined tweet about the topic with better accuracy and engagement. #AI #Tech";
    pub const REPORTED_TOKENS: u64 = 500;

    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
        }
    }
}

#[async_trait]
impl Backend for SimulatedBackend {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn call(
        &self,
        prompt: &str,
        _params: &CompletionParams,
    ) -> Result<Completion, BackendError> {
        let text = if prompt.to_lowercase().contains("refine") {
            Self::REFINED_TWEET.to_string()
        } else {
            let head: String = prompt.chars().take(50).collect();
            format!("[Simulated {}] Response for prompt: {}...", self.model, head)
        };

        Ok(Completion {
            text,
            tokens: Self::REPORTED_TOKENS,
        })
    }
}
