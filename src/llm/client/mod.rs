//! 模型后端 - 提供统一的completion调用接口

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::config::{BackendConfig, BackendProvider};

mod providers;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use providers::{HttpCompletionBackend, SimulatedBackend};

/// 后端在路由中承担的角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendKind {
    /// 高能效模型
    Fast,
    /// 高质量模型
    Deep,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Fast => write!(f, "fast"),
            BackendKind::Deep => write!(f, "deep"),
        }
    }
}

/// 单次调用的解码参数，未设置的字段使用后端配置中的默认值
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionParams {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    pub stop: Vec<String>,
    /// 推理精度，仅部分后端识别
    pub precision: Option<String>,
}

impl CompletionParams {
    pub fn with_temperature(temperature: f64) -> Self {
        Self {
            temperature: Some(temperature),
            ..Default::default()
        }
    }

    pub fn with_max_tokens(max_tokens: u32) -> Self {
        Self {
            max_tokens: Some(max_tokens),
            ..Default::default()
        }
    }
}

/// 后端返回的文本与token用量
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub tokens: u64,
}

/// 后端调用错误
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("API key {0} is not configured")]
    MissingApiKey(&'static str),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed backend response: {0}")]
    MalformedResponse(String),
}

/// 文本生成后端的能力接口
#[async_trait]
pub trait Backend: Send + Sync {
    /// 模型名称，用于日志与路由结果
    fn model_name(&self) -> &str;

    async fn call(
        &self,
        prompt: &str,
        params: &CompletionParams,
    ) -> Result<Completion, BackendError>;
}

/// 根据配置创建后端实例
pub fn build_backend(
    config: &BackendConfig,
    api_key_env: &'static str,
) -> anyhow::Result<Arc<dyn Backend>> {
    match config.provider {
        BackendProvider::Http => Ok(Arc::new(HttpCompletionBackend::new(
            config.clone(),
            api_key_env,
        )?)),
        BackendProvider::Simulated => Ok(Arc::new(SimulatedBackend::new(config.model.clone()))),
    }
}
