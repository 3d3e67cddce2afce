use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// 阶段执行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// 模型正常返回
    Success,
    /// 模型调用失败，内容为占位文本
    Degraded,
    /// 阶段无法执行（缺少对应智能体）
    Failed,
}

impl Display for StageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            StageStatus::Success => "success",
            StageStatus::Degraded => "degraded",
            StageStatus::Failed => "failed",
        };
        write!(f, "{}", str)
    }
}

/// 单个阶段的产出
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageOutput {
    pub content: String,
    pub status: StageStatus,
    /// 失败原因，仅在非Success时存在
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StageOutput {
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            status: StageStatus::Success,
            error: None,
        }
    }

    pub fn degraded(placeholder: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            content: placeholder.into(),
            status: StageStatus::Degraded,
            error: Some(error.into()),
        }
    }

    pub fn failed(content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            error: Some(content.clone()),
            content,
            status: StageStatus::Failed,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == StageStatus::Success
    }
}

/// 每个阶段的估算token用量（非实测值）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageEstimate {
    pub total_tokens: u64,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

impl UsageEstimate {
    pub const RESEARCHER: UsageEstimate = UsageEstimate {
        total_tokens: 1000,
        prompt_tokens: 700,
        completion_tokens: 300,
    };
    pub const WRITER: UsageEstimate = UsageEstimate {
        total_tokens: 800,
        prompt_tokens: 500,
        completion_tokens: 300,
    };
    pub const EDITOR: UsageEstimate = UsageEstimate {
        total_tokens: 1200,
        prompt_tokens: 800,
        completion_tokens: 400,
    };
}

/// 用量累加器，只增不减
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageMetrics {
    pub total_tokens: u64,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub successful_requests: u64,
}

impl UsageMetrics {
    /// 记录一次请求
    pub fn record(&mut self, estimate: UsageEstimate) {
        self.total_tokens += estimate.total_tokens;
        self.prompt_tokens += estimate.prompt_tokens;
        self.completion_tokens += estimate.completion_tokens;
        self.successful_requests += 1;
    }
}

impl Display for UsageMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "total_tokens={} prompt_tokens={} completion_tokens={} successful_requests={}",
            self.total_tokens, self.prompt_tokens, self.completion_tokens, self.successful_requests
        )
    }
}
