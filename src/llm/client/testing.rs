//! 测试用的可编排后端

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::llm::client::{Backend, BackendError, Completion, CompletionParams};
use crate::llm::router::ComplexityScorer;

type Responder = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// 记录每次调用并按responder返回结果的后端，responder返回None时模拟服务端错误
pub(crate) struct RecordingBackend {
    model: String,
    responder: Responder,
    calls: Mutex<Vec<(String, CompletionParams)>>,
}

impl RecordingBackend {
    pub fn with<F>(model: &str, responder: F) -> Arc<Self>
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Arc::new(Self {
            model: model.to_string(),
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn replying(model: &str, text: &str) -> Arc<Self> {
        let text = text.to_string();
        Self::with(model, move |_| Some(text.clone()))
    }

    pub fn failing(model: &str) -> Arc<Self> {
        Self::with(model, |_| None)
    }

    pub fn calls(&self) -> Vec<(String, CompletionParams)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.calls().into_iter().map(|(prompt, _)| prompt).collect()
    }
}

#[async_trait]
impl Backend for RecordingBackend {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn call(
        &self,
        prompt: &str,
        params: &CompletionParams,
    ) -> Result<Completion, BackendError> {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), params.clone()));

        match (self.responder)(prompt) {
            Some(text) => Ok(Completion { text, tokens: 10 }),
            None => Err(BackendError::Status {
                status: 500,
                body: "scripted failure".to_string(),
            }),
        }
    }
}

/// 一段足够长且不含模糊措辞的文本，不会触发质量升级
pub(crate) const CONFIDENT_TEXT: &str = "Phi-3 vision ships with a 128k context window and strong \
benchmark results across chart reading, OCR and visual question answering, making it a compact \
multimodal model that developers can run on modest hardware today. #AI #Phi3";

/// 返回固定分数的评分器，用于固定路由方向
pub(crate) struct FixedScorer(pub f64);

impl ComplexityScorer for FixedScorer {
    fn score(&self, _prompt: &str) -> f64 {
        self.0
    }
}
