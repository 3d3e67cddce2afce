//! 智能体：角色 + 模型路由 + 工具

use anyhow::Result;
use serde_json::Value;

use crate::generator::journal::{AgentJournal, LogRecord};
use crate::generator::persona::{Persona, PersonaKind};
use crate::generator::types::StageOutput;
use crate::llm::client::BackendError;
use crate::llm::router::ModelRouter;
use crate::llm::tools::Toolbox;

/// 超过该字符数的上下文先压缩再使用
pub const COMPRESSION_THRESHOLD: usize = 1000;

/// 没有专用路由的角色直接调用高能效模型时的温度
const DIRECT_CALL_TEMPERATURE: f64 = 0.7;

pub struct Agent {
    persona: Persona,
    router: ModelRouter,
    toolbox: Toolbox,
    journal: Option<AgentJournal>,
}

impl Agent {
    pub fn new(persona: Persona, router: ModelRouter, toolbox: Toolbox) -> Self {
        let journal = persona.log_destination.clone().map(AgentJournal::new);
        Self {
            persona,
            router,
            toolbox,
            journal,
        }
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    pub fn kind(&self) -> PersonaKind {
        self.persona.kind
    }

    /// 组装提示词
    pub fn build_prompt(&self, task: &str, context: &str) -> String {
        format!(
            "You are a {}.\nGoal: {}\nBackground: {}\n\nTask: {}\n\n{}\n\nPlease complete this task to the best of your abilities.\n",
            self.persona.role, self.persona.goal, self.persona.backstory, task, context
        )
    }

    /// 执行任务，后端失败时返回降级的占位内容
    pub async fn execute(&self, task: &str, context: &str) -> StageOutput {
        match self.try_execute(task, context).await {
            Ok((prompt, output)) => {
                self.journal(LogRecord::exchange(self.persona.name(), &prompt, &output))
                    .await;
                StageOutput::success(output)
            }
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(agent = self.persona.name(), error = %message, "falling back to placeholder");
                eprintln!(
                    "⚠️ {} 调用模型失败，使用占位内容: {}",
                    self.persona.kind.label(),
                    message
                );
                self.journal(LogRecord::fallback(self.persona.name(), &message))
                    .await;
                StageOutput::degraded(self.persona.kind.placeholder(), message)
            }
        }
    }

    async fn try_execute(
        &self,
        task: &str,
        context: &str,
    ) -> Result<(String, String), BackendError> {
        let context = if context.chars().count() > COMPRESSION_THRESHOLD {
            tracing::debug!(
                agent = self.persona.name(),
                chars = context.chars().count(),
                "compressing context"
            );
            self.router.compress_prompt(context).await?
        } else {
            context.to_string()
        };

        let prompt = self.build_prompt(task, &context);

        let output = match self.persona.kind {
            PersonaKind::Researcher => self.router.route_query(&prompt).await?.response_text,
            PersonaKind::Writer | PersonaKind::Editor => self.router.generate_tweet(&prompt).await?,
            PersonaKind::Scraper => {
                self.router
                    .call_fast(&prompt, DIRECT_CALL_TEMPERATURE)
                    .await?
            }
        };

        Ok((prompt, output))
    }

    /// 按名称调用该角色允许使用的工具
    pub async fn use_capability(&self, name: &str, args: &Value) -> Result<String> {
        let Some(capability) = self.persona.allowed(name) else {
            return Ok(format!(
                "Tool {} not found or not allowed for this agent.",
                name
            ));
        };

        let output = self.toolbox.invoke(capability, args).await?;
        self.journal(LogRecord::output(
            self.persona.name(),
            &format!("{}: {}", capability, output),
        ))
        .await;
        Ok(output)
    }

    async fn journal(&self, record: LogRecord) {
        if let Some(journal) = &self.journal {
            if let Err(e) = journal.append(&record).await {
                tracing::warn!(
                    agent = self.persona.name(),
                    path = %journal.path().display(),
                    error = %e,
                    "failed to write journal"
                );
            }
        }
    }
}
