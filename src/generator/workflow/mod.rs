use crate::config::Config;
use crate::generator::agent::Agent;
use crate::generator::context::GeneratorContext;
use crate::generator::persona::PersonaKind;
use crate::generator::types::{StageOutput, UsageEstimate, UsageMetrics};
use crate::llm::tools::Capability;

use anyhow::{Context, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;
use serde_json::json;
use std::time::{Duration, Instant};
use thiserror::Error;

/// 工作流各阶段产出的键，顺序即写入顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKey {
    ScrapedContent,
    ResearchReport,
    OriginalTweet,
    FinalTweets,
}

impl StageKey {
    pub const ALL: [StageKey; 4] = [
        StageKey::ScrapedContent,
        StageKey::ResearchReport,
        StageKey::OriginalTweet,
        StageKey::FinalTweets,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            StageKey::ScrapedContent => "scraped_content",
            StageKey::ResearchReport => "research_report",
            StageKey::OriginalTweet => "original_tweet",
            StageKey::FinalTweets => "final_tweets",
        }
    }

    fn position(&self) -> usize {
        match self {
            StageKey::ScrapedContent => 0,
            StageKey::ResearchReport => 1,
            StageKey::OriginalTweet => 2,
            StageKey::FinalTweets => 3,
        }
    }
}

impl std::fmt::Display for StageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 工作流状态，由已记录的阶段数推导
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Init,
    Scraped,
    Researched,
    Drafted,
    /// 终态
    Edited,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("stage {got} recorded out of order, expected {expected}")]
    OutOfOrder { expected: StageKey, got: StageKey },

    #[error("stage {0} recorded after the workflow completed")]
    AlreadyComplete(StageKey),
}

/// 有序的阶段结果，每个键只能按顺序写入一次
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowResult {
    stages: Vec<(StageKey, StageOutput)>,
}

impl WorkflowResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入下一个阶段的结果
    pub fn record(&mut self, key: StageKey, output: StageOutput) -> Result<(), WorkflowError> {
        let Some(expected) = StageKey::ALL.get(self.stages.len()).copied() else {
            return Err(WorkflowError::AlreadyComplete(key));
        };
        if key != expected {
            return Err(WorkflowError::OutOfOrder { expected, got: key });
        }
        self.stages.push((key, output));
        Ok(())
    }

    pub fn get(&self, key: StageKey) -> Option<&StageOutput> {
        self.stages.get(key.position()).map(|(_, output)| output)
    }

    pub fn content(&self, key: StageKey) -> Option<&str> {
        self.get(key).map(|output| output.content.as_str())
    }

    pub fn keys(&self) -> Vec<StageKey> {
        self.stages.iter().map(|(key, _)| *key).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StageKey, &StageOutput)> {
        self.stages.iter().map(|(key, output)| (*key, output))
    }

    pub fn state(&self) -> WorkflowState {
        match self.stages.len() {
            0 => WorkflowState::Init,
            1 => WorkflowState::Scraped,
            2 => WorkflowState::Researched,
            3 => WorkflowState::Drafted,
            _ => WorkflowState::Edited,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state() == WorkflowState::Edited
    }

    /// 非Success的阶段
    pub fn degraded_stages(&self) -> Vec<StageKey> {
        self.iter()
            .filter(|(_, output)| !output.is_success())
            .map(|(key, _)| key)
            .collect()
    }
}

impl Serialize for WorkflowResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.stages.len()))?;
        for (key, output) in &self.stages {
            map.serialize_entry(key.as_str(), output)?;
        }
        map.end()
    }
}

/// 工作流输入
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, Deserialize)]
pub struct WorkflowInputs {
    pub topic: String,
    pub urls: Vec<String>,
    #[serde(default)]
    pub suggestion: String,
}

/// 一次运行的完整结果
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct WorkflowReport {
    pub result: WorkflowResult,
    pub usage_metrics: UsageMetrics,
}

/// 阶段计时
struct TimingScope {
    start_time: Instant,
    phase_durations: Vec<(StageKey, Duration)>,
}

impl TimingScope {
    fn new() -> Self {
        Self {
            start_time: Instant::now(),
            phase_durations: Vec::new(),
        }
    }

    fn end_phase(&mut self, key: StageKey, started: Instant) {
        self.phase_durations.push((key, started.elapsed()));
    }

    fn generate_timing_report(&self) -> String {
        let mut report = format!(
            "总执行时间: {:.2}秒\n",
            self.start_time.elapsed().as_secs_f64()
        );
        for (key, duration) in &self.phase_durations {
            report.push_str(&format!("- {}: {:.3}秒\n", key, duration.as_secs_f64()));
        }
        report
    }
}

/// 四阶段推文生成流水线，自身不保存运行状态，可重复运行
pub struct Workflow {
    agents: Vec<Agent>,
}

impl Workflow {
    pub fn new(agents: Vec<Agent>) -> Self {
        Self { agents }
    }

    pub fn from_context(context: &GeneratorContext) -> Self {
        Self::new(context.standard_agents())
    }

    pub fn agent(&self, kind: PersonaKind) -> Option<&Agent> {
        self.agents.iter().find(|agent| agent.kind() == kind)
    }

    pub async fn run_scraper(&self, urls: &[String]) -> StageOutput {
        let Some(agent) = self.agent(PersonaKind::Scraper) else {
            return StageOutput::failed(PersonaKind::Scraper.not_found_message());
        };

        let url_list = urls
            .iter()
            .map(|url| format!("- {}", url))
            .collect::<Vec<_>>()
            .join("\n");
        let task = format!("Scrape the content from the following URLs:\n{}", url_list);
        agent.execute(&task, "").await
    }

    pub async fn run_researcher(
        &self,
        topic: &str,
        scraped_content: &str,
        usage: &mut UsageMetrics,
    ) -> StageOutput {
        let Some(agent) = self.agent(PersonaKind::Researcher) else {
            return StageOutput::failed(PersonaKind::Researcher.not_found_message());
        };

        let task = format!(
            "Research and analyze information about the topic: {}",
            topic
        );
        let context = format!(
            "Use the following scraped content as your primary source:\n{}",
            scraped_content
        );
        let output = agent.execute(&task, &context).await;
        usage.record(UsageEstimate::RESEARCHER);
        output
    }

    pub async fn run_writer(&self, research_report: &str, usage: &mut UsageMetrics) -> StageOutput {
        let Some(agent) = self.agent(PersonaKind::Writer) else {
            return StageOutput::failed(PersonaKind::Writer.not_found_message());
        };

        let mut context = format!("Research Report:\n{}", research_report);
        if let Some(examples) = style_examples(agent).await {
            context.push_str(&format!("\n\nExample Tweets:\n{}", examples));
        }
        let output = agent
            .execute("Write an engaging tweet based on the research report", &context)
            .await;
        usage.record(UsageEstimate::WRITER);
        output
    }

    pub async fn run_editor(
        &self,
        original_tweet: &str,
        research_report: &str,
        suggestion: &str,
        usage: &mut UsageMetrics,
    ) -> StageOutput {
        let Some(agent) = self.agent(PersonaKind::Editor) else {
            return StageOutput::failed(PersonaKind::Editor.not_found_message());
        };

        let context = format!(
            "\nOriginal Tweet:\n{}\n\nResearch Report:\n{}\n\nSuggestion:\n{}\n",
            original_tweet, research_report, suggestion
        );
        let output = agent
            .execute("Create 3 different versions of the tweet", &context)
            .await;
        usage.record(UsageEstimate::EDITOR);
        output
    }

    /// 依次执行四个阶段，上一阶段的输出作为下一阶段的输入
    pub async fn run_workflow(
        &self,
        inputs: &WorkflowInputs,
    ) -> Result<WorkflowReport, WorkflowError> {
        let mut result = WorkflowResult::new();
        let mut usage = UsageMetrics::default();
        let mut timing = TimingScope::new();

        println!("🤖 执行内容抓取...");
        let started = Instant::now();
        let scraped = self.run_scraper(&inputs.urls).await;
        timing.end_phase(StageKey::ScrapedContent, started);
        result.record(StageKey::ScrapedContent, scraped)?;

        println!("🤖 执行主题研究: {}", inputs.topic);
        let started = Instant::now();
        let research = self
            .run_researcher(
                &inputs.topic,
                result.content(StageKey::ScrapedContent).unwrap_or_default(),
                &mut usage,
            )
            .await;
        timing.end_phase(StageKey::ResearchReport, started);
        result.record(StageKey::ResearchReport, research)?;

        println!("🤖 执行推文撰写...");
        let started = Instant::now();
        let tweet = self
            .run_writer(
                result.content(StageKey::ResearchReport).unwrap_or_default(),
                &mut usage,
            )
            .await;
        timing.end_phase(StageKey::OriginalTweet, started);
        result.record(StageKey::OriginalTweet, tweet)?;

        println!("🤖 执行推文编辑...");
        let started = Instant::now();
        let final_tweets = self
            .run_editor(
                result.content(StageKey::OriginalTweet).unwrap_or_default(),
                result.content(StageKey::ResearchReport).unwrap_or_default(),
                &inputs.suggestion,
                &mut usage,
            )
            .await;
        timing.end_phase(StageKey::FinalTweets, started);
        result.record(StageKey::FinalTweets, final_tweets)?;

        println!("\n⏱️ {}", timing.generate_timing_report());

        let degraded = result.degraded_stages();
        if !degraded.is_empty() {
            let names: Vec<_> = degraded.iter().map(StageKey::as_str).collect();
            eprintln!("⚠️ 以下阶段未获得模型输出: {}", names.join(", "));
        }

        Ok(WorkflowReport {
            result,
            usage_metrics: usage,
        })
    }
}

/// 读取风格参考推文，角色无此工具、文件缺失或为空时返回 None
async fn style_examples(agent: &Agent) -> Option<String> {
    let capability = Capability::ReadTweets;
    agent.persona().allowed(capability.name())?;

    match agent.use_capability(capability.name(), &json!({})).await {
        Ok(tweets) if !tweets.trim().is_empty() => Some(tweets),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(error = %e, "no style reference tweets");
            None
        }
    }
}

/// 启动推文生成工作流
pub async fn launch(
    config: &Config,
    inputs: &WorkflowInputs,
    save_output: bool,
) -> Result<WorkflowReport> {
    let missing = config.missing_api_keys();
    if !missing.is_empty() {
        eprintln!(
            "⚠️ 警告: 以下环境变量未设置，相关调用将失败: {}",
            missing.join(", ")
        );
    }

    for dir in [config.agent_logs_dir(), config.output_dir()] {
        tokio::fs::create_dir_all(&dir)
            .await
            .context(format!("Failed to create directory: {:?}", dir))?;
    }

    let context = GeneratorContext::new(config.clone())?;
    launch_with_context(&context, inputs, save_output).await
}

/// 使用已构建的上下文运行工作流并保存结果
pub async fn launch_with_context(
    context: &GeneratorContext,
    inputs: &WorkflowInputs,
    save_output: bool,
) -> Result<WorkflowReport> {
    let workflow = Workflow::from_context(context);
    let report = workflow.run_workflow(inputs).await?;

    println!("📊 用量统计: {}", report.usage_metrics);

    if save_output {
        let final_tweets = report
            .result
            .content(StageKey::FinalTweets)
            .unwrap_or_default();
        let args = json!({ "text": final_tweets });
        let saved = match workflow.agent(PersonaKind::Editor) {
            Some(editor) => editor.use_capability("save_tweet", &args).await?,
            None => context
                .toolbox
                .tweets()
                .save_tweet(final_tweets)
                .await?
                .display()
                .to_string(),
        };
        println!("💾 已保存推文: {}", saved);

        crate::generator::outlet::save(&context.config, &inputs.topic, &report).await?;
    }

    Ok(report)
}
