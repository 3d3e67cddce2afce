//! 流水线中各阶段的角色定义

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::llm::tools::Capability;

/// 角色种类，决定调用哪条路由
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonaKind {
    Scraper,
    Researcher,
    Writer,
    Editor,
}

impl PersonaKind {
    /// 流水线中的执行顺序
    pub const ALL: [PersonaKind; 4] = [
        PersonaKind::Scraper,
        PersonaKind::Researcher,
        PersonaKind::Writer,
        PersonaKind::Editor,
    ];

    pub const fn name(&self) -> &'static str {
        match self {
            PersonaKind::Scraper => "scraper",
            PersonaKind::Researcher => "researcher",
            PersonaKind::Writer => "writer",
            PersonaKind::Editor => "editor",
        }
    }

    /// 首字母大写的名称，用于提示信息
    pub const fn label(&self) -> &'static str {
        match self {
            PersonaKind::Scraper => "Scraper",
            PersonaKind::Researcher => "Researcher",
            PersonaKind::Writer => "Writer",
            PersonaKind::Editor => "Editor",
        }
    }

    /// 后端调用失败时使用的占位文本
    pub const fn placeholder(&self) -> &'static str {
        match self {
            PersonaKind::Scraper => SCRAPER_PLACEHOLDER,
            PersonaKind::Researcher => RESEARCHER_PLACEHOLDER,
            PersonaKind::Writer => WRITER_PLACEHOLDER,
            PersonaKind::Editor => EDITOR_PLACEHOLDER,
        }
    }

    /// 缺少该角色时记录的阶段内容
    pub fn not_found_message(&self) -> String {
        format!("{} agent not found", self.label())
    }
}

impl std::fmt::Display for PersonaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

const SCRAPER_PLACEHOLDER: &str = "Mock scraped content from URLs. This contains information about \
AI coding assistants including GitHub Copilot's latest features and Claude 3 capabilities.";

const RESEARCHER_PLACEHOLDER: &str = "Research Analysis:\n\n\
GitHub Copilot has evolved to provide more contextual assistance with code completion, bug fixing, \
and documentation. It now integrates better with IDEs and offers chat-based interactions.\n\n\
Claude 3 by Anthropic comes in multiple models (Haiku, Sonnet, and Opus) with progressively \
increasing capabilities, with Opus being the most powerful. Claude 3 excels at understanding \
complex instructions and generating high-quality, factual responses.";

const WRITER_PLACEHOLDER: &str = "GitHub Copilot and Claude 3 are revolutionizing coding with \
AI-powered assistance. Copilot offers real-time code suggestions while Claude 3's Opus model \
provides sophisticated reasoning for complex development tasks. #AIcoding #DevTools";

const EDITOR_PLACEHOLDER: &str = "Tweet Variations:\n\n\
1. Comparing AI coding assistants: GitHub Copilot excels at real-time code suggestions while \
Claude 3 offers powerful reasoning capabilities across three different models (Haiku, Sonnet, \
Opus). Which one are you using? #AIcoding #DevTools\n\n\
2. The AI coding assistant landscape is evolving rapidly with GitHub Copilot transforming IDEs \
and Claude 3 bringing advanced reasoning to development. Both offer unique strengths for \
different coding needs. #DevExperience\n\n\
3. Looking for the best AI coding assistant? GitHub Copilot provides contextual code completion \
and real-time suggestions, while Claude 3's family of models offers scalable capabilities from \
quick tasks (Haiku) to complex reasoning (Opus). #AItools";

/// 角色配置，构建后不再修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    pub kind: PersonaKind,
    pub role: String,
    pub goal: String,
    pub backstory: String,
    pub capabilities: Vec<Capability>,
    /// 交互日志文件，None时不记录
    pub log_destination: Option<PathBuf>,
}

impl Persona {
    /// 预置角色，`logs_dir` 为 None 时不写日志
    pub fn preset(kind: PersonaKind, logs_dir: Option<&Path>) -> Self {
        let (role, goal, backstory, capabilities) = match kind {
            PersonaKind::Scraper => (
                "Senior Website Scraper",
                "Scrape the content from the provided URLs and return the text data",
                "You are an experienced software engineer who is master at scraping various web data (sites, images, videos).\n\
                 Your role is to read the content from provided URLs and extract the text.",
                vec![],
            ),
            PersonaKind::Researcher => (
                "Senior Technical Researcher",
                "Extract the key insights and information from the internet on the given topic and provided URLs",
                "You are a technical researcher with expertise in technologies like\n\
                 Artificial Intelligence, Machine Learning, Large Language Models etc.\n\
                 Your role is to summarize the key insights from the provided texts that are related to the given topic.\n\
                 You can also search the web for additional information.",
                vec![Capability::SearchWeb],
            ),
            PersonaKind::Writer => (
                "Senior Social Media Writer",
                "Write a tweet post based on the research content provided by the Researcher.\n\
                 Emulate the writing style of the tweets in your own writing - word choice, formatting, use of emojis, hashtags, etc.",
                "You have extensive experience in writing engaging content for social media platforms like Twitter, Facebook, Instagram, etc.\n\
                 Your main focus is technology - Artificial Intelligence, Machine Learning, Large Language Models etc.\n\
                 You have a track record of writing tweets that engage the audience and drive traffic.",
                vec![Capability::ReadTweets],
            ),
            PersonaKind::Editor => (
                "Senior Tweet Editor",
                "Write 3 different versions of the tweet based on the original research report.\n\
                 Keep the format and style of the original tweet.\n\
                 Create a single text that contains all variants (original and different versions) of the tweet.",
                "You have experience with social media and understand the importance of engaging content.\n\
                 You always write tweets that get a lot of engagement and you are known for your creative writing style.",
                vec![Capability::SaveTweet],
            ),
        };

        Self {
            kind,
            role: role.to_string(),
            goal: goal.to_string(),
            backstory: backstory.to_string(),
            capabilities,
            log_destination: logs_dir.map(|dir| dir.join(format!("{}.jsonl", kind.name()))),
        }
    }

    /// 完整的四个角色，按执行顺序排列
    pub fn standard_crew(logs_dir: Option<&Path>) -> Vec<Persona> {
        PersonaKind::ALL
            .iter()
            .map(|kind| Persona::preset(*kind, logs_dir))
            .collect()
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// 按名称查找允许使用的工具
    pub fn allowed(&self, name: &str) -> Option<Capability> {
        self.capabilities
            .iter()
            .copied()
            .find(|capability| capability.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::router::{HedgingQualityChecker, QualityChecker};

    #[test]
    fn test_standard_crew_order_and_logs() {
        let crew = Persona::standard_crew(Some(Path::new("/tmp/logs/agents")));
        let names: Vec<_> = crew.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["scraper", "researcher", "writer", "editor"]);
        assert_eq!(
            crew[2].log_destination,
            Some(PathBuf::from("/tmp/logs/agents/writer.jsonl"))
        );
    }

    #[test]
    fn test_default_capabilities() {
        let scraper = Persona::preset(PersonaKind::Scraper, None);
        assert!(scraper.capabilities.is_empty());
        assert!(scraper.log_destination.is_none());

        let editor = Persona::preset(PersonaKind::Editor, None);
        assert_eq!(editor.allowed("save_tweet"), Some(Capability::SaveTweet));
        assert_eq!(editor.allowed("search_web"), None);
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(
            PersonaKind::Writer.not_found_message(),
            "Writer agent not found"
        );
    }

    #[test]
    fn test_editor_placeholder_has_three_variations() {
        let text = PersonaKind::Editor.placeholder();
        assert!(text.contains("\n1. "));
        assert!(text.contains("\n2. "));
        assert!(text.contains("\n3. "));
    }

    #[test]
    fn test_writer_placeholder_is_a_valid_tweet() {
        let text = PersonaKind::Writer.placeholder();
        assert!(text.chars().count() <= 280);
        assert!(!HedgingQualityChecker.needs_escalation(text));
    }
}
