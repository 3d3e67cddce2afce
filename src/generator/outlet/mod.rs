use crate::config::Config;
use crate::generator::workflow::{StageKey, WorkflowReport};

use anyhow::{Context, Result};
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

/// 运行报告文件名
pub const REPORT_FILE: &str = "report.md";

static NUMBERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*\d+[.)][ \t]+").unwrap());

/// 保存运行报告
pub async fn save(config: &Config, topic: &str, report: &WorkflowReport) -> Result<PathBuf> {
    let outlet = DiskOutlet::new(config.output_dir());
    outlet.save(topic, report).await
}

#[allow(async_fn_in_trait)]
pub trait Outlet {
    async fn save(&self, topic: &str, report: &WorkflowReport) -> Result<PathBuf>;
}

pub struct DiskOutlet {
    output_dir: PathBuf,
}

impl DiskOutlet {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }
}

impl Outlet for DiskOutlet {
    async fn save(&self, topic: &str, report: &WorkflowReport) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .context(format!("Failed to create output dir: {:?}", self.output_dir))?;

        let path = self.output_dir.join(REPORT_FILE);
        tokio::fs::write(&path, render_report(topic, report))
            .await
            .context(format!("Failed to write report: {:?}", path))?;

        println!("💾 已保存报告: {}", path.display());
        Ok(path)
    }
}

/// 将编辑输出拆分为编号的多个版本，没有编号列表时整体作为一个版本
pub fn split_variations(text: &str) -> Vec<String> {
    let starts: Vec<(usize, usize)> = NUMBERED_ITEM
        .find_iter(text)
        .map(|m| (m.start(), m.end()))
        .collect();

    if starts.is_empty() {
        let trimmed = text.trim();
        return if trimmed.is_empty() {
            vec![]
        } else {
            vec![trimmed.to_string()]
        };
    }

    starts
        .iter()
        .enumerate()
        .map(|(i, (_, body_start))| {
            let end = starts.get(i + 1).map(|(next, _)| *next).unwrap_or(text.len());
            text[*body_start..end].trim().to_string()
        })
        .filter(|variation| !variation.is_empty())
        .collect()
}

/// 生成 Markdown 运行报告
pub fn render_report(topic: &str, report: &WorkflowReport) -> String {
    let result = &report.result;
    let mut markdown = String::from("# TweetCrafter Output\n\n");

    markdown.push_str(&format!("## Topic: {}\n\n", topic));

    markdown.push_str("## Original Tweet\n\n");
    markdown.push_str(result.content(StageKey::OriginalTweet).unwrap_or_default());
    markdown.push_str("\n\n");

    markdown.push_str("## Tweet Variations\n\n");
    let variations = split_variations(result.content(StageKey::FinalTweets).unwrap_or_default());
    for (i, variation) in variations.iter().enumerate() {
        markdown.push_str(&format!("### Variation {}\n\n{}\n\n", i + 1, variation));
    }

    let usage = &report.usage_metrics;
    markdown.push_str("## Usage Metrics\n\n");
    markdown.push_str(&format!("- Total Tokens: {}\n", usage.total_tokens));
    markdown.push_str(&format!("- Prompt Tokens: {}\n", usage.prompt_tokens));
    markdown.push_str(&format!("- Completion Tokens: {}\n", usage.completion_tokens));
    markdown.push_str(&format!(
        "- Successful Requests: {}\n\n",
        usage.successful_requests
    ));

    markdown.push_str("## Stage Status\n\n");
    for (key, output) in result.iter() {
        match &output.error {
            Some(error) if !output.is_success() => {
                markdown.push_str(&format!("- {}: {} ({})\n", key, output.status, error))
            }
            _ => markdown.push_str(&format!("- {}: {}\n", key, output.status)),
        }
    }

    markdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::persona::PersonaKind;
    use crate::generator::types::{StageOutput, UsageEstimate, UsageMetrics};
    use crate::generator::workflow::WorkflowResult;
    use tempfile::TempDir;

    fn sample_report() -> WorkflowReport {
        let mut result = WorkflowResult::new();
        result
            .record(StageKey::ScrapedContent, StageOutput::success("scraped"))
            .unwrap();
        result
            .record(
                StageKey::ResearchReport,
                StageOutput::degraded("placeholder research", "backend returned status 500"),
            )
            .unwrap();
        result
            .record(StageKey::OriginalTweet, StageOutput::success("Original tweet #AI"))
            .unwrap();
        result
            .record(
                StageKey::FinalTweets,
                StageOutput::success(PersonaKind::Editor.placeholder()),
            )
            .unwrap();

        let mut usage_metrics = UsageMetrics::default();
        usage_metrics.record(UsageEstimate::RESEARCHER);
        WorkflowReport {
            result,
            usage_metrics,
        }
    }

    #[test]
    fn test_split_numbered_variations() {
        let variations = split_variations("Tweet Variations:\n\n1. first one\n\n2) second one\n3. third\n");
        assert_eq!(variations, vec!["first one", "second one", "third"]);
    }

    #[test]
    fn test_split_without_numbering_keeps_whole_text() {
        assert_eq!(split_variations("  just one tweet  "), vec!["just one tweet"]);
        assert!(split_variations("   ").is_empty());
    }

    #[test]
    fn test_split_ignores_inline_numbers() {
        let variations = split_variations("Phi 3. is out and 2. things changed");
        assert_eq!(variations.len(), 1);
    }

    #[test]
    fn test_render_report_sections() {
        let markdown = render_report("Phi-3", &sample_report());

        assert!(markdown.starts_with("# TweetCrafter Output\n\n## Topic: Phi-3\n"));
        assert!(markdown.contains("## Original Tweet\n\nOriginal tweet #AI\n"));
        assert!(markdown.contains("### Variation 3\n"));
        assert!(!markdown.contains("### Variation 4"));
        assert!(markdown.contains("- Total Tokens: 1000\n"));
        assert!(markdown.contains("- Successful Requests: 1\n"));
        assert!(markdown.contains("- scraped_content: success\n"));
        assert!(markdown
            .contains("- research_report: degraded (backend returned status 500)\n"));
    }

    #[tokio::test]
    async fn test_disk_outlet_overwrites_report() {
        let temp_dir = TempDir::new().unwrap();
        let outlet = DiskOutlet::new(temp_dir.path().join("output"));

        outlet.save("first", &sample_report()).await.unwrap();
        let path = outlet.save("second", &sample_report()).await.unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("## Topic: second"));
        assert!(!content.contains("## Topic: first"));
    }
}
