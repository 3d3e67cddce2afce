//! 智能体交互日志，每个角色一个 JSON Lines 文件

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogEvent {
    AgentAction,
    AgentOutput,
    AgentFallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LogPayload {
    Exchange { prompt: String, response: String },
    Output { output: String },
}

/// 单条日志记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub agent: String,
    pub event: LogEvent,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub payload: LogPayload,
}

impl LogRecord {
    fn new(agent: &str, event: LogEvent, payload: LogPayload) -> Self {
        Self {
            agent: agent.to_string(),
            event,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// 一次完整的提示词与响应
    pub fn exchange(agent: &str, prompt: &str, response: &str) -> Self {
        Self::new(
            agent,
            LogEvent::AgentAction,
            LogPayload::Exchange {
                prompt: prompt.to_string(),
                response: response.to_string(),
            },
        )
    }

    pub fn output(agent: &str, output: &str) -> Self {
        Self::new(
            agent,
            LogEvent::AgentOutput,
            LogPayload::Output {
                output: output.to_string(),
            },
        )
    }

    /// 后端失败、使用占位文本时的记录
    pub fn fallback(agent: &str, error: &str) -> Self {
        Self::new(
            agent,
            LogEvent::AgentFallback,
            LogPayload::Output {
                output: error.to_string(),
            },
        )
    }
}

/// 追加写入的日志文件
#[derive(Debug, Clone)]
pub struct AgentJournal {
    path: PathBuf,
}

impl AgentJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 追加一条记录，必要时创建父目录
    pub async fn append(&self, record: &LogRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context(format!("Failed to create log dir: {:?}", parent))?;
        }

        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .context(format!("Failed to open journal: {:?}", self.path))?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tempfile::TempDir;

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_append_writes_one_line_per_record() {
        let temp_dir = TempDir::new().unwrap();
        let journal = AgentJournal::new(temp_dir.path().join("agents/writer.jsonl"));

        journal
            .append(&LogRecord::exchange("writer", "prompt text", "response text"))
            .await
            .unwrap();
        journal
            .append(&LogRecord::fallback("writer", "backend returned status 500"))
            .await
            .unwrap();

        let lines = read_lines(journal.path());
        assert_eq!(lines.len(), 2);

        assert_eq!(lines[0]["agent"], "writer");
        assert_eq!(lines[0]["event"], "agent_action");
        assert_eq!(lines[0]["prompt"], "prompt text");
        assert_eq!(lines[0]["response"], "response text");
        assert!(lines[0]["timestamp"].is_string());

        assert_eq!(lines[1]["event"], "agent_fallback");
        assert_eq!(lines[1]["output"], "backend returned status 500");
        assert!(lines[1].get("prompt").is_none());
    }

    #[test]
    fn test_record_round_trip_keeps_payload_shape() {
        let record = LogRecord::output("scraper", "done");
        let json = serde_json::to_string(&record).unwrap();
        let parsed: LogRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }
}
