//! 网络搜索工具

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{EnvKeys, SearchConfig};

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    limit: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: Option<String>,
    url: Option<String>,
    snippet: Option<String>,
}

/// 网络搜索客户端，所有失败都以文本形式返回给调用方
#[derive(Clone)]
pub struct WebSearch {
    config: SearchConfig,
    client: Client,
}

impl WebSearch {
    pub fn new(config: SearchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { config, client })
    }

    pub fn default_limit(&self) -> usize {
        self.config.default_limit
    }

    /// 搜索并格式化为编号列表
    pub async fn search(&self, query: &str, limit: usize) -> String {
        if self.config.api_key.is_empty() {
            return format!(
                "Error: {} not found in environment variables.",
                EnvKeys::SEARCH_API_KEY
            );
        }

        match self.fetch(query, limit).await {
            Ok(hits) => format_hits(&hits),
            Err(e) => {
                tracing::warn!(error = %e, "web search failed");
                format!("Error searching the web: {}", e)
            }
        }
    }

    async fn fetch(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&SearchRequest { query, limit })
            .send()
            .await?
            .error_for_status()?;

        let body: SearchResponse = response.json().await?;
        Ok(body.results)
    }
}

fn format_hits(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return "No results found.".to_string();
    }

    hits.iter()
        .enumerate()
        .map(|(i, hit)| {
            format!(
                "{}. {}\n   URL: {}\n   {}\n",
                i + 1,
                hit.title.as_deref().unwrap_or("No title"),
                hit.url.as_deref().unwrap_or("No URL"),
                hit.snippet.as_deref().unwrap_or("No snippet"),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
