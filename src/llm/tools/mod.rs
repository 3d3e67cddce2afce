//! 智能体可调用的工具

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Config;

pub mod search;
pub mod tweets;

pub use search::WebSearch;
pub use tweets::TweetStore;

/// 工具名称枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// 网络搜索，参数 `query`、可选 `num_results`
    SearchWeb,
    /// 读取历史推文
    ReadTweets,
    /// 保存推文，参数 `text`
    SaveTweet,
}

impl Capability {
    pub const fn name(&self) -> &'static str {
        match self {
            Capability::SearchWeb => "search_web",
            Capability::ReadTweets => "read_tweets",
            Capability::SaveTweet => "save_tweet",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 工具集合，持有工具运行所需的客户端与路径
#[derive(Clone)]
pub struct Toolbox {
    search: WebSearch,
    tweets: TweetStore,
}

impl Toolbox {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            search: WebSearch::new(config.search.clone())?,
            tweets: TweetStore::new(config.data_dir(), config.output_dir()),
        })
    }

    pub fn tweets(&self) -> &TweetStore {
        &self.tweets
    }

    /// 调用指定工具
    pub async fn invoke(&self, capability: Capability, args: &Value) -> Result<String> {
        tracing::debug!(tool = %capability, "tool called");

        match capability {
            Capability::SearchWeb => {
                let query = string_arg(args, "query")?;
                let limit = args
                    .get("num_results")
                    .and_then(Value::as_u64)
                    .map(|n| n as usize)
                    .unwrap_or_else(|| self.search.default_limit());
                Ok(self.search.search(query, limit).await)
            }
            Capability::ReadTweets => self.tweets.read_tweets().await,
            Capability::SaveTweet => {
                let text = string_arg(args, "text")?;
                let path = self.tweets.save_tweet(text).await?;
                Ok(path.display().to_string())
            }
        }
    }
}

fn string_arg<'a>(args: &'a Value, key: &str) -> Result<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("missing string argument `{}`", key))
}
