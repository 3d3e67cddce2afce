//! 推文读写工具

use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::fs;

/// 风格参考文件名
pub const TWEETS_FILE: &str = "tweets.md";

/// 输出文件名
pub const TWEET_OUTPUT_FILE: &str = "tweet.md";

/// 推文存取：读取风格参考、保存最终推文
#[derive(Debug, Clone)]
pub struct TweetStore {
    data_dir: PathBuf,
    output_dir: PathBuf,
}

impl TweetStore {
    pub fn new(data_dir: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            data_dir,
            output_dir,
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(TWEET_OUTPUT_FILE)
    }

    /// 原样读取历史推文，作为写作风格参考
    pub async fn read_tweets(&self) -> Result<String> {
        let path = self.data_dir.join(TWEETS_FILE);
        fs::read_to_string(&path)
            .await
            .context(format!("Failed to read tweets file: {:?}", path))
    }

    /// 保存推文文本，覆盖已有内容
    pub async fn save_tweet(&self, text: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)
            .await
            .context(format!("Failed to create output dir: {:?}", self.output_dir))?;

        let path = self.output_path();
        fs::write(&path, text)
            .await
            .context(format!("Failed to write tweet file: {:?}", path))?;
        Ok(path)
    }
}
