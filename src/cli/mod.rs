use crate::config::{BackendProvider, Config};
use crate::generator::workflow::WorkflowInputs;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

/// TweetCrafter - 抓取、研究、撰写并编辑技术推文的多智能体流水线
#[derive(Parser, Debug)]
#[command(name = "tweetcrafter")]
#[command(
    about = "Multi-agent pipeline that scrapes web pages, researches a topic and drafts tweet variations with hybrid model routing."
)]
#[command(version)]
pub struct Args {
    /// 推文主题
    #[arg(short, long)]
    pub topic: String,

    /// 待抓取的页面地址，可重复指定
    #[arg(short, long = "url")]
    pub urls: Vec<String>,

    /// 给编辑的修改建议
    #[arg(short, long, default_value = "")]
    pub suggestion: String,

    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 数据、输出与日志的根目录
    #[arg(long)]
    pub app_home: Option<PathBuf>,

    /// 高能效模型
    #[arg(long)]
    pub fast_model: Option<String>,

    /// 高质量模型
    #[arg(long)]
    pub deep_model: Option<String>,

    /// 高能效模型后端 (http, simulated)
    #[arg(long)]
    pub fast_provider: Option<String>,

    /// 高质量模型后端 (http, simulated)
    #[arg(long)]
    pub deep_provider: Option<String>,

    /// 不保存 tweet.md 与 report.md
    #[arg(long)]
    pub no_save: bool,

    /// 是否启用详细日志
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// 加载配置文件并叠加CLI参数
    pub fn build_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;
        self.apply_to(&mut config);
        Ok(config)
    }

    /// CLI参数优先级最高
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(app_home) = &self.app_home {
            config.app_home = app_home.clone();
        }
        if let Some(model) = &self.fast_model {
            config.fast.model = model.clone();
        }
        if let Some(model) = &self.deep_model {
            config.deep.model = model.clone();
        }
        if let Some(provider) = parse_provider(self.fast_provider.as_deref()) {
            config.fast.provider = provider;
        }
        if let Some(provider) = parse_provider(self.deep_provider.as_deref()) {
            config.deep.provider = provider;
        }
        config.verbose = config.verbose || self.verbose;
    }

    pub fn inputs(&self) -> WorkflowInputs {
        WorkflowInputs {
            topic: self.topic.clone(),
            urls: self.urls.clone(),
            suggestion: self.suggestion.clone(),
        }
    }
}

fn parse_provider(value: Option<&str>) -> Option<BackendProvider> {
    let value = value?;
    match value.parse::<BackendProvider>() {
        Ok(provider) => Some(provider),
        Err(_) => {
            eprintln!("⚠️ 警告: 未知的provider: {}，使用配置中的provider", value);
            None
        }
    }
}
