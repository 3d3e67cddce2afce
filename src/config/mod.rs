use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "tweetcrafter.toml";

/// 环境变量名
pub struct EnvKeys;

impl EnvKeys {
    pub const APP_HOME: &'static str = "APP_HOME";
    pub const FAST_API_KEY: &'static str = "GROQ_API_KEY";
    pub const DEEP_API_KEY: &'static str = "SAMBANOVA_API_KEY";
    pub const SEARCH_API_KEY: &'static str = "FIRECRAWL_API_KEY";
}

/// 后端Provider类型
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub enum BackendProvider {
    /// 通过HTTP调用completions接口
    #[serde(rename = "http")]
    #[default]
    Http,
    /// 离线模拟后端，不发起任何网络请求
    #[serde(rename = "simulated")]
    Simulated,
}

impl std::fmt::Display for BackendProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendProvider::Http => write!(f, "http"),
            BackendProvider::Simulated => write!(f, "simulated"),
        }
    }
}

impl std::str::FromStr for BackendProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "http" => Ok(BackendProvider::Http),
            "simulated" | "mock" => Ok(BackendProvider::Simulated),
            _ => Err(format!("Unknown backend provider: {}", s)),
        }
    }
}

/// 应用程序配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct Config {
    /// 应用根目录，data/output/logs 均位于其下
    pub app_home: PathBuf,

    /// 输出目录，未设置时使用 {app_home}/output
    pub output_dir: Option<PathBuf>,

    /// 高能效模型后端，承担常规推理、初稿与压缩
    pub fast: BackendConfig,

    /// 高质量模型后端，承担复杂推理与润色升级
    #[serde(deserialize_with = "deserialize_deep")]
    pub deep: BackendConfig,

    /// 网络搜索配置
    pub search: SearchConfig,

    /// 是否启用详细日志
    pub verbose: bool,
}

/// 模型后端配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct BackendConfig {
    /// 后端Provider类型
    pub provider: BackendProvider,

    /// API KEY
    pub api_key: String,

    /// completions接口地址
    pub api_url: String,

    /// 模型名称
    pub model: String,

    /// 最大tokens
    pub max_tokens: u32,

    /// 默认温度，调用方未指定温度时使用
    pub temperature: f64,

    /// 超时时间（秒）
    pub timeout_seconds: u64,
}

/// 网络搜索配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    /// API KEY
    pub api_key: String,

    /// 搜索接口地址
    pub api_url: String,

    /// 默认返回条数
    pub default_limit: usize,

    /// 超时时间（秒）
    pub timeout_seconds: u64,
}

impl Config {
    /// 从文件加载配置
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut file =
            File::open(path).context(format!("Failed to open config file: {:?}", path))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// 加载配置：显式路径 > 当前目录下的默认配置文件 > 默认值，最后叠加环境变量
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = match explicit_path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_config_path = std::env::current_dir()
                    .unwrap_or_else(|_| PathBuf::from("."))
                    .join(DEFAULT_CONFIG_FILE);

                if default_config_path.exists() {
                    Self::from_file(&default_config_path)?
                } else {
                    Config::default()
                }
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// 使用环境变量覆盖路径与API KEY
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// 使用给定的变量查找函数覆盖配置，空值视为未设置
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(app_home) = lookup(EnvKeys::APP_HOME) {
            self.app_home = PathBuf::from(app_home);
        }
        if let Some(api_key) = lookup(EnvKeys::FAST_API_KEY) {
            self.fast.api_key = api_key;
        }
        if let Some(api_key) = lookup(EnvKeys::DEEP_API_KEY) {
            self.deep.api_key = api_key;
        }
        if let Some(api_key) = lookup(EnvKeys::SEARCH_API_KEY) {
            self.search.api_key = api_key;
        }
    }

    /// 列出缺失的API KEY对应的环境变量名，模拟后端不需要KEY
    pub fn missing_api_keys(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.fast.provider == BackendProvider::Http && self.fast.api_key.is_empty() {
            missing.push(EnvKeys::FAST_API_KEY);
        }
        if self.deep.provider == BackendProvider::Http && self.deep.api_key.is_empty() {
            missing.push(EnvKeys::DEEP_API_KEY);
        }
        if self.search.api_key.is_empty() {
            missing.push(EnvKeys::SEARCH_API_KEY);
        }
        missing
    }

    /// 风格参考推文所在目录
    pub fn data_dir(&self) -> PathBuf {
        self.app_home.join("data")
    }

    /// 输出目录
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| self.app_home.join("output"))
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.app_home.join("logs")
    }

    /// 各智能体日志目录
    pub fn agent_logs_dir(&self) -> PathBuf {
        self.logs_dir().join("agents")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_home: PathBuf::from("."),
            output_dir: None,
            fast: BackendConfig::default(),
            deep: BackendConfig::deep(),
            search: SearchConfig::default(),
            verbose: false,
        }
    }
}

impl BackendConfig {
    /// 高质量后端的默认配置，默认使用模拟后端
    pub fn deep() -> Self {
        Self {
            provider: BackendProvider::Simulated,
            api_key: String::new(),
            api_url: String::from("https://api.sambanova.ai/v1/completions"),
            model: String::from("deepseek-r1-671b"),
            max_tokens: 1024,
            temperature: 0.0,
            timeout_seconds: 300,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: BackendProvider::Http,
            api_key: String::new(),
            api_url: String::from("https://api.groq.com/openai/v1/completions"),
            model: String::from("llama3-8b-tool-use"),
            max_tokens: 1024,
            temperature: 0.5,
            timeout_seconds: 120,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: String::from("https://api.firecrawl.dev/search"),
            default_limit: 5,
            timeout_seconds: 60,
        }
    }
}

/// 配置文件中的后端表，缺省字段沿用该角色的默认值
#[derive(Deserialize)]
struct BackendSection {
    provider: Option<BackendProvider>,
    api_key: Option<String>,
    api_url: Option<String>,
    model: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f64>,
    timeout_seconds: Option<u64>,
}

impl BackendSection {
    fn merge_into(self, base: BackendConfig) -> BackendConfig {
        BackendConfig {
            provider: self.provider.unwrap_or(base.provider),
            api_key: self.api_key.unwrap_or(base.api_key),
            api_url: self.api_url.unwrap_or(base.api_url),
            model: self.model.unwrap_or(base.model),
            max_tokens: self.max_tokens.unwrap_or(base.max_tokens),
            temperature: self.temperature.unwrap_or(base.temperature),
            timeout_seconds: self.timeout_seconds.unwrap_or(base.timeout_seconds),
        }
    }
}

fn deserialize_deep<'de, D>(deserializer: D) -> Result<BackendConfig, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(BackendSection::deserialize(deserializer)?.merge_into(BackendConfig::deep()))
}

// Include tests
#[cfg(test)]
mod tests;
