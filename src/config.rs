use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};

/// 抽取服务的默认地址 (未配置 EXTRACTOR_URL 时使用)
pub const DEFAULT_EXTRACTOR_URL: &str =
    "https://ys4lryv53qrop5qj7ewtzcgng40twztf.lambda-url.us-east-1.on.aws/";

/// 可选配置文件名 (invoice-desk.toml / .yaml / .json)
const CONFIG_FILE: &str = "invoice-desk";

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub extractor: ExtractorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    pub url: String,
    /// 请求超时秒数; 不配置则不设超时
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            extractor: ExtractorConfig {
                url: DEFAULT_EXTRACTOR_URL.to_string(),
                timeout_secs: None,
            },
        }
    }
}

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(|key| std::env::var(key).ok())
    }

    /// 默认值 -> 配置文件 -> 环境变量, 后者覆盖前者
    pub fn load<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("extractor.url", defaults.extractor.url)?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .set_override_option("server.host", lookup("SERVER_HOST"))?
            .set_override_option("server.port", lookup("SERVER_PORT"))?
            .set_override_option("extractor.url", non_empty(lookup("EXTRACTOR_URL")))?
            .set_override_option("extractor.timeout_secs", lookup("EXTRACTOR_TIMEOUT_SECS"))?
            .build()?
            .try_deserialize()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
