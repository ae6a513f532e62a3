use crate::adapters::hibp::{DEFAULT_API_BASE_URL, DEFAULT_USER_AGENT};
use crate::config::{
    seconds, DEFAULT_HOURLY_LIMIT, DEFAULT_REQUEST_DELAY_SECS, DEFAULT_THROTTLE_COOLDOWN_SECS,
    DEFAULT_TIMEOUT_SECS,
};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{BreachError, Result};
use crate::utils::validation::{
    validate_path, validate_positive_number, validate_range, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var regex"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub user_agent: String,
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            api_key: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub hourly_limit: usize,
    pub request_delay_seconds: f64,
    pub throttle_cooldown_seconds: f64,
    pub max_throttle_retries: Option<u32>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            hourly_limit: DEFAULT_HOURLY_LIMIT,
            request_delay_seconds: DEFAULT_REQUEST_DELAY_SECS,
            throttle_cooldown_seconds: DEFAULT_THROTTLE_COOLDOWN_SECS,
            max_throttle_retries: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| BreachError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${HIBP_API_KEY})，找不到的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_PATTERN
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    pub fn output_path(&self) -> Option<&str> {
        self.output.path.as_deref()
    }
}

impl ConfigProvider for TomlConfig {
    fn api_base_url(&self) -> &str {
        &self.api.base_url
    }

    fn api_key(&self) -> Option<&str> {
        // 未替換的 ${VAR} 視為沒有設定
        self.api
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty() && !ENV_VAR_PATTERN.is_match(key))
    }

    fn user_agent(&self) -> &str {
        &self.api.user_agent
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_seconds)
    }

    fn hourly_limit(&self) -> usize {
        self.rate_limit.hourly_limit
    }

    fn request_delay(&self) -> Duration {
        seconds(self.rate_limit.request_delay_seconds)
    }

    fn throttle_cooldown(&self) -> Duration {
        seconds(self.rate_limit.throttle_cooldown_seconds)
    }

    fn max_throttle_retries(&self) -> Option<u32> {
        self.rate_limit.max_throttle_retries
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_url("api.base_url", &self.api.base_url)?;
        validate_range("api.timeout_seconds", self.api.timeout_seconds, 1, 600)?;
        validate_positive_number("rate_limit.hourly_limit", self.rate_limit.hourly_limit, 1)?;
        validate_range(
            "rate_limit.request_delay_seconds",
            self.rate_limit.request_delay_seconds,
            0.0,
            3600.0,
        )?;
        validate_range(
            "rate_limit.throttle_cooldown_seconds",
            self.rate_limit.throttle_cooldown_seconds,
            0.0,
            3600.0,
        )?;

        if let Some(path) = &self.output.path {
            validate_path("output.path", path)?;
        }
        Ok(())
    }
}
