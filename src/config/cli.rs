use crate::adapters::hibp::{DEFAULT_API_BASE_URL, DEFAULT_USER_AGENT};
use crate::config::{
    seconds, DEFAULT_HOURLY_LIMIT, DEFAULT_REQUEST_DELAY_SECS, DEFAULT_THROTTLE_COOLDOWN_SECS,
    DEFAULT_TIMEOUT_SECS,
};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_path, validate_positive_number, validate_range, validate_url, Validate,
};
use clap::Parser;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "breach-check", version)]
#[command(about = "Check email addresses against known data breaches (Have I Been Pwned)")]
#[command(after_help = "Examples:
  breach-check -f emails.txt -o results.json
  breach-check -e user@example.com -o results.csv
  breach-check --file emails.csv --output results.txt --hourly-limit 50
  breach-check -f emails.txt -o results.json --request-delay 2.0")]
pub struct CliConfig {
    /// Input file containing email addresses (txt, csv, json)
    #[arg(short, long)]
    pub file: Option<String>,

    /// Single email address to check
    #[arg(short, long, conflicts_with = "file")]
    pub email: Option<String>,

    /// Output file for results (txt, csv, json)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Have I Been Pwned API key
    #[arg(long, env = "HIBP_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "HIBP_API_BASE_URL", default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    /// Maximum requests per rolling hour
    #[arg(long, env = "HIBP_HOURLY_LIMIT", default_value_t = DEFAULT_HOURLY_LIMIT)]
    pub hourly_limit: usize,

    /// Delay between requests in seconds
    #[arg(long, env = "HIBP_REQUEST_DELAY", default_value_t = DEFAULT_REQUEST_DELAY_SECS)]
    pub request_delay: f64,

    /// Wait in seconds before retrying a throttled (HTTP 429) request
    #[arg(long, default_value_t = DEFAULT_THROTTLE_COOLDOWN_SECS)]
    pub throttle_cooldown: f64,

    /// Give up on an email after this many throttled retries (default: retry forever)
    #[arg(long)]
    pub max_throttle_retries: Option<u32>,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// TOML file with api / rate_limit / output settings
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,

    /// Also append logs to this file
    #[arg(long, env = "HIBP_LOG_FILE")]
    pub log_file: Option<String>,
}

impl ConfigProvider for CliConfig {
    fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    fn user_agent(&self) -> &str {
        DEFAULT_USER_AGENT
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    fn hourly_limit(&self) -> usize {
        self.hourly_limit
    }

    fn request_delay(&self) -> Duration {
        seconds(self.request_delay)
    }

    fn throttle_cooldown(&self) -> Duration {
        seconds(self.throttle_cooldown)
    }

    fn max_throttle_retries(&self) -> Option<u32> {
        self.max_throttle_retries
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_url("api_base_url", &self.api_base_url)?;
        validate_positive_number("hourly_limit", self.hourly_limit, 1)?;
        validate_range("request_delay", self.request_delay, 0.0, 3600.0)?;
        validate_range("throttle_cooldown", self.throttle_cooldown, 0.0, 3600.0)?;
        validate_range("timeout", self.timeout, 1, 600)?;

        if let Some(file) = &self.file {
            validate_path("file", file)?;
        }
        if let Some(output) = &self.output {
            validate_path("output", output)?;
        }
        if let Some(log_file) = &self.log_file {
            validate_path("log_file", log_file)?;
        }
        Ok(())
    }
}
