//! Environment-driven configuration

use std::time::Duration;

const DEFAULT_DATABASE_URL: &str = "sqlite:zenbrain.db?mode=rwc";
const DEFAULT_LLM_MODEL: &str = "llama-3.1-8b-instant";
const DEFAULT_LLM_ENDPOINT: &str = "https://api.groq.com/openai/v1";
const DEFAULT_LLM_TIMEOUT_MS: u64 = 60_000;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Language model connection settings
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_endpoint: String,
    pub timeout: Duration,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_LLM_MODEL.to_string(),
            api_endpoint: DEFAULT_LLM_ENDPOINT.to_string(),
            timeout: Duration::from_millis(DEFAULT_LLM_TIMEOUT_MS),
            temperature: 0.7,
        }
    }
}

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Hour of day (0-23) at which a new study day begins
    pub daily_reset_hour: u32,
    pub fetch_timeout: Duration,
    /// bcrypt work factor for new password hashes
    pub bcrypt_cost: u32,
    pub llm: LlmConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            host: "0.0.0.0".to_string(),
            port: 3000,
            daily_reset_hour: 0,
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            llm: LlmConfig::default(),
        }
    }
}

impl Config {
    /// Read configuration from the process environment, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let llm = LlmConfig {
            api_key: env_string("GROQ_API_KEY").or_else(|| env_string("LLM_API_KEY")),
            model: env_string("LLM_MODEL").unwrap_or(defaults.llm.model),
            api_endpoint: env_string("LLM_API_ENDPOINT").unwrap_or(defaults.llm.api_endpoint),
            timeout: env_parse("LLM_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.llm.timeout),
            temperature: env_parse("LLM_TEMPERATURE").unwrap_or(defaults.llm.temperature),
        };

        Self {
            database_url: env_string("DATABASE_URL").unwrap_or(defaults.database_url),
            host: env_string("HOST").unwrap_or(defaults.host),
            port: env_parse("PORT").unwrap_or(defaults.port),
            daily_reset_hour: env_parse::<u32>("DAILY_RESET_HOUR")
                .filter(|h| *h < 24)
                .unwrap_or(defaults.daily_reset_hour),
            fetch_timeout: env_parse("FETCH_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.fetch_timeout),
            bcrypt_cost: env_parse::<u32>("BCRYPT_COST")
                .filter(|c| (4..=31).contains(c))
                .unwrap_or(defaults.bcrypt_cost),
            llm,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_string(key)?.trim().parse().ok()
}
