use std::str::FromStr;
use std::time::Duration;

use copydesk_pipeline::gemini::{DEFAULT_API_BASE, DEFAULT_MODEL};
use copydesk_pipeline::{ApiKey, GeminiConfig, PipelineConfig};

/// Log output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, multi-field lines.
    Pretty,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" | "" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// Settings for the content pipeline and its LLM provider.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Model id; the LiteLLM-style `gemini/` prefix is accepted.
    pub model: String,
    /// Gemini REST base URL.
    pub api_base: String,
    /// Upper bound on one generation, in seconds.
    pub timeout_secs: u64,
    /// Run the legal/ethics compliance stage after review.
    pub compliance_check: bool,
    pub temperature: f32,
    pub max_output_tokens: u32,
    /// Key used when a request does not carry its own.
    pub default_api_key: Option<ApiKey>,
}

impl PipelineSettings {
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            compliance_check: self.compliance_check,
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        }
    }

    pub fn gemini_config(&self) -> GeminiConfig {
        GeminiConfig {
            api_base: self.api_base.clone(),
            model: self.model.clone(),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: 240,
            compliance_check: false,
            temperature: 0.7,
            max_output_tokens: 2048,
            default_api_key: None,
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `300`). Must exceed the
    /// pipeline timeout or waiting creates get cut off.
    pub request_timeout_secs: u64,
    /// How long shutdown waits for running generations (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Directory holding the static frontend (default: `frontend`).
    pub static_dir: String,
    pub log_format: LogFormat,
    pub pipeline: PipelineSettings,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                                             |
    /// |-------------------------|-----------------------------------------------------|
    /// | `HOST`                  | `0.0.0.0`                                           |
    /// | `PORT`                  | `5000`                                              |
    /// | `CORS_ORIGINS`          | `http://localhost:5000,http://localhost:5173`       |
    /// | `REQUEST_TIMEOUT_SECS`  | `300`                                               |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                                                |
    /// | `STATIC_DIR`            | `frontend`                                          |
    /// | `LOG_FORMAT`            | `pretty`                                            |
    /// | `MODEL_ID`              | `gemini/gemini-2.0-flash`                           |
    /// | `GEMINI_API_BASE`       | `https://generativelanguage.googleapis.com/v1beta`  |
    /// | `PIPELINE_TIMEOUT_SECS` | `240`                                               |
    /// | `COMPLIANCE_CHECK`      | `false`                                             |
    /// | `LLM_TEMPERATURE`       | `0.7`                                               |
    /// | `LLM_MAX_OUTPUT_TOKENS` | `2048`                                              |
    /// | `DEFAULT_API_KEY`       | unset                                               |
    ///
    /// Panics on unparseable values so misconfiguration fails at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = parse_env("PORT", "5000");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5000,http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = parse_env("REQUEST_TIMEOUT_SECS", "300");
        let shutdown_timeout_secs: u64 = parse_env("SHUTDOWN_TIMEOUT_SECS", "30");
        let static_dir = std::env::var("STATIC_DIR").unwrap_or_else(|_| "frontend".into());
        let log_format: LogFormat = parse_env("LOG_FORMAT", "pretty");

        let pipeline = PipelineSettings {
            model: std::env::var("MODEL_ID").unwrap_or_else(|_| DEFAULT_MODEL.into()),
            api_base: std::env::var("GEMINI_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.into()),
            timeout_secs: parse_env("PIPELINE_TIMEOUT_SECS", "240"),
            compliance_check: parse_env("COMPLIANCE_CHECK", "false"),
            temperature: parse_env("LLM_TEMPERATURE", "0.7"),
            max_output_tokens: parse_env("LLM_MAX_OUTPUT_TOKENS", "2048"),
            default_api_key: std::env::var("DEFAULT_API_KEY")
                .ok()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .map(ApiKey::new),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            static_dir,
            log_format,
            pipeline,
        }
    }
}

fn parse_env<T>(name: &str, default: &str) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(name).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse()
        .unwrap_or_else(|e| panic!("{name} must be a valid value (got '{raw}'): {e}"))
}
