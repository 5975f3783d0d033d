//! Configuration management for the campaign agent.
//!
//! Configuration is read from environment variables (a `.env` file in the
//! working directory is loaded first when present):
//! - `LLM_API_KEY` - Required (falls back to `OPENROUTER_API_KEY`). LLM credential.
//! - `LLM_MODEL` - Optional. Model identifier. Defaults to `google/gemini-2.5-pro`.
//! - `LLM_TEMPERATURE` - Optional. Sampling temperature. Defaults to `0.7`.
//! - `LLM_BASE_URL` - Optional. OpenAI-compatible API base. Defaults to OpenRouter.
//! - `MCP_SERVER_URL` - Optional. Tool server endpoint. Defaults to `http://localhost:8000/mcp`.
//! - `MAX_ITERATIONS` - Optional. Maximum LLM round trips per campaign. Defaults to `50`.
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `8001`.
//! - `CAMPAIGNS_PATH` - Optional. Campaign store file. Defaults to `data/campaigns.json`.
//! - `CORS_ALLOW_ORIGINS` - Optional. Comma-separated origins. Defaults to `http://localhost:5173`.
//!
//! The tool server reads its own, credential-free configuration via
//! [`ToolServerConfig::from_env`] (`TOOLS_HOST`, `TOOLS_PORT`).

use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "google/gemini-2.5-pro";
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MCP_SERVER_URL: &str = "http://localhost:8000/mcp";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// LLM provider settings.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// API credential
    pub api_key: String,

    /// Model identifier (OpenRouter format)
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Base URL of the OpenAI-compatible API
    pub base_url: String,
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmConfig,

    /// Tool server endpoint
    pub mcp_server_url: String,

    /// Maximum LLM round trips per campaign
    pub max_iterations: usize,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// File backing the campaign store
    pub campaigns_path: PathBuf,

    /// Allowed CORS origins (empty means any origin)
    pub cors_allow_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if no LLM credential is set.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_dotenv();

        let api_key = resolve_api_key(
            std::env::var("LLM_API_KEY").ok(),
            std::env::var("OPENROUTER_API_KEY").ok(),
        )?;

        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let temperature = std::env::var("LLM_TEMPERATURE")
            .ok()
            .map(|v| parse_temperature(&v))
            .transpose()?
            .unwrap_or(0.7);

        let base_url =
            std::env::var("LLM_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let mcp_server_url = std::env::var("MCP_SERVER_URL")
            .unwrap_or_else(|_| DEFAULT_MCP_SERVER_URL.to_string());

        let max_iterations = std::env::var("MAX_ITERATIONS")
            .unwrap_or_else(|_| "50".to_string())
            .parse::<usize>()
            .map_err(|e| ConfigError::InvalidValue("MAX_ITERATIONS".to_string(), e.to_string()))?;
        if max_iterations == 0 {
            return Err(ConfigError::InvalidValue(
                "MAX_ITERATIONS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8001".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), format!("{}", e)))?;

        let campaigns_path = std::env::var("CAMPAIGNS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data/campaigns.json"));

        let cors_allow_origins = parse_origins(
            &std::env::var("CORS_ALLOW_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
        );

        Ok(Self {
            llm: LlmConfig {
                api_key,
                model,
                temperature,
                base_url,
            },
            mcp_server_url,
            max_iterations,
            host,
            port,
            campaigns_path,
            cors_allow_origins,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            llm: LlmConfig {
                api_key,
                model,
                temperature: 0.7,
                base_url: DEFAULT_BASE_URL.to_string(),
            },
            mcp_server_url: DEFAULT_MCP_SERVER_URL.to_string(),
            max_iterations: 50,
            host: "127.0.0.1".to_string(),
            port: 8001,
            campaigns_path: PathBuf::from("data/campaigns.json"),
            cors_allow_origins: Vec::new(),
        }
    }
}

/// Tool server configuration. Needs no LLM credential.
#[derive(Debug, Clone)]
pub struct ToolServerConfig {
    pub host: String,
    pub port: u16,
}

impl ToolServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        load_dotenv();

        let host = std::env::var("TOOLS_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("TOOLS_PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("TOOLS_PORT".to_string(), format!("{}", e)))?;

        Ok(Self { host, port })
    }
}

fn load_dotenv() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            tracing::warn!("Ignoring unreadable .env file: {}", e);
        }
    }
}

fn parse_temperature(value: &str) -> Result<f32, ConfigError> {
    let temperature = value
        .trim()
        .parse::<f32>()
        .map_err(|e| ConfigError::InvalidValue("LLM_TEMPERATURE".to_string(), e.to_string()))?;
    if !(0.0..=2.0).contains(&temperature) {
        return Err(ConfigError::InvalidValue(
            "LLM_TEMPERATURE".to_string(),
            format!("expected a value between 0.0 and 2.0, got: {}", temperature),
        ));
    }
    Ok(temperature)
}

/// First non-blank credential, `LLM_API_KEY` taking precedence over `OPENROUTER_API_KEY`.
fn resolve_api_key(
    llm_api_key: Option<String>,
    openrouter_api_key: Option<String>,
) -> Result<String, ConfigError> {
    llm_api_key
        .into_iter()
        .chain(openrouter_api_key)
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar("LLM_API_KEY".to_string()))
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_must_be_in_range() {
        assert_eq!(parse_temperature("0.7").unwrap(), 0.7);
        assert!(parse_temperature("3.5").is_err());
        assert!(parse_temperature("warm").is_err());
    }

    #[test]
    fn missing_credential_is_fatal() {
        assert!(matches!(
            resolve_api_key(None, None),
            Err(ConfigError::MissingEnvVar(ref var)) if var == "LLM_API_KEY"
        ));
        assert!(matches!(
            resolve_api_key(Some("   ".to_string()), None),
            Err(ConfigError::MissingEnvVar(_))
        ));
    }

    #[test]
    fn openrouter_key_is_the_fallback_credential() {
        assert_eq!(
            resolve_api_key(None, Some("sk-or-123".to_string())).unwrap(),
            "sk-or-123"
        );
        assert_eq!(
            resolve_api_key(Some(String::new()), Some("sk-or-123".to_string())).unwrap(),
            "sk-or-123"
        );
        assert_eq!(
            resolve_api_key(Some("sk-llm".to_string()), Some("sk-or-123".to_string())).unwrap(),
            "sk-llm"
        );
    }

    #[test]
    fn origins_are_trimmed_and_blank_entries_dropped() {
        assert_eq!(
            parse_origins(" http://a.test , ,http://b.test"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert!(parse_origins(" , ").is_empty());
    }
}
