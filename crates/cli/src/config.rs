//! Command-line and environment configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use llm::DEFAULT_OPENAI_MODEL;
use newsroom::{CredentialChecker, ModelName, NewsdeskError};
use web::DEFAULT_CLICK_LOG_PATH;

/// Address the UI is served on when none is configured.
pub const DEFAULT_LISTEN: &str = "127.0.0.1:8501";

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

/// AI Journalist: researches, writes and edits news articles with an LLM
/// behind a login-protected web form.
#[derive(Parser)]
#[command(name = "newsdesk", version)]
pub struct Config {
    /// Username accepted by the login form.
    #[arg(long, env = "APP_USERNAME")]
    pub username: Option<String>,

    /// Password accepted by the login form.
    #[arg(long, env = "PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// OpenAI API key.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Chat model used by the writer and the editor.
    #[arg(long, env = "OPENAI_MODEL_NAME", default_value = DEFAULT_OPENAI_MODEL)]
    pub model: String,

    /// Base URL of an OpenAI-compatible API.
    #[arg(long, env = "OPENAI_BASE_URL")]
    pub openai_base_url: Option<String>,

    /// Address to serve the UI on.
    #[arg(long, env = "NEWSDESK_LISTEN", default_value = DEFAULT_LISTEN)]
    pub listen: SocketAddr,

    /// File that logout click counts are appended to.
    #[arg(long, env = "NEWSDESK_CLICK_LOG", default_value = DEFAULT_CLICK_LOG_PATH)]
    pub click_log: PathBuf,

    /// Log line format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// OTLP collector endpoint; traces are exported only when set.
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// The API key, which must be present and non-blank.
    pub fn api_key(&self) -> Result<&str, NewsdeskError> {
        self.openai_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| NewsdeskError::Configuration {
                message: "OPENAI_API_KEY is not set".to_string(),
            })
    }

    /// The configured model name.
    pub fn model_name(&self) -> Result<ModelName, NewsdeskError> {
        ModelName::new(self.model.as_str()).ok_or_else(|| NewsdeskError::Configuration {
            message: "the model name must not be empty".to_string(),
        })
    }

    /// Login credentials. Either half may be missing, in which case every
    /// login is rejected.
    pub fn credentials(&self) -> CredentialChecker {
        CredentialChecker::new(self.username.clone(), self.password.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("newsdesk").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn flags_override_defaults() {
        let config = parse(&[
            "--openai-api-key",
            "sk-test",
            "--username",
            "admin",
            "--password",
            "letmein",
            "--model",
            "gpt-4o-mini",
            "--listen",
            "0.0.0.0:9000",
            "--click-log",
            "/tmp/clicks.txt",
            "--log-format",
            "json",
        ]);
        assert_eq!(config.api_key().unwrap(), "sk-test");
        assert_eq!(config.model_name().unwrap().as_str(), "gpt-4o-mini");
        assert_eq!(config.listen, "0.0.0.0:9000".parse().unwrap());
        assert_eq!(config.click_log, PathBuf::from("/tmp/clicks.txt"));
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.credentials().check("admin", "letmein"));
    }

    #[test]
    fn blank_api_key_is_a_configuration_error() {
        let config = parse(&["--openai-api-key", "  "]);
        assert!(matches!(
            config.api_key(),
            Err(NewsdeskError::Configuration { .. })
        ));
    }

    #[test]
    fn blank_model_is_a_configuration_error() {
        let config = parse(&["--model", " "]);
        assert!(matches!(
            config.model_name(),
            Err(NewsdeskError::Configuration { .. })
        ));
    }

    #[test]
    fn malformed_listen_address_is_rejected() {
        assert!(Config::try_parse_from(["newsdesk", "--listen", "localhost"]).is_err());
    }
}
