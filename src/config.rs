use serde::Deserialize;
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the docdigest server.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Optional override for the HTTP server port (defaults to 8000).
    pub server_port: Option<u16>,
    /// Summarization backend used to generate abstractive summaries.
    pub summarizer_provider: SummarizerProvider,
    /// Model identifier passed to the summarization provider.
    pub summarizer_model: Option<String>,
    /// Optional base URL of the Ollama runtime.
    pub ollama_url: Option<String>,
    /// Directory holding the static UI assets.
    pub static_dir: String,
    /// Summary length applied when a request does not specify one.
    pub summary_default_length: usize,
}

/// Supported summarization backends.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarizerProvider {
    /// Deterministic extractive fallback requiring no external runtime.
    None,
    /// Local Ollama runtime.
    Ollama,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        let summarizer_provider = load_env_optional("SUMMARIZER_PROVIDER")
            .map(|value| {
                value
                    .parse()
                    .map_err(|()| ConfigError::InvalidValue("SUMMARIZER_PROVIDER".to_string()))
            })
            .transpose()?
            .unwrap_or(SummarizerProvider::None);
        let summarizer_model = load_env_optional("SUMMARIZER_MODEL");
        if matches!(summarizer_provider, SummarizerProvider::Ollama) && summarizer_model.is_none() {
            return Err(ConfigError::MissingVariable("SUMMARIZER_MODEL".to_string()));
        }

        Ok(Self {
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
            summarizer_provider,
            summarizer_model,
            ollama_url: load_env_optional("OLLAMA_URL"),
            static_dir: load_env_optional("STATIC_DIR").unwrap_or_else(|| "static".to_string()),
            summary_default_length: load_env_optional("SUMMARY_DEFAULT_LENGTH")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SUMMARY_DEFAULT_LENGTH".into()))
                })
                .transpose()?
                .unwrap_or(150),
        })
    }
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

impl std::str::FromStr for SummarizerProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "ollama" => Ok(Self::Ollama),
            _ => Err(()),
        }
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        server_port = ?config.server_port,
        summarizer_provider = ?config.summarizer_provider,
        summarizer_model = ?config.summarizer_model,
        static_dir = %config.static_dir,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}
