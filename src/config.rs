use std::env;
use std::fmt;
use std::time::Duration;

use crate::error::{AltTextError, Result};

pub const OPENAI_API_URL: &str = "https://api.openai.com/v1/completions";
pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const ANTHROPIC_MODEL: &str = "claude-3-opus-20240229";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn env_string_or(var: &str, default: &str) -> String {
    env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_secret(var: &str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.trim().is_empty())
}

/// Which provider answers `/upload`. Chosen once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
}

impl ProviderKind {
    /// Exactly one of the two startup flags must be set.
    pub fn from_flags(openai: bool, anthropic: bool) -> Result<Self> {
        match (openai, anthropic) {
            (true, false) => Ok(ProviderKind::OpenAi),
            (false, true) => Ok(ProviderKind::Anthropic),
            (false, false) => Err(AltTextError::Config(
                "You must specify either --openai or --anthropic".to_string(),
            )),
            (true, true) => Err(AltTextError::Config(
                "--openai and --anthropic are mutually exclusive".to_string(),
            )),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::OpenAi => f.write_str("OpenAI"),
            ProviderKind::Anthropic => f.write_str("Anthropic"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub provider: ProviderKind,
    pub openai: ProviderConfig,
    pub anthropic: ProviderConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Endpoint, credential and timeout for one outbound API.
#[derive(Clone)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub max_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Config {
    /// Reads the process environment. Call after the env file has been loaded.
    pub fn from_env(provider: ProviderKind) -> Self {
        let timeout_secs = parse_env_or("PROVIDER_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS);

        Self {
            server: ServerConfig {
                host: env_string_or("HOST", "0.0.0.0"),
                port: parse_env_or("PORT", 8080),
            },
            provider,
            openai: ProviderConfig {
                api_key: env_secret("OPEN_AI_API_KEY"),
                api_url: env_string_or("OPENAI_API_URL", OPENAI_API_URL),
                model: env_string_or("OPENAI_MODEL", OPENAI_MODEL),
                timeout_secs,
            },
            anthropic: ProviderConfig {
                api_key: env_secret("ANTHROPIC_API_KEY"),
                api_url: env_string_or("ANTHROPIC_API_URL", ANTHROPIC_API_URL),
                model: env_string_or("ANTHROPIC_MODEL", ANTHROPIC_MODEL),
                timeout_secs,
            },
            upload: UploadConfig {
                max_bytes: parse_env_or("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
            },
        }
    }

    pub fn active_provider(&self) -> &ProviderConfig {
        match self.provider {
            ProviderKind::OpenAi => &self.openai,
            ProviderKind::Anthropic => &self.anthropic,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    const ENV_VARS: &[&str] = &[
        "HOST",
        "PORT",
        "MAX_UPLOAD_BYTES",
        "PROVIDER_TIMEOUT_SECS",
        "OPEN_AI_API_KEY",
        "OPENAI_API_URL",
        "OPENAI_MODEL",
        "ANTHROPIC_API_KEY",
        "ANTHROPIC_API_URL",
        "ANTHROPIC_MODEL",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_config_from_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var("PORT", "notaport");
        std::env::set_var("MAX_UPLOAD_BYTES", "1024");
        std::env::set_var("OPENAI_MODEL", "   ");
        std::env::set_var("OPEN_AI_API_KEY", "");
        std::env::set_var("ANTHROPIC_API_KEY", "sk-ant-test");
        std::env::set_var("PROVIDER_TIMEOUT_SECS", "7");

        let config = Config::from_env(ProviderKind::Anthropic);

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.upload.max_bytes, 1024);
        assert_eq!(config.openai.model, OPENAI_MODEL);
        assert!(config.openai.api_key.is_none());
        assert_eq!(config.anthropic.api_key.as_deref(), Some("sk-ant-test"));
        assert_eq!(config.anthropic.timeout_secs, 7);
        assert_eq!(config.active_provider().api_url, config.anthropic.api_url);

        clear_env();
    }

    #[test]
    fn test_config_defaults() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        let config = Config::from_env(ProviderKind::OpenAi);

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.upload.max_bytes, 5 * 1024 * 1024);
        assert_eq!(config.openai.api_url, OPENAI_API_URL);
        assert_eq!(config.anthropic.model, ANTHROPIC_MODEL);
        assert_eq!(config.openai.timeout_secs, 30);
    }

    #[test]
    fn test_provider_from_single_flag() {
        assert_eq!(
            ProviderKind::from_flags(true, false).unwrap(),
            ProviderKind::OpenAi
        );
        assert_eq!(
            ProviderKind::from_flags(false, true).unwrap(),
            ProviderKind::Anthropic
        );
    }

    #[test]
    fn test_provider_requires_exactly_one_flag() {
        assert!(matches!(
            ProviderKind::from_flags(false, false),
            Err(AltTextError::Config(_))
        ));
        assert!(matches!(
            ProviderKind::from_flags(true, true),
            Err(AltTextError::Config(_))
        ));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ProviderConfig {
            api_key: Some("sk-secret".to_string()),
            api_url: OPENAI_API_URL.to_string(),
            model: OPENAI_MODEL.to_string(),
            timeout_secs: 30,
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_default_upload_limit_is_five_megabytes() {
        assert_eq!(UploadConfig::default().max_bytes, 5 * 1024 * 1024);
    }
}
