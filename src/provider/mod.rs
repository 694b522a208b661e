pub mod anthropic;
pub mod media;
pub mod openai;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Bytes;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::{Config, ProviderConfig, ProviderKind};
use crate::error::{AltTextError, Result};

pub use anthropic::AnthropicProvider;
pub use openai::OpenAiProvider;

/// Token cap sent with every generation request.
pub const MAX_TOKENS: u32 = 100;

/// Turns a base64 encoded image into alt text using one vendor API.
#[async_trait]
pub trait AltTextProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate(&self, encoded_image: &str) -> Result<String>;
}

/// Build the adapter selected by `config.provider`.
pub fn build_provider(config: &Config) -> Result<Arc<dyn AltTextProvider>> {
    let provider: Arc<dyn AltTextProvider> = match config.provider {
        ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(&config.openai)?),
        ProviderKind::Anthropic => Arc::new(AnthropicProvider::new(&config.anthropic)?),
    };

    let active = config.active_provider();
    if active.api_key.is_none() {
        warn!(
            "{} API key is not set - every upload will fail until it is configured",
            provider.name()
        );
    }
    info!(
        provider = provider.name(),
        model = %active.model,
        url = %active.api_url,
        "Alt text provider initialized"
    );

    Ok(provider)
}

pub(crate) fn http_client(config: &ProviderConfig) -> Result<Client> {
    Client::builder()
        .timeout(config.timeout())
        .build()
        .map_err(AltTextError::Transport)
}

pub(crate) fn require_api_key<'a>(config: &'a ProviderConfig, var: &str) -> Result<&'a str> {
    config
        .api_key
        .as_deref()
        .ok_or_else(|| AltTextError::Config(format!("{var} is not set in environment variables")))
}

/// Send a prepared request and collect the raw reply.
pub(crate) async fn send(
    provider: &'static str,
    request: RequestBuilder,
    timeout: Duration,
) -> Result<(StatusCode, Bytes)> {
    debug!(provider, "Sending request");
    let response = request
        .send()
        .await
        .map_err(|e| transport_error(e, timeout))?;
    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| transport_error(e, timeout))?;
    debug!(provider, %status, bytes = body.len(), "Received response");
    Ok((status, body))
}

fn transport_error(err: reqwest::Error, timeout: Duration) -> AltTextError {
    if err.is_timeout() {
        AltTextError::Timeout(timeout)
    } else {
        AltTextError::Transport(err)
    }
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(flatten)]
    body: T,
    #[serde(default)]
    error: Option<ApiError>,
}

/// Parse a provider reply, surfacing its `error.message` envelope or a
/// non-success status as [`AltTextError::Provider`].
pub(crate) fn decode_reply<T: DeserializeOwned>(
    provider: &'static str,
    status: StatusCode,
    body: &[u8],
) -> Result<T> {
    let envelope: Envelope<T> = match serde_json::from_slice(body) {
        Ok(envelope) => envelope,
        Err(e) if status.is_success() => return Err(e.into()),
        Err(_) => {
            return Err(AltTextError::Provider(format!(
                "{provider} returned status {status}"
            )))
        }
    };

    if let Some(message) = envelope
        .error
        .map(|e| e.message)
        .filter(|m| !m.is_empty())
    {
        return Err(AltTextError::Provider(message));
    }
    if !status.is_success() {
        return Err(AltTextError::Provider(format!(
            "{provider} returned status {status}"
        )));
    }

    Ok(envelope.body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Reply {
        #[serde(default)]
        items: Vec<String>,
    }

    #[test]
    fn test_decode_reply_success() {
        let reply: Reply = decode_reply("Test", StatusCode::OK, br#"{"items":["a","b"]}"#).unwrap();
        assert_eq!(reply.items, vec!["a", "b"]);
    }

    #[test]
    fn test_decode_reply_error_envelope() {
        let err = decode_reply::<Reply>(
            "Test",
            StatusCode::TOO_MANY_REQUESTS,
            br#"{"type":"error","error":{"type":"rate_limit_error","message":"slow down"}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, AltTextError::Provider(ref m) if m == "slow down"));
    }

    #[test]
    fn test_decode_reply_envelope_wins_even_on_200() {
        let err =
            decode_reply::<Reply>("Test", StatusCode::OK, br#"{"error":{"message":"bad key"}}"#)
                .unwrap_err();
        assert!(matches!(err, AltTextError::Provider(ref m) if m == "bad key"));
    }

    #[test]
    fn test_decode_reply_status_without_envelope() {
        let err = decode_reply::<Reply>("Test", StatusCode::BAD_GATEWAY, b"<html>oops</html>")
            .unwrap_err();
        assert!(matches!(err, AltTextError::Provider(ref m) if m.contains("502")));
    }

    #[test]
    fn test_decode_reply_malformed_json_on_success() {
        let err = decode_reply::<Reply>("Test", StatusCode::OK, b"not json").unwrap_err();
        assert!(matches!(err, AltTextError::Json(_)));
    }

    #[test]
    fn test_require_api_key() {
        let mut config = ProviderConfig {
            api_key: None,
            api_url: "http://localhost".to_string(),
            model: "m".to_string(),
            timeout_secs: 1,
        };
        assert!(matches!(
            require_api_key(&config, "OPEN_AI_API_KEY"),
            Err(AltTextError::Config(ref m)) if m.contains("OPEN_AI_API_KEY")
        ));

        config.api_key = Some("key".to_string());
        assert_eq!(require_api_key(&config, "OPEN_AI_API_KEY").unwrap(), "key");
    }
}
