use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::media::sniff_media_type;
use super::{decode_reply, http_client, require_api_key, send, AltTextProvider, MAX_TOKENS};
use crate::config::ProviderConfig;
use crate::error::{AltTextError, Result};

const NAME: &str = "Anthropic";
const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

const INSTRUCTION: &str = "Please generate a clear and concise alt text description for this image.";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ContentPart<'a> {
    Text { text: &'static str },
    Image { source: ImageSource<'a> },
}

#[derive(Debug, Serialize)]
struct ImageSource<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    media_type: &'static str,
    data: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

/// Decode the base64 payload back into raw image bytes.
pub fn decode_image(encoded_image: &str) -> Result<Vec<u8>> {
    Ok(STANDARD.decode(encoded_image)?)
}

#[derive(Clone, Debug)]
pub struct AnthropicProvider {
    client: Client,
    config: ProviderConfig,
}

impl AnthropicProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config)?,
            config: config.clone(),
        })
    }

    fn build_request<'a>(
        &'a self,
        encoded_image: &'a str,
        media_type: &'static str,
    ) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.config.model,
            messages: vec![Message {
                role: "user",
                content: vec![
                    ContentPart::Text { text: INSTRUCTION },
                    ContentPart::Image {
                        source: ImageSource {
                            kind: "base64",
                            media_type,
                            data: encoded_image,
                        },
                    },
                ],
            }],
            max_tokens: MAX_TOKENS,
        }
    }
}

#[async_trait]
impl AltTextProvider for AnthropicProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn generate(&self, encoded_image: &str) -> Result<String> {
        let api_key = require_api_key(&self.config, API_KEY_VAR)?;

        let media_type = sniff_media_type(&decode_image(encoded_image)?);
        let body = self.build_request(encoded_image, media_type);
        debug!(
            model = %self.config.model,
            media_type,
            payload_len = encoded_image.len(),
            "Built Anthropic request"
        );

        let request = self
            .client
            .post(&self.config.api_url)
            .header("Content-Type", "application/json")
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body);

        let (status, raw) = send(NAME, request, self.config.timeout()).await?;
        let response: MessagesResponse = decode_reply(NAME, status, &raw)?;

        let block = response
            .content
            .into_iter()
            .next()
            .ok_or(AltTextError::EmptyResponse(NAME))?;
        info!("Extracted response from Anthropic");
        Ok(block.text)
    }
}
