use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{decode_reply, http_client, require_api_key, send, AltTextProvider, MAX_TOKENS};
use crate::config::ProviderConfig;
use crate::error::{AltTextError, Result};

const NAME: &str = "OpenAI";
const API_KEY_VAR: &str = "OPEN_AI_API_KEY";

// The image travels as text inside the prompt rather than as an image part.
const PROMPT_PREFIX: &str =
    "Generate an alt text description for the following image encoded in base64: ";

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    text: String,
}

#[derive(Clone, Debug)]
pub struct OpenAiProvider {
    client: Client,
    config: ProviderConfig,
}

impl OpenAiProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config)?,
            config: config.clone(),
        })
    }

    fn build_request<'a>(&'a self, encoded_image: &str) -> CompletionRequest<'a> {
        CompletionRequest {
            model: &self.config.model,
            messages: vec![Message {
                role: "user",
                content: format!("{PROMPT_PREFIX}{encoded_image}"),
            }],
            max_tokens: MAX_TOKENS,
        }
    }
}

#[async_trait]
impl AltTextProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn generate(&self, encoded_image: &str) -> Result<String> {
        let api_key = require_api_key(&self.config, API_KEY_VAR)?;

        let body = self.build_request(encoded_image);
        debug!(
            model = %self.config.model,
            prompt_len = body.messages[0].content.len(),
            "Built OpenAI request"
        );

        let request = self
            .client
            .post(&self.config.api_url)
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&body);

        let (status, raw) = send(NAME, request, self.config.timeout()).await?;
        let response: CompletionResponse = decode_reply(NAME, status, &raw)?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or(AltTextError::EmptyResponse(NAME))?;
        info!("Extracted response choice from OpenAI");
        Ok(choice.text)
    }
}
