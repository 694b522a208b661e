use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Body returned to the client for any upstream failure. Details stay in the logs.
pub const GENERIC_FAILURE: &str = "Failed to generate alt text";

#[derive(Error, Debug)]
pub enum AltTextError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    UnsupportedMedia(String),

    #[error("Failed to read image content: {0}")]
    UploadRead(String),

    #[error("Failed to decode base64 image: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("HTTP request error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Provider request timed out after {0:?}")]
    Timeout(Duration),

    #[error("API error: {0}")]
    Provider(String),

    #[error("No response from {0}")]
    EmptyResponse(&'static str),
}

impl AltTextError {
    pub fn status(&self) -> StatusCode {
        match self {
            AltTextError::Validation(_) | AltTextError::Decode(_) => StatusCode::BAD_REQUEST,
            AltTextError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AltTextError::UnsupportedMedia(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AltTextError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AltTextError::UploadRead(_)
            | AltTextError::Config(_)
            | AltTextError::Transport(_)
            | AltTextError::Json(_)
            | AltTextError::Provider(_)
            | AltTextError::EmptyResponse(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to hand back to the client.
    pub fn public_message(&self) -> String {
        match self {
            AltTextError::Validation(msg)
            | AltTextError::PayloadTooLarge(msg)
            | AltTextError::UnsupportedMedia(msg) => msg.clone(),
            AltTextError::Decode(_) => self.to_string(),
            AltTextError::UploadRead(_) => "Failed to read image content".to_string(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

impl IntoResponse for AltTextError {
    fn into_response(self) -> Response {
        (self.status(), self.public_message()).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AltTextError>;
