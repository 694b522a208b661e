use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, FromRequest, Multipart, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::Html,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use tracing::{debug, error, info, warn};

use crate::error::{AltTextError, Result};
use crate::provider::media::{is_accepted, sniff_media_type};
use crate::state::AppState;

pub const IMAGE_FIELD: &str = "image";

const MULTIPART_FORM_DATA: &str = "multipart/form-data";
const READ_FILE_FAILED: &str = "Failed to read image file";

/// An image taken from the `image` form field, already size and format checked.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: Option<String>,
    pub bytes: Bytes,
    pub media_type: &'static str,
}

impl UploadedImage {
    pub fn validate(file_name: Option<String>, bytes: Bytes, max_bytes: usize) -> Result<Self> {
        if bytes.len() > max_bytes {
            return Err(too_large(max_bytes));
        }

        let media_type = sniff_media_type(&bytes);
        if !is_accepted(media_type) {
            return Err(AltTextError::UnsupportedMedia(format!(
                "Unsupported image format: {media_type}"
            )));
        }

        Ok(Self {
            file_name,
            bytes,
            media_type,
        })
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Standard padded base64 of the raw bytes.
    pub fn encode(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

/// Accepts the bare media type or one followed by parameters such as `boundary`.
pub fn is_multipart(content_type: &str) -> bool {
    content_type.starts_with(MULTIPART_FORM_DATA)
}

/// Human readable size limit, e.g. `5 MB`.
pub fn describe_limit(max_bytes: usize) -> String {
    const MB: usize = 1024 * 1024;
    if max_bytes >= MB && max_bytes % MB == 0 {
        format!("{} MB", max_bytes / MB)
    } else {
        format!("{max_bytes} bytes")
    }
}

pub fn render_alt_text(alt_text: &str) -> String {
    format!(
        "<div id='alt-text'>Generated Alt Text: {}</div>\
         <button hx-get='/' hx-target='body'>Upload New Image</button>",
        escaper::encode_minimal(alt_text)
    )
}

fn too_large(max_bytes: usize) -> AltTextError {
    AltTextError::PayloadTooLarge(format!(
        "Image exceeds the {} upload limit",
        describe_limit(max_bytes)
    ))
}

fn form_error(err: MultipartError, max_bytes: usize) -> AltTextError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return too_large(max_bytes);
    }
    warn!(error = %err, "Error reading form file");
    AltTextError::Validation(READ_FILE_FAILED.to_string())
}

async fn read_image_field(mut multipart: Multipart, max_bytes: usize) -> Result<UploadedImage> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| form_error(e, max_bytes))?
    {
        // Only file parts count; a plain text value named `image` is skipped.
        if field.name() != Some(IMAGE_FIELD) || field.file_name().is_none() {
            continue;
        }

        let file_name = field.file_name().map(str::to_owned);
        let bytes = field.bytes().await.map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                too_large(max_bytes)
            } else {
                error!(error = %e, "Error reading image content");
                AltTextError::UploadRead(e.to_string())
            }
        })?;
        info!(
            file_name = file_name.as_deref().unwrap_or("<none>"),
            size = bytes.len(),
            "Uploaded file received"
        );

        return UploadedImage::validate(file_name, bytes, max_bytes);
    }

    warn!("Form has no '{}' field", IMAGE_FIELD);
    Err(AltTextError::Validation(READ_FILE_FAILED.to_string()))
}

/// `POST /upload`: multipart image in, alt text fragment out.
pub async fn upload_image(State(state): State<AppState>, request: Request) -> Result<Html<String>> {
    info!("Received upload request");

    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    debug!(content_type = %content_type, "Request Content-Type");
    if !is_multipart(&content_type) {
        warn!("Request Content-Type isn't multipart/form-data");
        return Err(AltTextError::Validation(format!(
            "{READ_FILE_FAILED}: Content-Type isn't multipart/form-data"
        )));
    }

    let max_bytes = state.config.upload.max_bytes;
    let multipart = Multipart::from_request(request, &state)
        .await
        .map_err(|e| {
            warn!(error = %e, "Rejected multipart body");
            AltTextError::Validation(READ_FILE_FAILED.to_string())
        })?;
    let image = read_image_field(multipart, max_bytes).await?;

    let encoded = image.encode();
    debug!(
        media_type = image.media_type,
        size = image.size(),
        encoded_len = encoded.len(),
        "Encoded image to base64"
    );

    let alt_text = state.provider.generate(&encoded).await.map_err(|e| {
        error!(provider = state.provider.name(), error = %e, "Error generating alt text");
        e
    })?;
    info!(provider = state.provider.name(), alt_text = %alt_text, "Generated alt text");

    Ok(Html(render_alt_text(&alt_text)))
}
