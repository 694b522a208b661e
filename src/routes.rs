use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::page::index;
use crate::state::AppState;
use crate::upload::upload_image;

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn create_router(state: AppState) -> Router {
    let body_limit = state
        .config
        .upload
        .max_bytes
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/", get(index))
        .route("/upload", post(upload_image))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        Config, ProviderConfig, ProviderKind, ServerConfig, UploadConfig, ANTHROPIC_API_URL,
        OPENAI_API_URL,
    };
    use crate::provider::build_provider;

    fn provider_config(api_url: &str) -> ProviderConfig {
        ProviderConfig {
            api_key: None,
            api_url: api_url.to_string(),
            model: "test-model".to_string(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn test_router_accepts_maximal_upload_limit() {
        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            provider: ProviderKind::OpenAi,
            openai: provider_config(OPENAI_API_URL),
            anthropic: provider_config(ANTHROPIC_API_URL),
            upload: UploadConfig {
                max_bytes: usize::MAX,
            },
        };
        let provider = build_provider(&config).unwrap();

        let _router = create_router(AppState::new(config, provider));
    }
}
