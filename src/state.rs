use std::sync::Arc;

use crate::config::Config;
use crate::provider::AltTextProvider;

/// Read-only state shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub provider: Arc<dyn AltTextProvider>,
}

impl AppState {
    pub fn new(config: Config, provider: Arc<dyn AltTextProvider>) -> Self {
        Self {
            config: Arc::new(config),
            provider,
        }
    }
}
