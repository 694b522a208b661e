//! Web service that turns an uploaded image into alt text using a
//! generative-AI provider chosen at startup.

pub mod config;
pub mod error;
pub mod page;
pub mod provider;
pub mod routes;
pub mod state;
pub mod upload;

pub use config::{Config, ProviderKind};
pub use error::{AltTextError, Result};
pub use provider::{build_provider, AltTextProvider};
pub use routes::create_router;
pub use state::AppState;
