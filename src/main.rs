use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use alt_text_generator::{build_provider, create_router, AppState, Config, ProviderKind};

#[derive(Parser)]
#[command(name = "alt-text-generator")]
#[command(about = "Generate image alt text with OpenAI or Anthropic")]
struct Args {
    /// Use the OpenAI API
    #[arg(long)]
    openai: bool,

    /// Use the Anthropic API
    #[arg(long)]
    anthropic: bool,

    /// File of KEY=value lines loaded into the environment at startup
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "alt_text_generator=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let provider_kind = ProviderKind::from_flags(args.openai, args.anthropic)?;

    tracing::info!("Loading environment variables from {}", args.env_file.display());
    dotenvy::from_filename(&args.env_file)
        .with_context(|| format!("Error loading {}", args.env_file.display()))?;

    let config = Config::from_env(provider_kind);
    let provider = build_provider(&config)?;
    let addr = config.bind_address();

    let app = create_router(AppState::new(config, provider));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Starting server on {} with {}", addr, provider_kind);

    axum::serve(listener, app).await?;

    Ok(())
}
