mod config;
mod errors;
mod llm_client;
mod outreach;
mod routes;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{mask_secret, Config, DEFAULT_SECRETS_PATH};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[derive(Parser)]
#[command(name = "coldreach")]
#[command(about = "Job extraction and cold email drafting service", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Secrets file consulted when GROQ_API_KEY is not set
    #[arg(long, global = true, default_value = DEFAULT_SECRETS_PATH)]
    secrets: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API (default)
    Serve,
    /// Show where the API key was resolved from (debug aid)
    Credential,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env(&cli.secrets)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Credential => {
            print_credential(&config);
            Ok(())
        }
    }
}

fn print_credential(config: &Config) {
    println!("source: {}", config.credential_source);
    match &config.groq_api_key {
        Some(key) => println!("key:    {}", mask_secret(key)),
        None => println!("key:    <none>"),
    }
}

async fn serve(config: Config) -> Result<()> {
    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting coldreach v{}", env!("CARGO_PKG_VERSION"));
    info!("Credential source: {}", config.credential_source);

    // Fails here, before any request, when no credential was resolved
    let llm = LlmClient::new(config.groq_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let state = AppState { llm: Arc::new(llm) };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
