//! Azure OpenAI chat proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client                ┌──────────────────────────────────────────────┐
//!     POST /chat  ─────────▶│ http::server → handlers                      │
//!                           │        │                                     │
//!                           │        ▼                                     │
//!                           │ openai::AzureOpenAiClient                    │
//!                           │        │  RequestSpec (url, api-key, body)   │
//!                           │        ▼                                     │
//!                           │ httpclient executor ◀── resilience::retries  │──▶ Azure OpenAI
//!                           │        │                                     │
//!                           │        ▼                                     │
//!                           │ transport (pooled reqwest client)            │
//!                           └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use azure_chat_proxy::config::{default_config, load_config};
use azure_chat_proxy::observability::logging;
use azure_chat_proxy::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "azure-chat-proxy")]
#[command(about = "Chat and embedding proxy for Azure OpenAI", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => default_config()?,
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability);

    tracing::info!("azure-chat-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        config = ?cli.config,
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );
    if config.openai.api_key.is_empty() {
        tracing::warn!("openai.api_key is empty; upstream calls will be rejected");
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for connections");

    let shutdown = Shutdown::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutdown signal received");
                shutdown.trigger();
            }
        }
    });

    let server = HttpServer::new(config, shutdown)?;
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
