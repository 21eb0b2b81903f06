//! Loglens application binary - composition root.
//!
//! Ties the Loglens crates into a single executable:
//! 1. Parse CLI arguments
//! 2. Load configuration from TOML
//! 3. Initialize tracing
//! 4. Build shared state (session store + conversation controller)
//! 5. Start the axum API server with the embedded chat UI at /ui

use clap::Parser;

use loglens_api::{routes, AppState};
use loglens_core::LoglensConfig;

mod cli;

use cli::CliArgs;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = LoglensConfig::load_or_default(&config_file);
    if let Some(level) = args.resolve_log_level() {
        config.general.log_level = level;
    }
    let port = args.resolve_port(config.general.port);

    // Tracing: RUST_LOG wins, otherwise the resolved log level.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .init();

    tracing::info!("Starting Loglens v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    let state = AppState::new(config);

    let addr = format!("127.0.0.1:{}", port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(addr = %addr, error = %e, "Failed to bind — is another instance running?");
            tracing::error!("Try: LOGLENS_PORT={} loglens", port + 1);
            return Err(e.into());
        }
    };

    tracing::info!(addr = %addr, "API server listening");
    tracing::info!("Chat UI at http://{}/ui", addr);

    let router = routes::create_router(state);
    axum::serve(listener, router).await?;

    Ok(())
}
