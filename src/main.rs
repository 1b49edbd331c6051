//! Entry point for the Mower ROI binary.
//!
//! Running this binary starts an HTTP server exposing the calculator.
//! See [`mower_roi::config`] for the environment variables it reads;
//! log verbosity follows `RUST_LOG` and defaults to `info`.

use mower_roi::config::ServerConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env();
    if let Err(err) = mower_roi::api::serve(&config).await {
        tracing::error!(error = %err, "server stopped");
        std::process::exit(1);
    }
}
