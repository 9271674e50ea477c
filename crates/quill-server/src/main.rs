//! Quill relay binary.
//!
//! Usage:
//!   quill-server
//!   quill-server --port 9000 --bind 0.0.0.0
//!   quill-server --config relay.ron --history-limit 100000
//!
//! CLI flags override values from the config file.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use quill_server::{Relay, RelayConfig};

/// Relay for quill collaborative editing sessions.
#[derive(Parser, Debug)]
#[command(name = "quill-server")]
#[command(about = "Relay server for quill collaborative editing")]
struct Args {
    /// RON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    bind: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Most batches kept for late joiners (0 means no limit)
    #[arg(long)]
    history_limit: Option<usize>,
}

impl Args {
    fn into_config(self) -> Result<RelayConfig> {
        let mut config = match &self.config {
            Some(path) => RelayConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => RelayConfig::default(),
        };
        if let Some(bind) = self.bind {
            config.bind = bind;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(limit) = self.history_limit {
            config.history_limit = limit;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Args::parse().into_config()?;
    tracing::info!(
        bind = %config.bind,
        port = config.port,
        history_limit = config.history_limit,
        "starting quill relay"
    );

    let listener = quill_server::bind(&config).await?;
    let relay = Arc::new(Relay::new(config.history_limit));
    quill_server::serve(listener, relay).await?;
    Ok(())
}
