//! picgate CLI entry point.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use picgate::config::Config;

#[derive(Parser)]
#[command(name = "picgate", version, about = "Metadata gateway for a remote image service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the gateway server
    Serve {
        /// Path to the configuration file
        #[arg(long, default_value = "picgate.toml")]
        config: PathBuf,

        /// Override the configured listen port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Load and validate the configuration, then exit
    Check {
        /// Path to the configuration file
        #[arg(long, default_value = "picgate.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve { config, port } => {
            let mut config = if config.exists() {
                Config::load_from(&config)?
            } else {
                tracing::warn!(path = %config.display(), "config file not found, using defaults");
                Config::default()
            };
            if let Some(port) = port {
                config.server.port = port;
            }
            picgate::http::serve(config).await
        },
        Command::Check { config } => {
            let config = Config::load_from(&config)?;
            let result = config.validate()?;
            for warning in &result.warnings {
                println!("warning: {warning}");
            }
            println!("Configuration OK");
            Ok(())
        },
    }
}
