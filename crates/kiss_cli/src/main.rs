//! KISS sync server CLI
//!
//! Command-line entry point for the KISS Translator sync server.
//!
//! # Commands
//!
//! - `serve` - Run the HTTP server
//! - `tokens` - Print the client tokens derived from `APP_KEY`
//! - `show` - Print the stored record for a key

mod commands;

use clap::{Parser, Subcommand};
use kiss_sync_server::{ServerConfig, DEFAULT_APP_KEY, DEFAULT_DATA_PATH, ENV_APP_KEY, ENV_DATA_PATH};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Sync endpoint for the KISS Translator extension.
#[derive(Parser)]
#[command(name = "kiss-sync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Shared secret from which the sync and share tokens are derived
    #[arg(global = true, long, env = ENV_APP_KEY, default_value = DEFAULT_APP_KEY, hide_env_values = true)]
    app_key: String,

    /// Directory holding one file per key
    #[arg(global = true, long, env = ENV_DATA_PATH, default_value = DEFAULT_DATA_PATH)]
    data_path: PathBuf,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Address to listen on
        #[arg(long, env = "HOST", default_value = "0.0.0.0")]
        host: IpAddr,

        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value = "8080")]
        port: u16,
    },

    /// Print the tokens clients must be configured with
    Tokens,

    /// Print the stored record for a key
    Show {
        /// Record key
        key: String,
    },

    /// Show version information
    Version,
}

impl Cli {
    fn server_config(&self) -> ServerConfig {
        ServerConfig::default()
            .with_app_key(self.app_key.clone())
            .with_data_dir(self.data_path.clone())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = cli.server_config();

    match cli.command {
        Commands::Serve { host, port } => {
            let config = config.with_bind_addr(SocketAddr::new(host, port));
            commands::serve::run(config)?;
        }
        Commands::Tokens => {
            for line in commands::tokens::render(&config) {
                println!("{line}");
            }
        }
        Commands::Show { key } => {
            commands::show::run(&config, &key)?;
        }
        Commands::Version => {
            println!("kiss-sync v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
