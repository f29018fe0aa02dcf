//! Serve command.

use kiss_sync_server::{ServerConfig, SyncServer};
use tracing::info;

/// Runs the HTTP server until the process is stopped.
pub fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(?config, "starting sync server");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(SyncServer::new(config).serve())?;
    Ok(())
}
