//! Server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Environment variable holding the shared secret.
pub const ENV_APP_KEY: &str = "APP_KEY";

/// Environment variable holding the data directory.
pub const ENV_DATA_PATH: &str = "APP_DATAPATH";

/// Well-known default secret. Must be overridden in any real deployment.
pub const DEFAULT_APP_KEY: &str = "123456";

/// Default data directory, relative to the working directory.
pub const DEFAULT_DATA_PATH: &str = "data";

/// Key under which the shareable rules document is stored.
pub const DEFAULT_SHARE_KEY: &str = "kiss-rules-share.json";

/// Configuration for the sync server.
///
/// Built once at startup and handed to [`crate::SyncServer`].
#[derive(Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// Shared secret from which both tokens are derived.
    pub app_key: String,
    /// Root directory of the record store.
    pub data_dir: PathBuf,
    /// Key served by `/rules`.
    pub share_key: String,
}

impl ServerConfig {
    /// Creates a new server configuration with default secret and paths.
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            app_key: DEFAULT_APP_KEY.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_PATH),
            share_key: DEFAULT_SHARE_KEY.to_string(),
        }
    }

    /// Sets the shared secret.
    pub fn with_app_key(mut self, app_key: impl Into<String>) -> Self {
        self.app_key = app_key.into();
        self
    }

    /// Sets the data directory.
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    /// Sets the key served by `/rules`.
    pub fn with_share_key(mut self, share_key: impl Into<String>) -> Self {
        self.share_key = share_key.into();
        self
    }

    /// Sets the bind address.
    pub fn with_bind_addr(mut self, bind_addr: SocketAddr) -> Self {
        self.bind_addr = bind_addr;
        self
    }

    /// Returns true if the well-known default secret is in use.
    #[must_use]
    pub fn uses_default_app_key(&self) -> bool {
        self.app_key == DEFAULT_APP_KEY
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from(([0, 0, 0, 0], 8080)))
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind_addr", &self.bind_addr)
            .field("app_key", &"<redacted>")
            .field("data_dir", &self.data_dir)
            .field("share_key", &self.share_key)
            .finish()
    }
}
