//! Main sync server.

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::handler::{Clock, HandlerContext, RequestHandler};
use crate::http;
use axum::Router;
use kiss_storage::{FileStore, Record, RecordStore};
use std::io;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// The sync server.
///
/// Owns the configuration, the record store and the request handler, and
/// exposes both the plain operations and the HTTP router wrapping them.
///
/// # Example
///
/// ```
/// use kiss_sync_server::{ServerConfig, SyncServer};
///
/// let config = ServerConfig::default().with_data_dir("data");
/// let server = SyncServer::new(config);
///
/// // Either call server.handle_sync()/handle_rules() directly,
/// // or mount server.router() in an axum application.
/// let _router = server.router();
/// ```
pub struct SyncServer {
    handler: Arc<RequestHandler>,
    context: Arc<HandlerContext>,
}

impl SyncServer {
    /// Creates a sync server backed by a [`FileStore`] at `config.data_dir`.
    pub fn new(config: ServerConfig) -> Self {
        let store = Arc::new(FileStore::new(config.data_dir.clone()));
        Self::with_store(config, store)
    }

    /// Creates a sync server with an existing store.
    pub fn with_store(config: ServerConfig, store: Arc<dyn RecordStore>) -> Self {
        Self::from_context(HandlerContext::new(config, store))
    }

    /// Creates a sync server with an existing store and clock.
    pub fn with_clock(
        config: ServerConfig,
        store: Arc<dyn RecordStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::from_context(HandlerContext::with_clock(config, store, clock))
    }

    fn from_context(context: HandlerContext) -> Self {
        if context.config.uses_default_app_key() {
            warn!("APP_KEY is the well-known default; set it before exposing this server");
        }
        let context = Arc::new(context);
        let handler = Arc::new(RequestHandler::new(Arc::clone(&context)));
        Self { handler, context }
    }

    /// Returns the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.context.config
    }

    /// Returns the record store.
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.context.store
    }

    /// Returns the token a client must present for `purpose`.
    pub fn token(&self, purpose: crate::Purpose) -> String {
        self.context.validator().token(purpose)
    }

    /// Handles a sync write (see [`RequestHandler::handle_sync`]).
    pub fn handle_sync(&self, authorization: Option<&str>, request: Record) -> ServerResult<Record> {
        self.handler.handle_sync(authorization, request)
    }

    /// Handles a shared rules read (see [`RequestHandler::handle_rules`]).
    pub fn handle_rules(&self, psk: Option<&str>) -> ServerResult<String> {
        self.handler.handle_rules(psk)
    }

    /// Returns the axum router for this server.
    pub fn router(&self) -> Router {
        http::router(Arc::clone(&self.handler))
    }

    /// Binds `config.bind_addr` and serves until the process exits.
    pub async fn serve(self) -> io::Result<()> {
        let listener = TcpListener::bind(self.config().bind_addr).await?;
        self.serve_on(listener).await
    }

    /// Serves on an already bound listener.
    ///
    /// Useful for tests that bind to port 0.
    pub async fn serve_on(self, listener: TcpListener) -> io::Result<()> {
        let addr = listener.local_addr()?;
        info!(
            data_dir = %self.config().data_dir.display(),
            "sync server listening on http://{}",
            addr
        );
        axum::serve(listener, self.router()).await
    }
}
