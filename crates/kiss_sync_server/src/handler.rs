//! Request handlers for `/sync` and `/rules`.

use crate::auth::{Purpose, TokenValidator};
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use kiss_storage::{Record, RecordStore, StorageKey};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, error, info};

/// Source of the server time stamped onto records sent with `updateAt == 0`.
pub trait Clock: Send + Sync {
    /// Current time in Unix seconds.
    fn now_unix(&self) -> i64;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default()
    }
}

/// A clock that always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_unix(&self) -> i64 {
        self.0
    }
}

/// Context for request handling.
pub struct HandlerContext {
    /// Server configuration.
    pub config: ServerConfig,
    /// Record store (shared across all handlers).
    pub store: Arc<dyn RecordStore>,
    validator: TokenValidator,
    clock: Arc<dyn Clock>,
}

impl HandlerContext {
    /// Creates a new handler context using the system clock.
    pub fn new(config: ServerConfig, store: Arc<dyn RecordStore>) -> Self {
        Self::with_clock(config, store, Arc::new(SystemClock))
    }

    /// Creates a handler context with an explicit clock.
    pub fn with_clock(
        config: ServerConfig,
        store: Arc<dyn RecordStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let validator = TokenValidator::new(&config.app_key);
        Self {
            config,
            store,
            validator,
            clock,
        }
    }

    /// Returns the token validator derived from the configured secret.
    pub fn validator(&self) -> &TokenValidator {
        &self.validator
    }
}

/// Handler for sync and share requests.
pub struct RequestHandler {
    context: Arc<HandlerContext>,
}

impl RequestHandler {
    /// Creates a new request handler.
    pub fn new(context: Arc<HandlerContext>) -> Self {
        Self { context }
    }

    /// Checks a sync credential without touching the store.
    ///
    /// The HTTP layer calls this before reading the request body.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::AuthenticationFailed`] for a missing or wrong
    /// token.
    pub fn authenticate_sync(&self, authorization: Option<&str>) -> ServerResult<()> {
        self.context
            .validator
            .verify_bearer(Purpose::Sync, authorization)
    }

    /// Handles a sync write.
    ///
    /// `authorization` is the raw `Authorization` header value. The returned
    /// record is what the client should now hold: either `request` as
    /// persisted, or the stored record if it is at least as new.
    ///
    /// # Errors
    ///
    /// - [`ServerError::AuthenticationFailed`] for a missing or wrong token
    /// - [`ServerError::InvalidRequest`] for an empty or unsafe key, or an
    ///   empty value
    /// - [`ServerError::Storage`] if the store fails
    pub fn handle_sync(&self, authorization: Option<&str>, request: Record) -> ServerResult<Record> {
        self.authenticate_sync(authorization)?;

        let key = validate_request(&request)?;
        let store = &self.context.store;

        let _guard = store.lock(&key);

        let existing = store.get(&key).map_err(|e| {
            error!(key = %key, error = %e, "load record failed");
            ServerError::from(e)
        })?;

        if let Some(existing) = existing {
            if !request.is_newer_than(&existing) {
                debug!(
                    key = %key,
                    stored = existing.update_at,
                    incoming = request.update_at,
                    "stale write, returning stored record"
                );
                return Ok(existing);
            }
        }

        let mut record = request;
        if record.update_at == 0 {
            record.update_at = self.context.clock.now_unix();
        }

        store.put(&record).map_err(|e| {
            error!(key = %key, error = %e, "save record failed");
            ServerError::from(e)
        })?;

        info!(key = %key, update_at = record.update_at, "record accepted");
        Ok(record)
    }

    /// Handles a read of the shared rules document.
    ///
    /// `psk` is the `psk` query parameter. Returns the stored value verbatim.
    ///
    /// # Errors
    ///
    /// - [`ServerError::AuthenticationFailed`] for a missing or wrong token
    /// - [`ServerError::NotFound`] if the shared key was never written
    /// - [`ServerError::Storage`] if the store fails
    pub fn handle_rules(&self, psk: Option<&str>) -> ServerResult<String> {
        self.context.validator.verify(Purpose::Share, psk)?;

        let share_key = &self.context.config.share_key;
        let key = StorageKey::new(share_key.as_str()).map_err(|e| {
            error!(error = %e, "configured share key is invalid");
            ServerError::Internal(e.to_string())
        })?;

        match self.context.store.get(&key) {
            Ok(Some(record)) => Ok(record.value),
            Ok(None) => Err(ServerError::NotFound(share_key.clone())),
            Err(e) => {
                error!(key = %key, error = %e, "load shared rules failed");
                Err(e.into())
            }
        }
    }
}

fn validate_request(request: &Record) -> ServerResult<StorageKey> {
    if request.key.is_empty() {
        return Err(ServerError::InvalidRequest("key is required".into()));
    }
    if request.value.is_empty() {
        return Err(ServerError::InvalidRequest("value is required".into()));
    }
    StorageKey::new(request.key.as_str()).map_err(|e| ServerError::InvalidRequest(e.to_string()))
}
