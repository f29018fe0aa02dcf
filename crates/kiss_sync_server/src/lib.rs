//! # KISS Sync Server
//!
//! Remote synchronization endpoint for the KISS Translator browser extension.
//!
//! This crate provides:
//! - `POST /sync`: last-write-wins upsert of one record per key
//! - `GET /rules`: token-gated read of the shared rules document
//! - Credential derivation (salted SHA-256 of the shared `APP_KEY`)
//! - An axum router with permissive CORS
//!
//! # Protocol
//!
//! A client pushes `{key, value, updateAt}` with a bearer token. The server:
//! 1. Verifies the token derived for [`Purpose::Sync`]
//! 2. Locks the key and loads the stored record
//! 3. If the stored record is at least as new, returns it unchanged
//! 4. Otherwise stamps `updateAt` if it is zero, persists, and echoes the record
//!
//! The response is always the record the client should now hold, so a stale
//! client learns the newer value instead of getting an error.
//!
//! # Authentication
//!
//! ```rust
//! use kiss_sync_server::{derive_token, Purpose};
//!
//! let sync = derive_token("my-app-key", Purpose::Sync);
//! let share = derive_token("my-app-key", Purpose::Share);
//! assert_ne!(sync, share);
//! // Authorization: Bearer {sync}
//! // GET /rules?psk={share}
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
// Production code MUST NOT use panic!/unwrap()/expect()
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod auth;
mod config;
mod error;
mod handler;
pub mod http;
mod server;

pub use auth::{derive_token, Purpose, TokenValidator, SHARE_SALT, SYNC_SALT};
pub use config::{
    ServerConfig, DEFAULT_APP_KEY, DEFAULT_DATA_PATH, DEFAULT_SHARE_KEY, ENV_APP_KEY,
    ENV_DATA_PATH,
};
pub use error::{ServerError, ServerResult};
pub use handler::{Clock, FixedClock, HandlerContext, RequestHandler, SystemClock};
pub use server::SyncServer;
