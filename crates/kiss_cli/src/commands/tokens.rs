//! Tokens command.

use kiss_sync_server::{derive_token, Purpose, ServerConfig};

/// Renders the tokens clients must be configured with.
pub fn render(config: &ServerConfig) -> Vec<String> {
    let mut lines = Vec::with_capacity(3);
    if config.uses_default_app_key() {
        lines.push("warning: APP_KEY is the well-known default".to_string());
    }
    lines.push(format!(
        "sync:  Authorization: Bearer {}",
        derive_token(&config.app_key, Purpose::Sync)
    ));
    lines.push(format!(
        "share: /rules?psk={}",
        derive_token(&config.app_key, Purpose::Share)
    ));
    lines
}
