//! Environment variable overrides applied on top of the TOML file.

use tracing::debug;

use crate::schema::CampusConfig;

/// Overrides `chat.ws_url` (the chat server base URL).
pub const WS_URL_VAR: &str = "CAMPUS_WS_URL";

/// Apply overrides from the process environment.
pub fn apply_env_overrides(config: &mut CampusConfig) {
    apply_overrides_with(config, |key| std::env::var(key).ok());
}

/// Apply overrides using an arbitrary variable lookup.
pub fn apply_overrides_with<F>(config: &mut CampusConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(WS_URL_VAR) {
        let url = url.trim();
        if !url.is_empty() {
            debug!(url = %url, "chat.ws_url overridden from environment");
            config.chat.ws_url = url.to_string();
        }
    }
}
