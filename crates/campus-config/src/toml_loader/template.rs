//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> &'static str {
    r##"# Campus chat configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[chat]
ws_url = "ws://localhost:8000"   # overridden by CAMPUS_WS_URL
# reconnect_base_delay_ms = 1000  # 100-60000, doubles per attempt
# max_reconnect_attempts = 5      # 0-20
# handshake_timeout_secs = 0      # 0 disables, max 300
# history_limit = 500             # 1-10000

[logging]
# level = "INFO"                  # DEBUG, INFO, WARNING, ERROR
"##
}
