//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;

/// TOML string literal for `s`, escaped
fn quoted(s: &str) -> String {
    toml::Value::String(s.to_string()).to_string()
}

impl Config {
    /// Render the full config as a commented TOML file
    pub fn to_toml(&self) -> String {
        let bundle_file = match &self.bundle_file {
            Some(path) => format!("bundle_file = {}", quoted(&path.display().to_string())),
            None => "# bundle_file = \"build.toml\"".to_string(),
        };

        format!(
            r#"# photometer configuration

# Photometer server (PHOTOMETER_URL overrides)
server_url = {server_url}

# Per-request timeout in seconds (PHOTOMETER_TIMEOUT overrides)
timeout_secs = {timeout}

# Asset bundle description; the shipped build is used when unset
{bundle_file}

[gallery]
# Drop answers to gallery requests overtaken by a newer request
discard_stale = {discard_stale}
default_page = {default_page}

# Logging configuration (RUST_LOG env var overrides)
[logging]
level = {log_level}
# JSON file logging in addition to stderr
file_enabled = {log_file_enabled}
file_dir = {log_file_dir}
file_rotation = "{log_file_rotation}"  # hourly, daily, never
file_prefix = {log_file_prefix}
"#,
            server_url = quoted(&self.server_url),
            timeout = self.timeout_secs,
            bundle_file = bundle_file,
            discard_stale = self.gallery.discard_stale,
            default_page = self.gallery.default_page,
            log_level = quoted(&self.logging.level),
            log_file_enabled = self.logging.file_enabled,
            log_file_dir = quoted(&self.logging.file_dir.display().to_string()),
            log_file_rotation = self.logging.file_rotation.as_str(),
            log_file_prefix = quoted(&self.logging.file_prefix),
        )
    }
}
