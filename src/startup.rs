// Startup module - banner and effective settings
//
// Printed to stderr before a command runs so stdout carries only the
// command's own output (page listings, build JSON).

use crate::config::{Config, VERSION};

/// ANSI color codes for terminal output
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GREEN: &str = "\x1b[32m";
    pub const MAGENTA: &str = "\x1b[35m";
}

/// One line of the settings summary
pub struct SettingStatus {
    pub name: &'static str,
    pub enabled: bool,
    pub description: String,
}

/// Print the banner and settings summary
pub fn print_startup(config: &Config) {
    use colors::*;

    eprintln!();
    eprintln!("  {BOLD}{CYAN}Photometer{RESET} {DIM}v{VERSION}{RESET}");

    if let Some(path) = Config::config_path() {
        if path.exists() {
            eprintln!("  {DIM}Config:{RESET} {GREEN}✓{RESET} {}", path.display());
        } else {
            eprintln!("  {DIM}Config:{RESET} {DIM}(using defaults){RESET}");
        }
    }

    for setting in settings(config) {
        print_setting(&setting);
    }

    eprintln!("  {MAGENTA}▸{RESET} Server {BOLD}{}{RESET}", config.server_url);
    eprintln!();
}

/// Summary of settings that change client behavior
pub fn settings(config: &Config) -> Vec<SettingStatus> {
    vec![
        SettingStatus {
            name: "stale-guard",
            enabled: config.gallery.discard_stale,
            description: "Drop overtaken gallery answers".to_string(),
        },
        SettingStatus {
            name: "file-log",
            enabled: config.logging.file_enabled,
            description: format!(
                "{} ({})",
                config.logging.file_dir.display(),
                config.logging.file_rotation.as_str()
            ),
        },
        SettingStatus {
            name: "bundle",
            enabled: config.bundle_file.is_some(),
            description: config
                .bundle_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "built-in".to_string()),
        },
    ]
}

fn print_setting(setting: &SettingStatus) {
    use colors::*;

    let (icon, style) = if setting.enabled {
        (format!("{GREEN}✓{RESET}"), "")
    } else {
        (format!("{DIM}○{RESET}"), DIM)
    };

    eprintln!(
        "    {icon} {style}{:<12}{RESET} {DIM}{}{RESET}",
        setting.name, setting.description
    );
}

/// Same summary through tracing, for file logs
pub fn log_startup(config: &Config) {
    tracing::info!("Photometer v{} -> {}", VERSION, config.server_url);
    for setting in settings(config) {
        let icon = if setting.enabled { "✓" } else { "○" };
        tracing::debug!("  {} {} - {}", icon, setting.name, setting.description);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_reflect_config() {
        let mut config = Config::default();
        config.gallery.discard_stale = false;

        let settings = settings(&config);
        let guard = settings.iter().find(|s| s.name == "stale-guard").unwrap();
        assert!(!guard.enabled);

        let bundle = settings.iter().find(|s| s.name == "bundle").unwrap();
        assert_eq!(bundle.description, "built-in");
    }
}
