// CLI module - command-line argument parsing and config handlers
//
// Runtime commands (activate, gallery, navigate, bundle) are dispatched from
// main; the config subcommand is handled here and never needs the network.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use photometer_client::config::{Config, VERSION};
use std::io::Write;
use std::path::PathBuf;

/// Photometer - client for the photometer photo gallery
#[derive(Parser)]
#[command(name = "photometer")]
#[command(version = VERSION)]
#[command(about = "Client for the photometer photo gallery", long_about = None)]
pub struct Cli {
    /// Skip the startup banner
    #[arg(long, short, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Activate an account with the key from the activation mail
    Activate { key: String },

    /// Show one page of the gallery
    Gallery {
        /// Page number (defaults to [gallery] default_page)
        #[arg(long, short)]
        page: Option<u32>,

        /// Print photos as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Open a view by URL fragment (login, register)
    Navigate {
        fragment: String,

        #[arg(long)]
        user: Option<String>,

        #[arg(long)]
        password: Option<String>,

        /// Registration only
        #[arg(long)]
        email: Option<String>,

        /// Submit the form after filling it
        #[arg(long)]
        submit: bool,
    },

    /// Print or check the asset bundle configuration
    Bundle {
        /// TOML bundle description (overrides bundle_file from config)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Validate only
        #[arg(long)]
        check: bool,
    },

    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

/// Handle `photometer config ...`
pub fn handle_config(show: bool, reset: bool, path: bool) -> Result<()> {
    if path {
        handle_config_path()
    } else if show {
        handle_config_show()
    } else if reset {
        handle_config_reset()
    } else {
        println!("Usage: photometer config [--show|--reset|--path]");
        println!();
        println!("Options:");
        println!("  --show    Display effective configuration");
        println!("  --reset   Reset config file to defaults");
        println!("  --path    Show config file path");
        Ok(())
    }
}

fn handle_config_path() -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;
    println!("{}", path.display());
    Ok(())
}

fn handle_config_show() -> Result<()> {
    let config = Config::from_env()?;

    println!("# Effective configuration (env > file > defaults)");
    println!();
    print!("{}", config.to_toml());

    println!();
    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("# Source: {}", path.display());
        } else {
            println!("# Source: defaults (no config file)");
        }
    }
    Ok(())
}

fn handle_config_reset() -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;

    // Confirm if file exists
    if path.exists() {
        eprint!(
            "Config file exists at {}. Overwrite? [y/N] ",
            path.display()
        );
        std::io::stderr().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Error creating directory {}", parent.display()))?;
    }

    std::fs::write(&path, Config::default().to_toml())
        .with_context(|| format!("Error writing config {}", path.display()))?;

    println!("Config reset to defaults: {}", path.display());
    Ok(())
}
