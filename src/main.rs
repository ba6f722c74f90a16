// Photometer - command-line client for the photometer photo gallery
//
// Architecture:
// - Transport (reqwest): one request per operation, answered good or bad
// - Flows: activation, gallery page fetch, login/registration forms
// - Router: URL fragment -> view/model pair
// - Reporter: bad answers are printed to stderr and logged, never retried

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use photometer_client::activation::{Activation, ActivationOutcome};
use photometer_client::bundle::BundleConfig;
use photometer_client::config::Config;
use photometer_client::events::CollectionEvent;
use photometer_client::gallery::{FetchOutcome, GalleryCollection};
use photometer_client::reporter::TracingReporter;
use photometer_client::request::HttpTransport;
use photometer_client::router::{CurrentView, Route, Workspace};
use photometer_client::session::Session;
use photometer_client::views::{Services, SubmitOutcome};
use photometer_client::{logging, startup};
use std::path::PathBuf;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Config management never touches the network or the logger
    if let Commands::Config { show, reset, path } = cli.command {
        cli::handle_config(show, reset, path)?;
        return Ok(ExitCode::SUCCESS);
    }

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            // A broken config should fail fast, not fall back to defaults
            eprintln!("\n╔══════════════════════════════════════════════════════════════╗");
            eprintln!("║  CONFIG ERROR - Failed to load configuration                 ║");
            eprintln!("╚══════════════════════════════════════════════════════════════╝\n");
            eprintln!("  Error: {:#}\n", e);
            eprintln!("  To reset, run `photometer config --reset`.\n");
            return Ok(ExitCode::FAILURE);
        }
    };

    // Guard flushes file logs on drop; keep it for the whole run
    let _file_guard = logging::init(&config.logging);

    if !cli.quiet {
        startup::print_startup(&config);
    }
    startup::log_startup(&config);

    let ok = match cli.command {
        Commands::Activate { key } => activate(&config, &key).await?,
        Commands::Gallery { page, json } => {
            gallery(&config, page.unwrap_or(config.gallery.default_page), json).await?
        }
        Commands::Navigate {
            fragment,
            user,
            password,
            email,
            submit,
        } => {
            let form = Form {
                user,
                password,
                email,
            };
            navigate(&config, &fragment, form, submit).await?
        }
        Commands::Bundle { file, check } => bundle(&config, file, check)?,
        Commands::Config { .. } => true,
    };

    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn transport(config: &Config) -> Result<HttpTransport> {
    let transport = HttpTransport::new(&config.server_url, config.timeout())
        .with_context(|| format!("Cannot talk to {}", config.server_url))?;
    tracing::debug!("Requests go to {}", transport.base_url());
    Ok(transport)
}

async fn activate(config: &Config, key: &str) -> Result<bool> {
    let session = Session::new();
    let activation = Activation::new(transport(config)?, TracingReporter, session);

    match activation.activate(key).await? {
        ActivationOutcome::Activated(login) => {
            println!("Account activated: {}", login.name);
            println!("sid = {}", login.sid);
            Ok(true)
        }
        ActivationOutcome::Rejected => Ok(false),
    }
}

async fn gallery(config: &Config, page: u32, json: bool) -> Result<bool> {
    let collection = GalleryCollection::new(transport(config)?, TracingReporter)
        .with_stale_responses(config.gallery.stale_responses());
    let mut events = collection.subscribe();

    if !matches!(collection.fetch(page).await, FetchOutcome::Loaded(_)) {
        return Ok(false);
    }

    for photo in collection.photos() {
        if json {
            println!("{}", serde_json::to_string(&photo)?);
        } else {
            let size = match (photo.width, photo.height) {
                (Some(w), Some(h)) => format!("{}x{}", w, h),
                _ => "-".to_string(),
            };
            println!(
                "{:>8}  {:<32} {:>11}  {}",
                photo.id,
                photo.label(),
                size,
                photo.camera_model.as_deref().unwrap_or("")
            );
        }
    }

    // Pagination is observed the same way a pager widget would
    while let Ok(event) = events.try_recv() {
        if let CollectionEvent::PagesChanged { pages, .. } = event {
            eprintln!("Page {} of {}", pages.current_page, pages.pages_count);
        }
    }
    Ok(true)
}

/// Form values given on the command line
struct Form {
    user: Option<String>,
    password: Option<String>,
    email: Option<String>,
}

async fn navigate(config: &Config, fragment: &str, form: Form, submit: bool) -> Result<bool> {
    let session = Session::new();
    let services = Services::new(transport(config)?, TracingReporter, session.clone());
    let mut workspace = Workspace::new(services);

    if let Route::NotFound(fragment) = workspace.navigate(fragment) {
        eprintln!("Unknown page #{} (known: #login, #register)", fragment);
        return Ok(false);
    }

    let Some(view) = workspace.current_mut() else {
        return Ok(false);
    };

    let outcome = match view {
        CurrentView::Login(view) => {
            let model = view.model_mut();
            model.user = form.user.unwrap_or_default();
            model.password = form.password.unwrap_or_default();
            println!("{}", view.render());
            if !submit {
                return Ok(true);
            }
            view.model().submit().await?
        }
        CurrentView::Register(view) => {
            let model = view.model_mut();
            model.user = form.user.unwrap_or_default();
            model.password = form.password.unwrap_or_default();
            model.email = form.email.unwrap_or_default();
            println!("{}", view.render());
            if !submit {
                return Ok(true);
            }
            view.model().submit().await?
        }
    };

    match outcome {
        SubmitOutcome::LoggedIn(login) => {
            println!("Logged in as {}", login.name);
            if let Some(active) = session.current() {
                tracing::debug!("Session started at {}", active.since);
            }
            Ok(true)
        }
        SubmitOutcome::Registered => {
            println!("Registered. Check your mail for the activation link.");
            Ok(true)
        }
        SubmitOutcome::Rejected => Ok(false),
    }
}

fn bundle(config: &Config, file: Option<PathBuf>, check: bool) -> Result<bool> {
    let bundle = match file.or_else(|| config.bundle_file.clone()) {
        Some(path) => BundleConfig::load(&path)?,
        None => BundleConfig::default(),
    };

    if let Err(e) = bundle.validate() {
        eprintln!("{}", e);
        return Ok(false);
    }

    if check {
        println!(
            "Bundle OK: {} entry module(s), {} alias(es), {} shim(s)",
            bundle.modules.len(),
            bundle.paths.len(),
            bundle.shim.len()
        );
        for entry in &bundle.modules {
            println!("  {} -> {}", entry.name, bundle.module_file(&entry.name).display());
        }
    } else {
        println!("{}", bundle.to_build_json());
    }
    Ok(true)
}
