//! Boot sequence for the interactive shell.
//!
//! # Design
//! - Configuration is validated before logging is installed; a bad flag fails
//!   fast with the offending field named.
//! - The first surface activates before the renderer attaches. The renderer
//!   replays the bus history, so the initial listing still reaches the screen.
//! - Downloads are disabled, not fatal, when no download URL is configured.

use std::sync::Arc;

use clap::Parser;
use formdesk_config::{AppConfig, LogFormatSetting};
use formdesk_download::{FormTransport, HttpFormTransport};
use formdesk_events::EventBus;
use formdesk_store::FileStore;
use formdesk_surface::{HandoffRegistry, SurfaceDeps};
use formdesk_telemetry::{GlobalContextGuard, LogFormat, LoggingConfig, Metrics};
use tokio::io::BufReader;
use tracing::{info, warn};

use crate::cli::Cli;
use crate::error::{AppError, AppResult};
use crate::shell::{Shell, spawn_renderer};

/// Entry point for the formdesk boot sequence.
///
/// # Errors
///
/// Returns an error if configuration is invalid, logging cannot be installed,
/// the forms directory cannot be prepared, or the first listing fails.
pub async fn run_app() -> AppResult<()> {
    let config = AppConfig::from_raw(Cli::parse().into_raw())
        .map_err(|err| AppError::config("config.validate", err))?;

    let logging = LoggingConfig {
        level: &config.log_level,
        format: log_format(config.log_format),
        ..LoggingConfig::default()
    };
    formdesk_telemetry::init_logging(&logging)
        .map_err(|err| AppError::telemetry("telemetry.init", err))?;
    let _context = GlobalContextGuard::new("shell");

    info!(
        forms_dir = %config.forms_dir.display(),
        downloads = config.download_url.is_some(),
        "formdesk starting"
    );

    let deps = build_dependencies(&config)?;
    let events = deps.events.clone();
    let mut shell = Shell::new(deps, BufReader::new(tokio::io::stdin()))?;
    let renderer = spawn_renderer(events.attach());
    let result = shell.run().await;
    renderer.abort();
    result
}

/// Wire the surface collaborators from validated configuration.
///
/// # Errors
///
/// Returns an error if the forms directory cannot be created, the HTTP client
/// cannot be built, or the metrics registry cannot be initialised.
pub fn build_dependencies(config: &AppConfig) -> AppResult<SurfaceDeps> {
    let store = FileStore::new(&config.forms_dir);
    store
        .ensure_directory()
        .map_err(|err| AppError::store("store.ensure_directory", err))?;

    let transport = match &config.download_url {
        Some(url) => {
            let transport =
                HttpFormTransport::with_timeout(url.clone(), &config.forms_dir, config.request_timeout)
                    .map_err(|err| AppError::download("download.transport", err))?;
            Some(Arc::new(transport) as Arc<dyn FormTransport>)
        }
        None => {
            warn!("no download url configured; downloads disabled");
            None
        }
    };

    let metrics = Metrics::new().map_err(|err| AppError::telemetry("telemetry.metrics", err))?;

    Ok(SurfaceDeps {
        store,
        registry: HandoffRegistry::new(),
        events: EventBus::new(),
        metrics,
        transport,
    })
}

const fn log_format(setting: LogFormatSetting) -> LogFormat {
    match setting {
        LogFormatSetting::Json => LogFormat::Json,
        LogFormatSetting::Pretty => LogFormat::Pretty,
        LogFormatSetting::Auto => LogFormat::infer(),
    }
}
