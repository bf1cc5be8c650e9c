//! CLI command implementations
//!
//! Each command loads the merged configuration, installs logging and runs
//! on its own tokio runtime.

use std::path::Path;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::blog::models::all_schemas;
use crate::config::{self, AppConfig, LogConfig};
use crate::http_server::{AppState, HttpServer};
use crate::orm::Database;

use super::args::Command;
use super::errors::{CliError, CliResult};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve {
            config,
            overrides,
            port,
        } => serve(&config, overrides.as_deref(), port),
        Command::InitDb { config, overrides } => init_db(&config, overrides.as_deref()),
    }
}

/// Install the global tracing subscriber. `RUST_LOG` wins over the config.
pub fn init_logging(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    // A subscriber may already be installed, e.g. by tests
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(log.ansi)
        .try_init();
}

fn load_config(config_path: &Path, overrides: Option<&Path>) -> CliResult<AppConfig> {
    let config = config::load(config_path, overrides)?;
    init_logging(&config.log);
    info!(path = %config_path.display(), "configuration loaded");
    Ok(config)
}

/// Single-threaded runtime; handlers interleave only at await points
fn runtime() -> CliResult<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))
}

/// Create every table the application needs
pub fn init_db(config_path: &Path, overrides: Option<&Path>) -> CliResult<()> {
    let config = load_config(config_path, overrides)?;
    runtime()?.block_on(create_tables(&config))
}

async fn create_tables(config: &AppConfig) -> CliResult<()> {
    let db = Database::connect(&config.db).await?;
    db.create_tables(&all_schemas()).await?;
    info!(url = %config.db.url, "database initialized");
    db.close().await;
    Ok(())
}

/// Connect the pool and serve the HTTP API until the process is stopped
pub fn serve(config_path: &Path, overrides: Option<&Path>, port: Option<u16>) -> CliResult<()> {
    let mut config = load_config(config_path, overrides)?;
    if let Some(port) = port {
        config.server.port = port;
    }
    runtime()?.block_on(run_server(config))
}

async fn run_server(config: AppConfig) -> CliResult<()> {
    let db = Database::connect(&config.db).await?;
    if config.db.is_in_memory() {
        db.create_tables(&all_schemas()).await?;
    }
    let state = AppState::new(db.clone(), config.session);
    let server = HttpServer::with_config(config.server, state)?;

    let result = server
        .start()
        .await
        .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)));
    db.close().await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::runtime::RuntimeFlavor;

    #[test]
    fn test_runtime_is_current_thread() {
        let rt = runtime().unwrap();
        assert_eq!(rt.handle().runtime_flavor(), RuntimeFlavor::CurrentThread);
    }

    #[test]
    fn test_in_memory_tables_visible_to_every_request() {
        let mut config = AppConfig::default();
        config.db.url = "sqlite::memory:".to_string();
        config.db.max_connections = 10;

        runtime().unwrap().block_on(async {
            let db = Database::connect(&config.db).await.unwrap();
            db.create_tables(&all_schemas()).await.unwrap();
            let counts = futures_util::future::try_join_all(
                (0..4).map(|_| db.select("select count(*) as n from `blogs`", &[], None)),
            )
            .await
            .unwrap();
            assert_eq!(counts.len(), 4);
        });
    }
}
