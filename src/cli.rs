//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::nba_stats_adapter::NbaStatsAdapter;
use crate::domain::config_validation::validate_config;
use crate::domain::error::SportstockError;
use crate::domain::pricing::PricingEngine;
use crate::domain::roster::DEFAULT_ROSTER_SIZE;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_LOG_FILTER: &str = "info,sportstock=debug";

#[derive(Parser, Debug)]
#[command(name = "sportstock", about = "Player stock exchange priced by real game stats")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP API server
    Serve {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Populate assets from the statistics source
    Seed {
        #[arg(short, long)]
        config: PathBuf,
        /// Delete every asset, match log and price history row first
        #[arg(long)]
        reset: bool,
    },
    /// Sync every asset against its latest game
    Sync {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Serve { config } => run_serve(&config),
        Command::Seed { config, reset } => run_seed(&config, reset),
        Command::Sync { config } => run_sync(&config),
        Command::Validate { config } => run_validate(&config),
    }
}

fn fail(err: &SportstockError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| fail(&e))
}

/// Load and validate a config file, then start logging with its filter.
fn prepare(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    let config = load_config(path)?;
    validate_config(&config).map_err(|e| fail(&e))?;
    init_logging(&config);
    Ok(config)
}

/// `RUST_LOG` wins over `[logging] filter`. Safe to call more than once.
pub fn init_logging(config: &dyn ConfigPort) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let configured = config
            .get_string("logging", "filter")
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
        EnvFilter::try_new(&configured).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}

pub fn build_stats_source(config: &dyn ConfigPort) -> Result<NbaStatsAdapter, ExitCode> {
    NbaStatsAdapter::from_config(config).map_err(|e| fail(&e))
}

pub fn build_pricing(config: &dyn ConfigPort) -> Result<PricingEngine, ExitCode> {
    PricingEngine::from_config(config).map_err(|e| fail(&e))
}

pub fn roster_size(config: &dyn ConfigPort) -> usize {
    config
        .get_int("stats", "top_players_limit", DEFAULT_ROSTER_SIZE as i64)
        .max(1) as usize
}

#[cfg(feature = "sqlite")]
pub fn open_store(
    config: &dyn ConfigPort,
) -> Result<crate::adapters::sqlite_adapter::SqliteAdapter, ExitCode> {
    use crate::adapters::sqlite_adapter::SqliteAdapter;

    let store = SqliteAdapter::from_config(config).map_err(|e| fail(&e))?;
    store.initialize_schema().map_err(|e| fail(&e))?;
    Ok(store)
}

fn runtime() -> Result<tokio::runtime::Runtime, ExitCode> {
    tokio::runtime::Runtime::new().map_err(|e| fail(&SportstockError::Io(e)))
}

/// Everything a store-backed command needs, built from one config file.
#[cfg(feature = "sqlite")]
struct Services {
    config: FileConfigAdapter,
    store: crate::adapters::sqlite_adapter::SqliteAdapter,
    stats: NbaStatsAdapter,
    pricing: PricingEngine,
    runtime: tokio::runtime::Runtime,
}

#[cfg(feature = "sqlite")]
impl Services {
    fn load(config_path: &PathBuf) -> Result<Self, ExitCode> {
        let config = prepare(config_path)?;
        let pricing = build_pricing(&config)?;
        let store = open_store(&config)?;
        let stats = build_stats_source(&config)?;
        let runtime = runtime()?;
        Ok(Self {
            config,
            store,
            stats,
            pricing,
            runtime,
        })
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("error: failed to encode output: {e}"),
    }
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    if let Err(e) = validate_config(&config) {
        return fail(&e);
    }

    eprintln!("Configuration is valid");
    ExitCode::SUCCESS
}

fn run_seed(config_path: &PathBuf, reset: bool) -> ExitCode {
    #[cfg(feature = "sqlite")]
    {
        use crate::domain::roster::seed_assets;

        let Services {
            config,
            store,
            stats,
            runtime,
            ..
        } = match Services::load(config_path) {
            Ok(s) => s,
            Err(code) => return code,
        };

        match runtime.block_on(seed_assets(&store, &stats, roster_size(&config), reset)) {
            Ok(outcome) => {
                eprintln!("{}", outcome.message());
                print_json(&outcome);
                ExitCode::SUCCESS
            }
            Err(e) => fail(&e),
        }
    }

    #[cfg(not(feature = "sqlite"))]
    {
        let _ = (config_path, reset);
        eprintln!("error: sqlite feature is required for seed");
        ExitCode::from(1)
    }
}

fn run_sync(config_path: &PathBuf) -> ExitCode {
    #[cfg(feature = "sqlite")]
    {
        use crate::domain::sync::sync_all;

        let Services {
            store,
            stats,
            pricing,
            runtime,
            ..
        } = match Services::load(config_path) {
            Ok(s) => s,
            Err(code) => return code,
        };

        match runtime.block_on(sync_all(&store, &stats, &pricing)) {
            Ok(report) => {
                eprintln!(
                    "Synced {} assets: {} updated, {} already recorded, {} unavailable, {} failed",
                    report.total(),
                    report.updated,
                    report.already_recorded,
                    report.unavailable,
                    report.failed
                );
                print_json(&report);
                ExitCode::SUCCESS
            }
            Err(e) => fail(&e),
        }
    }

    #[cfg(not(feature = "sqlite"))]
    {
        let _ = config_path;
        eprintln!("error: sqlite feature is required for sync");
        ExitCode::from(1)
    }
}

fn run_serve(config_path: &PathBuf) -> ExitCode {
    #[cfg(feature = "web")]
    {
        use crate::adapters::web::{AppState, DEFAULT_CORS_ORIGIN, build_router};
        use crate::domain::config_validation::DEFAULT_LISTEN;
        use std::net::SocketAddr;
        use std::sync::Arc;
        use tracing::{error, info};

        let Services {
            config,
            store,
            stats,
            pricing,
            runtime,
        } = match Services::load(config_path) {
            Ok(s) => s,
            Err(code) => return code,
        };

        let listen = config
            .get_string("server", "listen")
            .unwrap_or_else(|| DEFAULT_LISTEN.to_string());
        let addr: SocketAddr = match listen.parse() {
            Ok(a) => a,
            Err(e) => {
                return fail(&SportstockError::ConfigInvalid {
                    section: "server".into(),
                    key: "listen".into(),
                    reason: format!("{e}"),
                });
            }
        };

        let mut cors_origins = config.get_list("server", "cors_origins");
        if cors_origins.is_empty() {
            cors_origins.push(DEFAULT_CORS_ORIGIN.to_string());
        }

        let state = AppState {
            store: Arc::new(store),
            stats: Arc::new(stats),
            pricing,
            roster_size: roster_size(&config),
            cors_origins,
        };
        let router = build_router(state);

        let served = runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind(addr).await?;
            info!(%addr, "sportstock API listening");
            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await
        });

        match served {
            Ok(()) => {
                info!("server stopped");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!(error = %e, "server failed");
                fail(&SportstockError::Io(e))
            }
        }
    }

    #[cfg(not(feature = "web"))]
    {
        let _ = config_path;
        eprintln!("error: web feature is required for serve");
        ExitCode::from(1)
    }
}

#[cfg(feature = "web")]
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl+C handler");
    }
}
