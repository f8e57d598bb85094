//! actionbridge entry point.
//!
//! Reads request envelopes from stdin and writes responses to stdout.
//! Diagnostics go to stderr (or rolling files when `logging.log_dir` is set).

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use actionbridge::domain::models::LoggingConfig;
use actionbridge::infrastructure::logging::LoggerImpl;
use actionbridge::infrastructure::setup::{self, SetupPaths};
use actionbridge::{ConfigLoader, StdioServer};

#[derive(Parser, Debug)]
#[command(name = "actionbridge")]
#[command(version, about = "JSON-RPC action bridge for workspace, calendar and mail services")]
struct Cli {
    /// Configuration file merged over .actionbridge/config.yaml and local.yaml
    #[arg(long, short, global = true, env = "ACTIONBRIDGE_CONFIG")]
    config: Option<PathBuf>,

    /// Override logging.level
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve envelopes over stdin/stdout (default)
    Serve,

    /// Write a default .actionbridge/config.yaml
    Init {
        /// Overwrite an existing configuration file
        #[arg(long, short)]
        force: bool,

        /// Target directory (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(cli.config, cli.log_level).await,
        Commands::Init { force, path } => init(&path, force, cli.log_level),
    }
}

async fn serve(config_path: Option<PathBuf>, log_level: Option<String>) -> ExitCode {
    let loaded = ConfigLoader::load(config_path.as_deref());

    let mut logging = loaded
        .as_ref()
        .map(|config| config.logging.clone())
        .unwrap_or_default();
    if let Some(level) = log_level {
        logging.level = level;
    }
    let _logger = match LoggerImpl::init(&logging) {
        Ok(logger) => logger,
        Err(err) => {
            eprintln!("actionbridge: failed to initialize logging: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    let config = match loaded {
        Ok(config) => Arc::new(config),
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "configuration error");
            return ExitCode::FAILURE;
        }
    };

    let dispatcher = match setup::build_dispatcher(&config) {
        Ok(dispatcher) => dispatcher,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "failed to build service clients");
            return ExitCode::FAILURE;
        }
    };

    match StdioServer::new(Arc::new(dispatcher)).run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "stdio transport failed");
            ExitCode::FAILURE
        }
    }
}

fn init(path: &std::path::Path, force: bool, log_level: Option<String>) -> ExitCode {
    let mut logging = LoggingConfig {
        format: "pretty".to_string(),
        ..LoggingConfig::default()
    };
    if let Some(level) = log_level {
        logging.level = level;
    }
    let _logger = LoggerImpl::init(&logging).ok();

    let paths = SetupPaths::new(path);
    match setup::init(&paths, force) {
        Ok(true) => {
            eprintln!("Wrote {}", paths.config_file.display());
            ExitCode::SUCCESS
        }
        Ok(false) => {
            eprintln!(
                "{} already exists. Use --force to overwrite.",
                paths.config_file.display()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("actionbridge: {err:#}");
            ExitCode::FAILURE
        }
    }
}
