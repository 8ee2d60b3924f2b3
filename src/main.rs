//! swcache - offline-first cache manager
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use std::process::ExitCode;
use swcache::cli::{commands, Cli, Commands};
use swcache::config::{Config, ConfigManager};
use swcache::error::{SwError, SwResult};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8, config: &Config) {
    // 0 = warn (spinners only), 1 = info, 2+ = debug
    let filter = match verbose {
        0 => EnvFilter::new("swcache=warn"),
        1 => EnvFilter::new("swcache=info"),
        _ => EnvFilter::new("swcache=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}

async fn run() -> SwResult<()> {
    let cli = Cli::parse();

    // Completions don't need config loading
    if let Commands::Completions(args) = cli.command {
        commands::completions(args);
        return Ok(());
    }

    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };

    // Find local config unless --no-local is set
    let local_config_path = if cli.no_local {
        None
    } else {
        let cwd = std::env::current_dir()
            .map_err(|e| SwError::io("getting current directory", e))?;
        ConfigManager::find_local_config(&cwd)
    };

    let mut config = config_manager
        .load_merged(local_config_path.as_deref())
        .await?;
    if let Some(dir) = cli.storage {
        config.storage.dir = Some(dir);
    }

    init_logging(cli.verbose, &config);
    match local_config_path {
        Some(ref path) => debug!("Using local config: {}", path.display()),
        None if cli.no_local => debug!("Local config discovery disabled (--no-local)"),
        None => {}
    }

    swcache::ui::init_theme();

    match cli.command {
        Commands::Completions(_) => unreachable!("Completions handled above"),
        Commands::Install(args) => commands::install(args, &config).await,
        Commands::Fetch(args) => commands::fetch(args, &config).await,
        Commands::Push(args) => commands::push(args, &config).await,
        Commands::Sync(args) => commands::sync(args, &config).await,
        Commands::Cache(args) => commands::cache(args, &config).await,
        Commands::Config(args) => commands::config(args, &config, &config_manager).await,
        Commands::Status => commands::status(&config).await,
    }
}
