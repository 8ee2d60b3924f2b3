//! CLI argument definitions using clap derive

use crate::fetch::{Destination, Method};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// swcache - offline-first cache manager
///
/// Pre-caches an app's static assets into versioned caches and answers
/// requests cache-first, falling back to the network and then to offline
/// responses.
#[derive(Parser, Debug)]
#[command(name = "swcache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "SWCACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip local swcache.toml discovery
    #[arg(long, global = true)]
    pub no_local: bool,

    /// Cache storage directory
    #[arg(long, global = true, env = "SWCACHE_STORAGE")]
    pub storage: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register the worker: pre-cache static assets and activate the
    /// configured version
    Install(InstallArgs),

    /// Fetch a path through the active worker
    Fetch(FetchArgs),

    /// Deliver a push message
    Push(PushArgs),

    /// Deliver a background sync event
    Sync(SyncArgs),

    /// Inspect or clear caches
    Cache(CacheArgs),

    /// Show or edit configuration
    Config(ConfigArgs),

    /// Show the active version and cache summary
    Status,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the install command
#[derive(Parser, Debug)]
pub struct InstallArgs {
    /// Reinstall even if the configured version is already active
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the fetch command
#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// Path or absolute URL to fetch
    pub target: String,

    /// Request method
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: Method,

    /// Request destination (inferred from the path if omitted)
    #[arg(short, long)]
    pub destination: Option<Destination>,

    /// Simulate a network outage
    #[arg(long)]
    pub offline: bool,

    /// Write the body to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the push command
#[derive(Parser, Debug)]
pub struct PushArgs {
    /// JSON payload, e.g. '{"title":"Hi","body":"New content"}'
    pub payload: Option<String>,

    /// Click the notification afterwards with this action
    #[arg(long)]
    pub click: Option<String>,
}

/// Arguments for the sync command
#[derive(Parser, Debug)]
pub struct SyncArgs {
    /// Sync tag
    pub tag: String,

    /// Deliver a periodic sync event instead
    #[arg(long)]
    pub periodic: bool,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// List caches
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Show the entries of one cache
    Show {
        /// Cache name
        name: String,
    },

    /// Delete caches
    Clear {
        /// Only delete caches for other versions
        #[arg(long)]
        stale: bool,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Output format for listings
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Plain,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., app.version)
        key: String,

        /// Value to set
        value: String,

        /// Write to swcache.toml in the current directory
        #[arg(long)]
        local: bool,
    },
}

/// Arguments for the completions command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: Shell,
}
