//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Zani - context cache manager for coding agents
///
/// Keeps one remote context cache per workspace and decides, from how far
/// the files have drifted, when it has to be rebuilt.
#[derive(Parser, Debug)]
#[command(name = "zani")]
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
    #[arg(short, long, global = true, env = "ZANI_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip local .zani.toml discovery
    #[arg(long, global = true)]
    pub no_local: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Assess the workspace and create its context cache
    Init(InitArgs),

    /// Show the active cache and how far the workspace has drifted
    Status(StatusArgs),

    /// Evaluate the workspace and create or rebuild the cache if needed
    Check(CheckArgs),

    /// Terminate the active cache
    Stop(StopArgs),

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the init command
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Create the cache without prompting
    #[arg(short, long)]
    pub yes: bool,

    /// Workspace root (defaults to current directory)
    #[arg(short, long)]
    pub path: Option<PathBuf>,
}

/// Arguments for the status command
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,

    /// Workspace root (defaults to current directory)
    #[arg(short, long)]
    pub path: Option<PathBuf>,
}

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Create or rebuild without prompting
    #[arg(short, long)]
    pub yes: bool,

    /// Workspace root (defaults to current directory)
    #[arg(short, long)]
    pub path: Option<PathBuf>,
}

/// Arguments for the stop command
#[derive(Parser, Debug)]
pub struct StopArgs {
    /// Terminate without prompting
    #[arg(short, long)]
    pub yes: bool,

    /// Workspace root (defaults to current directory)
    #[arg(short, long)]
    pub path: Option<PathBuf>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
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
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., explicit_cache.ttl_hours)
        key: String,
        /// Value to set
        value: String,
        /// Write to project-local .zani.toml instead of global config
        #[arg(long)]
        local: bool,
    },
}

/// Output format for status
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Table,
    /// JSON output
    Json,
}
