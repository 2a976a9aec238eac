//! CLI command definitions and handlers

use clap::{Args, Parser, Subcommand};
pub use clap_complete::Shell;

use completions::{workout_id_candidates, workout_type_candidates};

pub mod args;
pub mod cache;
pub mod completions;
pub mod context;
pub mod fetch;
pub mod init;
pub mod status;
pub mod workout;

pub use args::{GlobalOptions, OutputFormat};
pub use context::CommandContext;

/// Pitchside - football training log with an offline-first asset cache
#[derive(Parser, Debug)]
#[command(name = "pitchside")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (pretty, table, json)
    #[arg(
        long,
        global = true,
        env = "PITCHSIDE_FORMAT",
        default_value = "pretty",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "PITCHSIDE_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Override data directory (workouts and cache databases)
    #[arg(long, global = true, env = "PITCHSIDE_DATA_DIR", hide_env = true)]
    pub data_dir: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "PITCHSIDE_DEBUG", hide_env = true)]
    pub debug: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize pitchside configuration
    Init,

    /// Show configuration, cache and workout status
    Status,

    /// Display version information
    Version,

    /// Log a workout
    Log(LogArgs),

    /// Show the most recent workouts
    List,

    /// Delete a workout
    Delete {
        /// Workout ID
        #[arg(add = workout_id_candidates())]
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Export all workouts to CSV
    Export {
        /// Directory to write the file into (defaults to the current directory)
        #[arg(long, short = 'd')]
        dir: Option<String>,
    },

    /// Fetch a site resource through the offline cache
    Fetch(FetchArgs),

    /// Manage the offline asset cache
    #[command(subcommand)]
    Cache(CacheCommands),

    /// Generate shell completions (static)
    #[command(after_help = "\
Static completions (subcommands/flags only):
  bash:   pitchside completion bash > /etc/bash_completion.d/pitchside
  zsh:    pitchside completion zsh > \"${fpath[1]}/_pitchside\"
  fish:   pitchside completion fish > ~/.config/fish/completions/pitchside.fish

Dynamic completions (includes workout IDs):
  bash:   echo 'source <(COMPLETE=bash pitchside)' >> ~/.bashrc
  zsh:    echo 'source <(COMPLETE=zsh pitchside)' >> ~/.zshrc
  fish:   echo 'COMPLETE=fish pitchside | source' >> ~/.config/fish/config.fish

Re-source completions after upgrading pitchside.")]
    Completion {
        /// Shell to generate completions for (static only)
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments for `pitchside log`.
///
/// Values are taken as text and checked by the workout validator, so a bad
/// duration gets the same message as in the tracker's form.
#[derive(Args, Debug, Clone)]
pub struct LogArgs {
    /// Workout type (cardio, strength, skills, match, recovery)
    #[arg(long = "type", short = 't', add = workout_type_candidates())]
    pub kind: Option<String>,

    /// Duration in minutes
    #[arg(long, short = 'd', allow_hyphen_values = true)]
    pub duration: Option<String>,

    /// Intensity from 1 to 10
    #[arg(long, short = 'i', allow_hyphen_values = true)]
    pub intensity: Option<String>,

    /// Free-form notes
    #[arg(long, short = 'n')]
    pub notes: Option<String>,
}

/// Arguments for `pitchside fetch`
#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// Path on the configured origin, or an absolute URL
    pub target: String,

    /// Treat the request as a page navigation (eligible for the offline page)
    #[arg(long)]
    pub navigate: bool,

    /// HTTP method
    #[arg(long, short = 'X', default_value = "GET")]
    pub method: String,

    /// Write the response body to a file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<String>,
}

/// Offline cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Show cache statistics
    Status,

    /// Install the configured cache version and purge older ones
    Update,

    /// Clear all cached entries
    Clear,

    /// Show cache database path
    Path,
}
