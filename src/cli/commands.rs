use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "granite", version, about = "Snapshot a directory and report which files changed")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file (defaults to ~/.granite/config.toml plus DIR/.granite.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Capture DIR and list every file with its fingerprint
    Snapshot {
        dir: PathBuf,
        #[arg(long, help = "Print the snapshot as JSON")]
        json: bool,
    },

    /// Run a command in DIR and report the files it added, removed, modified or touched
    Watch {
        dir: PathBuf,
        #[arg(long, help = "Print the diff as JSON")]
        json: bool,
        #[arg(last = true, required = true, num_args = 1.., value_name = "COMMAND")]
        command: Vec<String>,
    },

    /// Show configuration information
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCmd>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCmd {
    /// Show the effective configuration
    Show {
        /// Directory whose .granite.toml should be merged in
        dir: Option<PathBuf>,
    },
    /// Print the global configuration file path
    Path,
}

impl Commands {
    /// Directory the command operates on, used to find its project config
    pub fn target_dir(&self) -> Option<&PathBuf> {
        match self {
            Commands::Snapshot { dir, .. } | Commands::Watch { dir, .. } => Some(dir),
            Commands::Config {
                cmd: Some(ConfigCmd::Show { dir }),
            } => dir.as_ref(),
            Commands::Config { .. } => None,
        }
    }
}
