use std::process;

use clap::Parser;
use granite::cli::handlers::{handle_config, handle_snapshot, handle_watch};
use granite::cli::ui::print_error;
use granite::cli::{Cli, Commands};
use granite::config::GraniteConfig;
use granite::error::{GraniteError, Result};
use granite::logging::{self, LogLevel};

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(mut config) => {
            if cli.no_color {
                config.ui.colored = false;
            }
            config
        }
        Err(error) => {
            print_error(&error, !cli.no_color && std::env::var_os("NO_COLOR").is_none());
            process::exit(1);
        }
    };

    if let Err(error) = run_app(cli, &config) {
        print_error(&error, config.ui.colored);
        process::exit(1);
    }
}

fn run_app(cli: Cli, config: &GraniteConfig) -> Result<()> {
    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        config.ui.log_level
    };
    logging::init(level, config.ui.colored)?;

    match cli.command {
        Commands::Snapshot { dir, json } => handle_snapshot(config, &dir, json),
        Commands::Watch { dir, json, command } => handle_watch(config, &dir, &command, json),
        Commands::Config { cmd } => handle_config(config, cmd),
    }
}

fn load_config(cli: &Cli) -> Result<GraniteConfig> {
    if let Some(path) = &cli.config {
        if !path.exists() {
            return Err(GraniteError::Config {
                message: "file does not exist".to_string(),
                path: Some(path.clone()),
            });
        }
        return GraniteConfig::load(path);
    }

    match cli.command.target_dir() {
        Some(dir) => GraniteConfig::merged_config(dir),
        None => GraniteConfig::load_global(),
    }
}
