use crate::cli::commands::ConfigCmd;
use crate::config::GraniteConfig;
use crate::error::Result;

/// Handle configuration operations
pub fn handle_config(config: &GraniteConfig, cmd: Option<ConfigCmd>) -> Result<()> {
    match cmd {
        Some(ConfigCmd::Show { .. }) | None => {
            print!("{}", config.to_toml()?);
        }
        Some(ConfigCmd::Path) => {
            println!("{}", GraniteConfig::global_config_path()?.display());
        }
    }
    Ok(())
}
