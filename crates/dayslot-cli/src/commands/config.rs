use std::path::Path;

use clap::Subcommand;
use dayslot_core::error::Result;
use dayslot_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "timezone", "default_algorithm")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
    /// Print the config file location
    Path,
}

pub fn run(action: ConfigAction, config_path: Option<&Path>) -> Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = load(config_path)?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(dayslot_core::ConfigError::UnknownKey(key).into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = load(config_path)?;
            config.set(&key, &value)?;
            save(&config, config_path)?;
            println!("ok");
        }
        ConfigAction::List => {
            let config = load(config_path)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Reset => {
            save(&Config::default(), config_path)?;
            println!("config reset to defaults");
        }
        ConfigAction::Path => match config_path {
            Some(path) => println!("{}", path.display()),
            None => println!("{}", Config::path()?.display()),
        },
    }
    Ok(())
}

// File contents only; environment overrides are not persisted.
fn load(config_path: Option<&Path>) -> Result<Config> {
    Ok(match config_path {
        Some(path) if path.exists() => Config::load_from(path)?,
        Some(_) => Config::default(),
        None => Config::load()?,
    })
}

fn save(config: &Config, config_path: Option<&Path>) -> Result<()> {
    match config_path {
        Some(path) => config.save_to(path)?,
        None => config.save()?,
    }
    Ok(())
}
