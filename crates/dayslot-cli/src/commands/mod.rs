pub mod config;
pub mod generate;
pub mod quantize;
pub mod validate;

use std::io::Read;
use std::path::{Path, PathBuf};

use dayslot_core::error::Result;
use dayslot_core::{Config, DayInput, ReferenceZone};

/// Load the config from `path` (or the default location), apply environment
/// overrides, then an explicit `--timezone` if given.
pub fn load_config(path: Option<&Path>, timezone: Option<&str>) -> Result<Config> {
    let mut config = match path {
        Some(path) if path.exists() => Config::load_from(path)?,
        Some(_) => Config::default(),
        None => Config::load()?,
    };
    config.apply_env()?;
    if let Some(tz) = timezone {
        config.timezone = tz.parse::<ReferenceZone>()?;
    }
    tracing::debug!(timezone = %config.timezone, algo = %config.default_algorithm, "loaded config");
    Ok(config)
}

/// Read a [`DayInput`] from a file, or stdin when no file is given.
pub fn read_input(path: Option<&PathBuf>) -> Result<DayInput> {
    let content = match path {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    if content.trim().is_empty() {
        return Ok(DayInput::default());
    }
    Ok(serde_json::from_str(&content)?)
}
