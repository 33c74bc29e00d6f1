pub mod config_cmd;
pub mod migrate;
pub mod serve;
pub mod story;

use inkwell_config::AppConfig;
use std::path::Path;

/// Load the config from `--config` when given, otherwise the default path.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => AppConfig::load_with_env(path),
        None => AppConfig::load(),
    };
    Ok(config.map_err(|e| format!("Failed to load config: {e}"))?)
}
