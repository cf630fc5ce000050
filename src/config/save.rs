use std::fs;

use super::error::ConfigError;
use super::paths::ConfigPaths;
use super::types::AppConfig;

pub fn save_config(config: &AppConfig, paths: &ConfigPaths) -> Result<(), ConfigError> {
    fs::create_dir_all(&paths.config_dir)?;
    let contents = toml::to_string_pretty(config)?;
    fs::write(&paths.config_file, contents)?;
    Ok(())
}
