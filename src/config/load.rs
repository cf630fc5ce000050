use std::fs;
use std::path::{Path, PathBuf};

use super::error::ConfigError;
use super::paths::ConfigPaths;
use super::types::AppConfig;

#[derive(Debug)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub paths: ConfigPaths,
    pub config_exists: bool,
}

/// Reads the config file, falling back to defaults when it does not exist.
pub fn load_config(path_override: Option<PathBuf>) -> Result<LoadedConfig, ConfigError> {
    let paths = ConfigPaths::resolve(path_override)?;
    let read = read_config(&paths.config_file)?;
    Ok(LoadedConfig {
        config: read.config,
        paths,
        config_exists: read.exists,
    })
}

fn read_config(path: &Path) -> Result<ConfigRead, ConfigError> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(ConfigRead {
            config: toml::from_str(&contents)?,
            exists: true,
        }),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(ConfigRead {
            config: AppConfig::default(),
            exists: false,
        }),
        Err(err) => Err(ConfigError::Io(err)),
    }
}

struct ConfigRead {
    config: AppConfig,
    exists: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageBackend;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config(Some(dir.path().join("absent.toml"))).unwrap();
        assert!(!loaded.config_exists);
        assert_eq!(loaded.config.web.bind, "127.0.0.1:8001");
        assert_eq!(loaded.config.inference.default_max_tokens, 256);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[inference]\nmodel = \"qwen3:1.7b\"\n\n[storage]\nbackend = \"memory\"\n",
        )
        .unwrap();

        let loaded = load_config(Some(path)).unwrap();
        assert!(loaded.config_exists);
        assert_eq!(loaded.config.inference.model, "qwen3:1.7b");
        assert_eq!(loaded.config.inference.stream_buffer, 32);
        assert_eq!(loaded.config.storage.backend, StorageBackend::Memory);
        assert_eq!(loaded.paths.config_dir, dir.path());
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[web\nbind = 1").unwrap();
        let err = load_config(Some(path)).unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
        assert!(err.to_string().starts_with("invalid thinkchat config: "));
    }
}
