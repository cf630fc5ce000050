use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::ConfigPaths;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Json,
    Memory,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub data_dir: Option<String>,
}

impl StorageConfig {
    pub fn resolve_data_dir(&self, paths: &ConfigPaths) -> PathBuf {
        self.data_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| paths.chats_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_dir_defaults_under_share() {
        let paths = ConfigPaths {
            config_file: PathBuf::from("/etc/thinkchat/config.toml"),
            config_dir: PathBuf::from("/etc/thinkchat"),
            data_dir: PathBuf::from("/var/lib/thinkchat"),
        };
        let config = StorageConfig::default();
        assert_eq!(config.backend, StorageBackend::Json);
        assert_eq!(
            config.resolve_data_dir(&paths),
            PathBuf::from("/var/lib/thinkchat/chats")
        );

        let custom = StorageConfig {
            data_dir: Some("/srv/chats".into()),
            ..StorageConfig::default()
        };
        assert_eq!(custom.resolve_data_dir(&paths), PathBuf::from("/srv/chats"));
    }

    #[test]
    fn backend_names_are_lowercase() {
        let config: StorageConfig = toml::from_str("backend = \"memory\"").unwrap();
        assert_eq!(config.backend, StorageBackend::Memory);
        assert!(toml::from_str::<StorageConfig>("backend = \"mongo\"").is_err());
    }
}
