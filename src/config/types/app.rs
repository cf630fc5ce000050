use serde::{Deserialize, Serialize};

use super::{InferenceConfig, LoggingConfig, StorageConfig, WebConfig};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub inference: InferenceConfig,
    pub web: WebConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}
