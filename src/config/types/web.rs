use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client::DEFAULT_TIMEOUT_SECS;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WebConfig {
    pub bind: String,
    pub inference_url: String,
    pub request_timeout_secs: u64,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8001".to_string(),
            inference_url: "http://localhost:8000".to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl WebConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
