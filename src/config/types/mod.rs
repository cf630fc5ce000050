mod app;
mod inference;
mod logging;
mod storage;
mod web;

const DEFAULT_LOG_ROTATE_SIZE: u64 = 10 * 1024 * 1024;
const DEFAULT_LOG_ROTATE_KEEP: usize = 5;

pub use app::AppConfig;
pub use inference::InferenceConfig;
pub use logging::LoggingConfig;
pub use storage::{StorageBackend, StorageConfig};
pub use web::WebConfig;
