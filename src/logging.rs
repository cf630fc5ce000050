use std::path::PathBuf;

use flexi_logger::{Cleanup, Criterion, FileSpec, FlexiLoggerError, Logger, LoggerHandle, Naming};

use crate::config::LoggingConfig;

/// Starts the global logger. `RUST_LOG` takes precedence over the configured
/// level. Keep the returned handle alive for as long as logging is needed.
pub fn init_logging(
    config: &LoggingConfig,
    basename: &str,
) -> Result<LoggerHandle, FlexiLoggerError> {
    let logger = Logger::try_with_env_or_str(&config.level)?;
    let Some(path) = config.path.as_ref().map(PathBuf::from) else {
        return logger.log_to_stderr().start();
    };

    let directory = path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let basename = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(basename)
        .to_string();
    logger
        .log_to_file(FileSpec::default().directory(directory).basename(basename))
        .rotate(
            Criterion::Size(config.rotate_size),
            Naming::Numbers,
            Cleanup::KeepLogFiles(config.rotate_keep),
        )
        .start()
}
