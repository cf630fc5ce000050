use anyhow::Context;
use flexi_logger::LoggerHandle;

use thinkchat::config::{load_config, save_config, LoadedConfig};
use thinkchat::logging::init_logging;

use super::args::ServeArgs;

pub struct Bootstrapped {
    pub loaded: LoadedConfig,
    pub _logger: LoggerHandle,
}

/// Loads config and starts logging. Returns `None` when the invocation only
/// asked for a config file to be written.
pub fn bootstrap(args: &ServeArgs, name: &str) -> anyhow::Result<Option<Bootstrapped>> {
    let loaded = load_config(args.config.clone()).context("loading configuration")?;

    if args.init_config {
        if loaded.config_exists {
            println!("config already exists: {}", loaded.paths.config_file.display());
        } else {
            save_config(&loaded.config, &loaded.paths).context("writing default configuration")?;
            println!("wrote {}", loaded.paths.config_file.display());
        }
        return Ok(None);
    }

    let mut logging = loaded.config.logging.clone();
    if let Some(level) = &args.log_level {
        logging.level = level.clone();
    }
    let logger = init_logging(&logging, name).context("starting logger")?;

    if loaded.config_exists {
        log::info!("loaded config from {}", loaded.paths.config_file.display());
    } else {
        log::info!(
            "no config at {}, using defaults",
            loaded.paths.config_file.display()
        );
    }
    Ok(Some(Bootstrapped {
        loaded,
        _logger: logger,
    }))
}

pub async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::warn!("cannot listen for ctrl-c: {err}");
        std::future::pending::<()>().await;
    }
    log::info!("shutting down");
}
