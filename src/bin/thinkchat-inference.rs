#[path = "common/args.rs"]
mod args;
#[path = "common/bootstrap.rs"]
mod bootstrap;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;

use thinkchat::api::inference::{router, InferenceState};
use thinkchat::generation::{OllamaGenerator, TextGenerator};

use args::ServeArgs;
use bootstrap::{bootstrap, shutdown_signal};

#[derive(Parser, Debug)]
#[command(
    name = "thinkchat-inference",
    about = "Serves a reasoning model over HTTP with synchronous and streaming endpoints",
    version
)]
struct Cli {
    #[command(flatten)]
    serve: ServeArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(boot) = bootstrap(&cli.serve, "thinkchat-inference")? else {
        return Ok(());
    };
    let config = &boot.loaded.config.inference;

    let generator = OllamaGenerator::new(
        config.runtime_url.clone(),
        Some(config.model.clone()),
        Some(config.device.clone()),
        Some(config.system_prompt.clone()),
    )
    .context("building model runtime client")?;
    log::info!(
        "using model {} at {}",
        generator.model(),
        generator.base_url()
    );
    if let Err(err) = generator.warm_up().await {
        log::warn!("model warm-up failed, continuing: {err}");
    }

    let generator: Arc<dyn TextGenerator> = Arc::new(generator);
    let app = router(InferenceState::new(generator, config.settings()));

    let bind = cli.serve.bind.clone().unwrap_or_else(|| config.bind.clone());
    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("binding {bind}"))?;
    log::info!("inference service listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
