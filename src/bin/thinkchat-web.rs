#[path = "common/args.rs"]
mod args;
#[path = "common/bootstrap.rs"]
mod bootstrap;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;

use thinkchat::api::web::{router, WebState};
use thinkchat::client::InferenceClient;
use thinkchat::config::StorageBackend;
use thinkchat::store::{ConversationStore, JsonDirStore, MemoryStore};

use args::ServeArgs;
use bootstrap::{bootstrap, shutdown_signal};

#[derive(Parser, Debug)]
#[command(
    name = "thinkchat-web",
    about = "Chat web app that relays questions to the inference service and keeps history",
    version
)]
struct Cli {
    #[command(flatten)]
    serve: ServeArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(boot) = bootstrap(&cli.serve, "thinkchat-web")? else {
        return Ok(());
    };
    let config = &boot.loaded.config;

    let store: Arc<dyn ConversationStore> = match config.storage.backend {
        StorageBackend::Json => {
            let dir = config.storage.resolve_data_dir(&boot.loaded.paths);
            log::info!("storing chats in {}", dir.display());
            Arc::new(JsonDirStore::new(dir))
        }
        StorageBackend::Memory => {
            log::warn!("using in-memory chat storage; history is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let client = InferenceClient::new(
        config.web.inference_url.clone(),
        config.web.request_timeout(),
    )
    .context("building inference client")?;
    match client.health().await {
        Ok(health) => log::info!(
            "inference service at {} reports {:?} ({})",
            client.base_url(),
            health.status,
            health.model_name
        ),
        Err(err) => log::warn!(
            "inference service at {} not reachable yet: {err}",
            client.base_url()
        ),
    }

    let app = router(WebState::new(store, client));

    let bind = cli.serve.bind.clone().unwrap_or_else(|| config.web.bind.clone());
    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("binding {bind}"))?;
    log::info!("web app listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
