use keel_daemon::config::{MANIFEST_DIR_ENV, config_path, load_config};
use keel_daemon::engine::EngineBuilder;
use keel_daemon::logging::{LOG_FORMAT_ENV, LogFormat, init_tracing};
use keel_daemon::manifests::load_manifests;
use tokio::sync::watch;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    init_tracing(LogFormat::from_env_value(
        std::env::var(LOG_FORMAT_ENV).ok().as_deref(),
    ));

    let path = config_path()?;
    let config = load_config(&path)?;
    let manifest_dir = config.resolve_manifest_dir(std::env::var(MANIFEST_DIR_ENV).ok());

    let engine = EngineBuilder::new(config).build().await;
    warn!("no resource handlers registered; resource checks will record errors");

    if let Some(dir) = manifest_dir {
        for manifest in load_manifests(&dir)? {
            let name = manifest.name.clone();
            let persisted = engine.persister.upsert(manifest).await?;
            info!(
                delivery_config = %name,
                created = persisted.created.len(),
                updated = persisted.updated.len(),
                deleted = persisted.deleted.len(),
                "delivery config loaded"
            );
        }
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = engine.scheduler.clone();
    let worker = tokio::spawn(async move { scheduler.run(shutdown_rx).await });

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    let _ = shutdown_tx.send(true);
    worker.await?;
    Ok(())
}
