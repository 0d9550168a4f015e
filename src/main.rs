use capture_indexer::config::ArchiveConfig;
use capture_indexer::pipeline::capabilities::{CwebpCli, TesseractCli};
use capture_indexer::pipeline::scheduler::Pipeline;
use capture_indexer::search::handlers::router;
use capture_indexer::storage::memory::ArchiveStore;
use capture_indexer::storage::snapshot::SnapshotStore;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        eprintln!("Usage: {} [--data-dir <path>] [--bind <addr:port>]", args[0]);
        eprintln!("Example: {} --data-dir ~/captures --bind 127.0.0.1:5000", args[0]);
        return Ok(());
    }

    let mut config = ArchiveConfig::from_env()?;
    config.apply_args(&args)?;

    // An unreadable capture directory is the only fatal condition.
    Pipeline::verify_data_dir(&config.data_dir)?;
    tracing::info!("Capture directory: {}", config.data_dir.display());

    let snapshots = SnapshotStore::new(&config.data_dir);
    let state = snapshots.load();
    tracing::info!(
        "Loaded {} page records ({} source tokens, {} on-screen tokens)",
        state.page_count(),
        state.source_index.token_count(),
        state.onscreen_index.token_count()
    );
    if state.source_index.is_empty() && state.onscreen_index.is_empty() {
        tracing::info!("No index snapshots found, indexing from the capture files on disk");
    }
    let store = ArchiveStore::new(state);

    let ocr = Arc::new(TesseractCli::new(
        config.tesseract_program.clone(),
        config.ocr_language.clone(),
    ));
    let codec = Arc::new(CwebpCli::new(config.cwebp_program.clone()));

    let cancel = CancellationToken::new();
    let pipeline = Pipeline::new(&config, store.clone(), ocr, codec);
    let worker = pipeline.start(cancel.clone());

    let config = Arc::new(config);
    let app = router(store, config.clone());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Search API listening on http://{}", config.bind_addr);

    let shutdown = cancel.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutdown requested");
            shutdown.cancel();
        })
        .await?;

    // The worker finishes its current file before stopping.
    cancel.cancel();
    if let Err(e) = worker.await {
        tracing::error!("Pipeline worker ended abnormally: {}", e);
    }

    tracing::info!("Stopped");
    Ok(())
}
