//! Interval Runner - an interval countdown sequencer for treadmill workouts
//!
//! This is the main entry point: it loads presets, builds the engine and
//! serves the local control API until a shutdown signal arrives.

use std::sync::Arc;
use tokio::{net::TcpListener, sync::broadcast};
use tracing::info;

use interval_runner::{
    api::create_router,
    config::Config,
    engine::Engine,
    notify::{AlertNotifier, Permission},
    presets::{JsonFileStore, KeyValueStore, MemoryStore, PresetStore},
    queue::Queue,
    state::AppState,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("interval_runner={},tower_http=info", config.log_level()))
        .init();

    info!("Starting interval-runner v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, tick={}ms",
        config.host, config.port, config.tick_ms
    );

    let backend: Box<dyn KeyValueStore> = match config.presets_path() {
        Some(path) => {
            info!("Presets file: {}", path.display());
            Box::new(JsonFileStore::new(path))
        }
        None => {
            info!("Presets kept in memory only");
            Box::new(MemoryStore::new())
        }
    };
    let presets = PresetStore::open(backend);

    // Permission is settled once, before any workout runs
    let permission = Permission::request(config.deny_notifications);
    let (notice_tx, _) = broadcast::channel(32);
    let notifier = AlertNotifier::new(permission, !config.no_bell, notice_tx.clone());

    let engine = Engine::new(
        Queue::with_default_item(),
        config.tick_period(),
        Arc::new(notifier),
    );
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        engine,
        presets,
        notice_tx,
    ));

    let app = create_router(Arc::clone(&state));

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET    /status             - Engine snapshot and server status");
    info!("  GET    /events             - Live snapshots and completions (SSE)");
    info!("  GET    /queue              - List queued segments");
    info!("  POST   /queue/items        - Add a segment");
    info!("  PATCH  /queue/items/:id    - Edit a segment");
    info!("  DELETE /queue/items/:id    - Remove a segment");
    info!("  POST   /queue/move         - Reorder a segment");
    info!("  POST   /engine/{{start,pause,resume,stop}}");
    info!("  GET    /presets, POST /presets, PATCH|DELETE /presets/:id, POST /presets/:id/load");

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    state.stop();
    info!("Server shutdown complete");
    Ok(())
}
