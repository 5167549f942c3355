use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use stringlens_core::config;
use stringlens_core::storage::{load_store, save_store, RecordStore, StringStore};
use stringlens_server::api::create_router;
use stringlens_server::api::handlers::AppState;
use stringlens_server::api::metrics;
use stringlens_server::wal_async::WriteAheadLog;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stringlens", about = "String analysis and filtering service")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = config::DEFAULT_PORT)]
    port: u16,

    /// Data directory for persistence
    #[arg(short, long, default_value = config::DEFAULT_DATA_DIR)]
    data_dir: String,

    /// Snapshot interval in seconds (0 = disabled)
    #[arg(long, default_value_t = config::DEFAULT_SNAPSHOT_INTERVAL_SECS)]
    snapshot_interval: u64,

    /// Graceful shutdown timeout in seconds
    #[arg(long, default_value_t = config::DEFAULT_SHUTDOWN_TIMEOUT_SECS)]
    shutdown_timeout: u64,

    /// Fail startup if WAL replay encounters errors
    #[arg(long, default_value_t = false)]
    wal_strict: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(
                    "stringlens_server=info"
                        .parse()
                        .expect("valid directive literal"),
                )
                .add_directive(
                    "stringlens_core=info"
                        .parse()
                        .expect("valid directive literal"),
                ),
        )
        .init();

    let args = Args::parse();

    if args.port == 0 {
        eprintln!("Error: port must be > 0");
        std::process::exit(1);
    }
    let data_path = std::path::Path::new(&args.data_dir);
    if data_path.exists() && !data_path.is_dir() {
        eprintln!(
            "Error: data_dir '{}' exists but is not a directory",
            args.data_dir
        );
        std::process::exit(1);
    }

    let store = match load_store(&args.data_dir) {
        Ok(Some(store)) => {
            tracing::info!(records = store.len(), "Restored snapshot");
            store
        }
        Ok(None) => StringStore::new(),
        Err(e) => {
            if args.wal_strict {
                eprintln!("Error: snapshot could not be loaded (strict mode): {}", e);
                std::process::exit(1);
            }
            tracing::warn!("Could not load snapshot, starting empty: {}", e);
            StringStore::new()
        }
    };

    let wal = Arc::new(WriteAheadLog::new(&args.data_dir)?);

    match wal.replay() {
        Ok((entries, stats)) => {
            if stats.has_errors() {
                tracing::warn!(
                    "WAL replay stats: {} ok, {} skipped, {} CRC errors, truncated={}",
                    stats.success,
                    stats.skipped,
                    stats.crc_errors,
                    stats.truncated
                );
                if args.wal_strict {
                    eprintln!(
                        "Error: WAL replay encountered errors (strict mode). \
                         {} CRC errors, {} skipped, truncated={}. \
                         Fix the WAL or restart without --wal-strict.",
                        stats.crc_errors, stats.skipped, stats.truncated
                    );
                    std::process::exit(1);
                }
            }
            if !entries.is_empty() {
                tracing::info!("Replaying {} WAL entries", entries.len());
                let applied = store.apply_wal(&entries);
                tracing::info!(
                    "WAL replay complete: {applied}/{} entries applied",
                    entries.len()
                );
            }
        }
        Err(e) => {
            if args.wal_strict {
                eprintln!(
                    "Error: WAL replay failed (strict mode): {}. \
                     Fix the WAL or restart without --wal-strict.",
                    e
                );
                std::process::exit(1);
            }
            tracing::warn!("WAL replay failed: {}", e);
        }
    }

    let prometheus_handle =
        metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?;

    let wal_path = wal.path().to_path_buf();

    let state = AppState {
        store: store.clone(),
        wal: wal.clone(),
        wal_path: wal_path.clone(),
        prometheus_handle,
        start_time: Instant::now(),
    };

    let app = create_router(state);
    let addr = format!("0.0.0.0:{}", args.port);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        port = args.port,
        data_dir = %args.data_dir,
        snapshot_interval_secs = args.snapshot_interval,
        records = store.len(),
        "stringlens ready"
    );

    spawn_metrics_task(store.clone(), wal_path);
    if args.snapshot_interval > 0 {
        spawn_snapshot_task(
            store.clone(),
            wal.clone(),
            args.data_dir.clone(),
            args.snapshot_interval,
        );
    }

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_signal())
        .await?;

    flush_and_shutdown(&store, &wal, &args.data_dir, args.shutdown_timeout);

    Ok(())
}

fn spawn_metrics_task(store: StringStore, wal_path: PathBuf) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(15));
        loop {
            interval.tick().await;
            metrics::update_store_metrics(&store);
            metrics::update_wal_metrics(&wal_path);
        }
    });
}

fn spawn_snapshot_task(
    store: StringStore,
    wal: Arc<WriteAheadLog>,
    data_dir: String,
    interval_secs: u64,
) {
    tracing::info!("Auto-snapshots enabled every {}s", interval_secs);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        interval.tick().await;
        loop {
            interval.tick().await;
            tracing::info!("Running periodic snapshot...");
            let _mutations = wal.lock_mutations().await;
            let _gate = wal.freeze();
            match save_store(&store, &data_dir) {
                Ok(()) => {
                    if let Err(e) = wal.truncate() {
                        tracing::error!("WAL truncate after snapshot failed: {}", e);
                    } else {
                        tracing::info!(records = store.len(), "Periodic snapshot complete, WAL truncated");
                    }
                }
                Err(e) => tracing::error!("Snapshot failed: {}", e),
            }
        }
    });
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }

    tracing::info!("Shutting down gracefully, draining in-flight requests...");
}

fn flush_and_shutdown(store: &StringStore, wal: &WriteAheadLog, data_dir: &str, timeout_secs: u64) {
    tracing::info!("All requests drained, flushing data...");

    let _gate = wal.freeze();

    let start = Instant::now();
    let result = save_store(store, data_dir);
    if start.elapsed() > Duration::from_secs(timeout_secs) {
        tracing::warn!(
            "Shutdown flush took longer than {}s ({:?})",
            timeout_secs,
            start.elapsed()
        );
    }

    match result {
        Ok(()) => {
            tracing::info!(records = store.len(), "Saved snapshot on shutdown");
            if let Err(e) = wal.truncate() {
                tracing::error!("Failed to truncate WAL: {}", e);
            } else {
                tracing::info!("WAL truncated after successful flush");
            }
        }
        Err(e) => {
            tracing::error!("Failed to save snapshot: {}", e);
            tracing::warn!("Snapshot failed, WAL preserved for recovery");
        }
    }
}
