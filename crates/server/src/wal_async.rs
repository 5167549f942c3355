//! Async write-ahead log with group commit for the HTTP server.
//!
//! Concurrent appends are funneled through a tokio channel to a single
//! background task that writes a batch of frames and fsyncs once.

use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use stringlens_core::config;
use stringlens_core::storage::{replay_file, serialize_and_frame, ReplayStats, WalEntry};
use tokio::sync::{mpsc, oneshot, Mutex as AsyncMutex, MutexGuard as AsyncMutexGuard};

struct GroupCommitRequest {
    framed_bytes: Vec<u8>,
    result_tx: oneshot::Sender<io::Result<()>>,
}

/// Append-only log of store mutations, CRC-framed, with group commit.
pub struct WriteAheadLog {
    submit_tx: mpsc::Sender<GroupCommitRequest>,
    write_gate: Arc<parking_lot::RwLock<()>>,
    mutation_lock: AsyncMutex<()>,
    path: PathBuf,
    writer: Arc<Mutex<BufWriter<File>>>,
}

impl WriteAheadLog {
    /// Open or create `<data_dir>/wal.bin` and spawn the batch writer task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(data_dir: &str) -> io::Result<Self> {
        fs::create_dir_all(data_dir)?;
        let path = PathBuf::from(data_dir).join(config::WAL_FILE_NAME);
        let file = open_append(&path)?;
        let writer = Arc::new(Mutex::new(BufWriter::new(file)));
        let write_gate = Arc::new(parking_lot::RwLock::new(()));

        let (submit_tx, submit_rx) = mpsc::channel::<GroupCommitRequest>(4096);

        let task_writer = Arc::clone(&writer);
        let task_gate = Arc::clone(&write_gate);
        tokio::spawn(async move {
            batch_writer_loop(submit_rx, task_writer, task_gate).await;
        });

        Ok(Self {
            submit_tx,
            write_gate,
            mutation_lock: AsyncMutex::new(()),
            path,
            writer,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an entry; resolves once the batch containing it is fsynced.
    pub async fn append(&self, entry: &WalEntry) -> io::Result<()> {
        let framed = serialize_and_frame(entry)?;

        let (result_tx, result_rx) = oneshot::channel();
        self.submit_tx
            .send(GroupCommitRequest {
                framed_bytes: framed,
                result_tx,
            })
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "WAL batch writer stopped"))?;

        result_rx
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "WAL batch result lost"))?
    }

    /// Exclusive right to mutate the store.
    ///
    /// Writers hold the guard across their existence check, [`append`](Self::append)
    /// and the in-memory apply, so the store changes in exactly the order the
    /// log records. Snapshots take it too, so they never see a logged entry
    /// whose in-memory change is still pending.
    pub async fn lock_mutations(&self) -> AsyncMutexGuard<'_, ()> {
        self.mutation_lock.lock().await
    }

    /// Read back every intact entry currently in the log.
    pub fn replay(&self) -> io::Result<(Vec<WalEntry>, ReplayStats)> {
        replay_file(&self.path)
    }

    /// Block all appends until the returned guard is dropped.
    pub fn freeze(&self) -> parking_lot::RwLockWriteGuard<'_, ()> {
        self.write_gate.write()
    }

    /// Truncate the log to zero length, fsync, and reopen in append mode.
    ///
    /// Callers hold the guard from [`freeze`](Self::freeze) across the
    /// snapshot + truncate pair so no entry lands in between.
    pub fn truncate(&self) -> io::Result<()> {
        let mut writer = self.writer.lock();
        let truncated = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        truncated.sync_all()?;
        *writer = BufWriter::new(open_append(&self.path)?);
        Ok(())
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    let mut opts = OpenOptions::new();
    opts.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
    }
    opts.open(path)
}

async fn batch_writer_loop(
    mut rx: mpsc::Receiver<GroupCommitRequest>,
    writer: Arc<Mutex<BufWriter<File>>>,
    write_gate: Arc<parking_lot::RwLock<()>>,
) {
    let max_batch = config::WAL_GROUP_COMMIT_MAX_BATCH;
    let max_wait = Duration::from_micros(config::WAL_GROUP_COMMIT_MAX_WAIT_US);
    let mut batch: Vec<GroupCommitRequest> = Vec::with_capacity(max_batch);

    while let Some(first) = rx.recv().await {
        batch.push(first);

        while batch.len() < max_batch {
            match rx.try_recv() {
                Ok(req) => batch.push(req),
                Err(_) => break,
            }
        }

        // Under contention, linger briefly so more writers share the fsync.
        if batch.len() > 1 && batch.len() < max_batch {
            let deadline = tokio::time::Instant::now() + max_wait;
            while batch.len() < max_batch {
                match tokio::time::timeout_at(deadline, rx.recv()).await {
                    Ok(Some(req)) => batch.push(req),
                    _ => break,
                }
            }
        }

        flush_batch(&mut batch, &writer, &write_gate);
    }
}

fn flush_batch(
    batch: &mut Vec<GroupCommitRequest>,
    writer: &Arc<Mutex<BufWriter<File>>>,
    write_gate: &Arc<parking_lot::RwLock<()>>,
) {
    let _gate = write_gate.read();
    let mut w = writer.lock();

    let result = batch
        .iter()
        .try_for_each(|req| w.write_all(&req.framed_bytes))
        .and_then(|()| w.flush())
        .and_then(|()| w.get_mut().sync_all());

    metrics::histogram!("stringlens_wal_batch_size").record(batch.len() as f64);

    match result {
        Ok(()) => {
            for req in batch.drain(..) {
                let _ = req.result_tx.send(Ok(()));
            }
        }
        Err(e) => {
            tracing::error!(error = %e, entries = batch.len(), "WAL batch write failed");
            for req in batch.drain(..) {
                let _ = req
                    .result_tx
                    .send(Err(io::Error::new(e.kind(), e.to_string())));
            }
        }
    }
}
