//! Global configuration constants for stringlens.
//!
//! All input validation limits and server defaults are defined here.
//! These are compile-time constants; runtime configuration is handled via CLI
//! arguments in the server's `main.rs`.

/// Maximum length of a submitted string value in bytes.
pub const MAX_VALUE_LEN: usize = 100_000;

/// Maximum length of a natural-language query in bytes.
pub const MAX_QUERY_LEN: usize = 1_024;

/// Default HTTP server port.
pub const DEFAULT_PORT: u16 = 3030;

/// Default directory for WAL and snapshot files.
pub const DEFAULT_DATA_DIR: &str = "./data";

/// File name of the write-ahead log inside the data directory.
pub const WAL_FILE_NAME: &str = "wal.bin";

/// File name of the record snapshot inside the data directory.
pub const SNAPSHOT_FILE_NAME: &str = "strings.snap";

/// Default interval (in seconds) between automatic snapshots. 0 = disabled.
pub const DEFAULT_SNAPSHOT_INTERVAL_SECS: u64 = 300;

/// Default graceful shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Per-request timeout in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Global rate limit in requests per second.
pub const RATE_LIMIT_RPS: u64 = 100;

/// Maximum HTTP request body size in bytes (1 MB).
pub const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

/// Maximum number of concurrent in-flight requests.
pub const MAX_CONCURRENT_REQUESTS: usize = 512;

/// Maximum entries per WAL group commit batch before forcing a flush.
pub const WAL_GROUP_COMMIT_MAX_BATCH: usize = 128;

/// Maximum wait time (microseconds) to accumulate WAL entries before flushing.
pub const WAL_GROUP_COMMIT_MAX_WAIT_US: u64 = 1000;

/// Largest WAL frame payload accepted on write or replay (16 MiB).
pub const MAX_WAL_FRAME_BYTES: usize = 16 * 1024 * 1024;
