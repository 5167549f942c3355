//! Storage layer: record store, write-ahead log, and disk persistence.
//!
//! Records live in memory in a [`StringStore`]. Durability is provided by WAL
//! frames (CRC32 + fsync, appended by the server) and a bincode snapshot
//! (atomic temp-file + rename).

/// Disk persistence: snapshot save/load with atomic writes.
pub mod persistence;
/// In-memory record store and the `RecordStore` query trait.
pub mod store;
/// Write-Ahead Log entries, framing, and replay.
pub mod wal;

pub use persistence::{load_store, save_store};
pub use store::{RecordStore, StoreData, StringStore};
pub use wal::{replay_file, serialize_and_frame, ReplayStats, WalEntry};
