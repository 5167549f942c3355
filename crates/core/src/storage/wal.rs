//! Write-Ahead Log (WAL) entries, framing, and replay.
//!
//! Every mutation is appended to the WAL before being applied in memory.
//! Each entry is framed as `[u32 length BE][u32 CRC32 BE][bincode payload]`.
//! The server owns the file and the fsync policy; this module only defines the
//! format so that writing and replay cannot drift apart.

use crate::config;
use crate::record::StoredRecord;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// A single mutation entry in the write-ahead log.
#[derive(Debug, Serialize, Deserialize)]
pub enum WalEntry {
    /// Store a newly analyzed string.
    InsertRecord { record: StoredRecord },
    /// Delete a record by id.
    DeleteRecord { id: String },
}

/// Diagnostic statistics from a WAL replay.
#[derive(Debug, Default)]
pub struct ReplayStats {
    /// Number of entries successfully deserialized.
    pub success: usize,
    /// Number of entries skipped due to deserialization errors (CRC was valid).
    pub skipped: usize,
    /// Number of CRC mismatches encountered (replay stopped).
    pub crc_errors: usize,
    /// Whether replay was terminated by a truncated entry.
    pub truncated: bool,
}

impl ReplayStats {
    /// Returns `true` if anything was skipped, corrupted, or cut short.
    pub fn has_errors(&self) -> bool {
        self.skipped > 0 || self.crc_errors > 0 || self.truncated
    }
}

/// Serialize a WAL entry into its on-disk frame format:
/// `[u32 len BE][u32 crc32 BE][bincode payload]`.
pub fn serialize_and_frame(entry: &WalEntry) -> io::Result<Vec<u8>> {
    let bytes = bincode::serialize(entry).map_err(|e| io::Error::other(e.to_string()))?;
    if bytes.len() > config::MAX_WAL_FRAME_BYTES {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "WAL entry too large"));
    }
    let len = bytes.len() as u32;
    let crc = crc32fast::hash(&bytes);

    let mut framed = Vec::with_capacity(8 + bytes.len());
    framed.extend_from_slice(&len.to_be_bytes());
    framed.extend_from_slice(&crc.to_be_bytes());
    framed.extend_from_slice(&bytes);
    Ok(framed)
}

/// Read all entries from a WAL file sequentially, verifying CRC32 checksums.
///
/// A missing file replays as empty. Replay stops at the first CRC mismatch or
/// truncated frame; entries before it are still returned.
pub fn replay_file(path: &Path) -> io::Result<(Vec<WalEntry>, ReplayStats)> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Ok((Vec::new(), ReplayStats::default()))
        }
        Err(e) => return Err(e),
    };
    let mut reader = BufReader::new(file);
    let mut entries = Vec::new();
    let mut stats = ReplayStats::default();
    let mut header_buf = [0u8; 8];

    loop {
        match reader.read_exact(&mut header_buf) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e),
        }
        let len = u32::from_be_bytes([header_buf[0], header_buf[1], header_buf[2], header_buf[3]])
            as usize;
        let stored_crc =
            u32::from_be_bytes([header_buf[4], header_buf[5], header_buf[6], header_buf[7]]);
        if len > config::MAX_WAL_FRAME_BYTES {
            tracing::warn!(len, "WAL frame length exceeds limit, stopping replay");
            stats.crc_errors += 1;
            break;
        }
        let mut data = vec![0u8; len];
        match reader.read_exact(&mut data) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                tracing::warn!("WAL truncated mid-entry, stopping replay");
                stats.truncated = true;
                break;
            }
            Err(e) => return Err(e),
        }
        let computed_crc = crc32fast::hash(&data);
        if computed_crc != stored_crc {
            tracing::warn!("WAL entry CRC mismatch, stopping replay");
            stats.crc_errors += 1;
            break;
        }
        match bincode::deserialize::<WalEntry>(&data) {
            Ok(entry) => {
                entries.push(entry);
                stats.success += 1;
            }
            Err(e) => {
                tracing::warn!("WAL entry deserialization failed, skipping: {}", e);
                stats.skipped += 1;
            }
        }
    }

    Ok((entries, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use std::path::PathBuf;

    fn tmp_wal() -> PathBuf {
        let id = uuid::Uuid::new_v4();
        std::env::temp_dir().join(format!("stringlens_wal_{id}.bin"))
    }

    fn write_entries(path: &Path, entries: &[WalEntry]) {
        let mut bytes = Vec::new();
        for entry in entries {
            bytes.extend(serialize_and_frame(entry).unwrap());
        }
        std::fs::write(path, bytes).unwrap();
    }

    fn insert_entry(value: &str) -> WalEntry {
        WalEntry::InsertRecord {
            record: StoredRecord::new(value.into(), analyze(value)),
        }
    }

    #[test]
    fn test_append_and_replay() {
        let path = tmp_wal();
        write_entries(
            &path,
            &[
                insert_entry("hello"),
                WalEntry::DeleteRecord { id: "abc".into() },
            ],
        );

        let (entries, stats) = replay_file(&path).unwrap();
        assert_eq!(stats.success, 2);
        assert!(!stats.has_errors());
        match &entries[0] {
            WalEntry::InsertRecord { record } => {
                assert_eq!(record.value, "hello");
                assert_eq!(record.properties, analyze("hello"));
            }
            _ => panic!("expected InsertRecord"),
        }
        match &entries[1] {
            WalEntry::DeleteRecord { id } => assert_eq!(id, "abc"),
            _ => panic!("expected DeleteRecord"),
        }
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let (entries, stats) = replay_file(&tmp_wal()).unwrap();
        assert!(entries.is_empty());
        assert_eq!(stats.success, 0);
    }

    #[test]
    fn test_crc_corruption_detected() {
        let path = tmp_wal();
        write_entries(&path, &[WalEntry::DeleteRecord { id: "a".into() }]);
        let mut data = std::fs::read(&path).unwrap();
        if data.len() > 10 {
            data[10] ^= 0xFF;
        }
        std::fs::write(&path, &data).unwrap();

        let (entries, stats) = replay_file(&path).unwrap();
        assert!(entries.is_empty());
        assert_eq!(stats.crc_errors, 1);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_truncated_tail_keeps_earlier_entries() {
        let path = tmp_wal();
        write_entries(
            &path,
            &[
                WalEntry::DeleteRecord { id: "first".into() },
                WalEntry::DeleteRecord { id: "second".into() },
            ],
        );
        let data = std::fs::read(&path).unwrap();
        std::fs::write(&path, &data[..data.len() - 3]).unwrap();

        let (entries, stats) = replay_file(&path).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(stats.truncated);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_oversized_frame_header_stops_replay() {
        let path = tmp_wal();
        write_entries(&path, &[WalEntry::DeleteRecord { id: "kept".into() }]);
        let mut data = std::fs::read(&path).unwrap();
        data.extend_from_slice(&u32::MAX.to_be_bytes());
        data.extend_from_slice(&0u32.to_be_bytes());
        data.extend_from_slice(b"junk");
        std::fs::write(&path, &data).unwrap();

        let (entries, stats) = replay_file(&path).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(stats.crc_errors, 1);
        assert!(!stats.truncated);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_serialize_and_frame_format() {
        let entry = WalEntry::DeleteRecord { id: "test".into() };
        let framed = serialize_and_frame(&entry).unwrap();
        let len = u32::from_be_bytes([framed[0], framed[1], framed[2], framed[3]]) as usize;
        let stored_crc = u32::from_be_bytes([framed[4], framed[5], framed[6], framed[7]]);
        let payload = &framed[8..];
        assert_eq!(payload.len(), len);
        assert_eq!(crc32fast::hash(payload), stored_crc);
    }
}
