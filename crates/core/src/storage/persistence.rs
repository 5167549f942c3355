//! Disk persistence for the record store using bincode serialization.
//!
//! The whole store is serialized to a single snapshot file. Writes use atomic
//! temp-file + rename to prevent corruption on crash. A CRC32 checksum is
//! appended as a footer for integrity verification.

use crate::config;
use crate::storage::store::{StoreData, StringStore};
use std::fs;
use std::io;
use std::path::Path;

/// Magic bytes appended before the CRC32 footer.
const SNAPSHOT_CRC_MAGIC: &[u8; 4] = b"SLS1";

/// Save the store to `dir` using bincode serialization with atomic write.
/// Layout: `[bincode payload][magic "SLS1"][u32 CRC32 BE]`.
pub fn save_store(store: &StringStore, dir: &str) -> io::Result<()> {
    let data = store.data.read();
    let bytes = bincode::serialize(&*data).map_err(|e| io::Error::other(e.to_string()))?;
    let record_count = data.records.len();
    drop(data);

    let crc = crc32fast::hash(&bytes);

    fs::create_dir_all(dir)?;
    let path = Path::new(dir).join(config::SNAPSHOT_FILE_NAME);
    let tmp_path = Path::new(dir).join(format!("{}.tmp", config::SNAPSHOT_FILE_NAME));

    let mut output = Vec::with_capacity(bytes.len() + 8);
    output.extend_from_slice(&bytes);
    output.extend_from_slice(SNAPSHOT_CRC_MAGIC);
    output.extend_from_slice(&crc.to_be_bytes());

    fs::write(&tmp_path, &output)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600))?;
    }
    fs::rename(&tmp_path, &path)?;

    tracing::info!(
        records = record_count,
        bytes = bytes.len(),
        "Saved snapshot (CRC32={:#010x})",
        crc
    );
    Ok(())
}

/// Load the store snapshot from `dir`, verifying its CRC32 footer.
///
/// Returns `Ok(None)` when no snapshot exists yet.
pub fn load_store(dir: &str) -> io::Result<Option<StringStore>> {
    let path = Path::new(dir).join(config::SNAPSHOT_FILE_NAME);
    let raw = match fs::read(&path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };

    if raw.len() < 8 || &raw[raw.len() - 8..raw.len() - 4] != SNAPSHOT_CRC_MAGIC {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Snapshot {:?} is missing its CRC32 footer", path),
        ));
    }
    let payload = &raw[..raw.len() - 8];
    let stored_crc = u32::from_be_bytes([
        raw[raw.len() - 4],
        raw[raw.len() - 3],
        raw[raw.len() - 2],
        raw[raw.len() - 1],
    ]);
    let computed_crc = crc32fast::hash(payload);
    if computed_crc != stored_crc {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "Snapshot CRC32 mismatch: expected {:#010x}, got {:#010x}. File may be corrupted: {:?}",
                stored_crc, computed_crc, path
            ),
        ));
    }

    let data: StoreData = bincode::deserialize(payload)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
    data.validate().map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("snapshot validation failed: {}", e),
        )
    })?;

    tracing::info!(records = data.records.len(), "Loaded snapshot");
    Ok(Some(StringStore::from_data(data)))
}
