//! Snapshot encoding and snapshot file I/O.
//!
//! A snapshot is a single file holding the full record sequence:
//!
//! ```text
//! magic "MDB\0" | version u8 | body length u64 LE | body crc32 u32 LE | body
//! ```
//!
//! The body is MessagePack with named fields: the payload type name followed
//! by every record (`id`, `deleted`, `payload`).

use crate::error::{Result, StoreError};
use crate::types::Record;
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Magic bytes for snapshot files.
const SNAPSHOT_MAGIC: &[u8; 4] = b"MDB\0";

/// Current snapshot format version.
const SNAPSHOT_VERSION: u8 = 1;

/// Header size (magic + version + body length + checksum).
const SNAPSHOT_HEADER_SIZE: usize = 4 + 1 + 8 + 4;

#[derive(Serialize)]
struct SnapshotRef<'a, T> {
    payload_type: &'a str,
    records: &'a [Record<T>],
}

#[derive(Deserialize)]
struct SnapshotBody<T> {
    payload_type: String,
    records: Vec<Record<T>>,
}

/// Name recorded in the snapshot for payload type `T`.
pub fn payload_type_name<T>() -> &'static str {
    std::any::type_name::<T>()
}

/// Encode records into a complete snapshot image (header and body).
pub fn encode<T: Serialize>(records: &[Record<T>]) -> Result<Vec<u8>> {
    let body = rmp_serde::to_vec_named(&SnapshotRef {
        payload_type: payload_type_name::<T>(),
        records,
    })?;

    let mut out = Vec::with_capacity(SNAPSHOT_HEADER_SIZE + body.len());
    out.extend_from_slice(SNAPSHOT_MAGIC);
    out.push(SNAPSHOT_VERSION);
    out.extend_from_slice(&(body.len() as u64).to_le_bytes());
    out.extend_from_slice(&crc32fast::hash(&body).to_le_bytes());
    out.extend_from_slice(&body);
    Ok(out)
}

/// Decode a snapshot image produced by [`encode`].
pub fn decode<T: DeserializeOwned>(mut reader: impl Read) -> Result<Vec<Record<T>>> {
    let mut header = [0u8; SNAPSHOT_HEADER_SIZE];
    reader.read_exact(&mut header).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => StoreError::InvalidFormat("Truncated snapshot header".into()),
        _ => StoreError::Io(e),
    })?;

    if &header[0..4] != SNAPSHOT_MAGIC {
        return Err(StoreError::InvalidFormat("Invalid snapshot magic".into()));
    }
    if header[4] != SNAPSHOT_VERSION {
        return Err(StoreError::InvalidFormat(format!(
            "Unsupported snapshot version: {}",
            header[4]
        )));
    }

    let mut len_bytes = [0u8; 8];
    len_bytes.copy_from_slice(&header[5..13]);
    let body_len = u64::from_le_bytes(len_bytes);

    let mut crc_bytes = [0u8; 4];
    crc_bytes.copy_from_slice(&header[13..17]);
    let stored_checksum = u32::from_le_bytes(crc_bytes);

    let mut body = Vec::new();
    reader.read_to_end(&mut body)?;
    if body.len() as u64 != body_len {
        return Err(StoreError::InvalidFormat(format!(
            "Snapshot body is {} bytes, header says {}",
            body.len(),
            body_len
        )));
    }

    let computed_checksum = crc32fast::hash(&body);
    if stored_checksum != computed_checksum {
        return Err(StoreError::ChecksumMismatch {
            expected: stored_checksum,
            got: computed_checksum,
        });
    }

    let snapshot: SnapshotBody<T> = rmp_serde::from_slice(&body)?;
    let expected = payload_type_name::<T>();
    if snapshot.payload_type != expected {
        return Err(StoreError::TypeMismatch {
            expected: snapshot.payload_type,
            got: expected.to_string(),
        });
    }

    Ok(snapshot.records)
}

/// Create (or truncate) a snapshot target and hold an exclusive lock on it
/// until the returned file is dropped.
///
/// The previous contents are only discarded once the lock is held, so a
/// reader holding a shared lock keeps seeing a complete snapshot.
pub fn create_target(path: &Path) -> Result<File> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;
    FileExt::lock_exclusive(&file)?;
    file.set_len(0)?;
    Ok(file)
}

/// Write an encoded snapshot image to an open target.
pub fn write_target(file: &File, image: &[u8], sync: bool) -> Result<()> {
    let mut writer = BufWriter::new(file);
    writer.write_all(image)?;
    writer.flush()?;
    if sync {
        file.sync_all()?;
    }
    Ok(())
}

/// Read and decode the snapshot at `path` under a shared lock.
pub fn read_target<T: DeserializeOwned>(path: &Path) -> Result<Vec<Record<T>>> {
    let file = File::open(path)?;
    FileExt::lock_shared(&file)?;
    decode(BufReader::new(&file))
}
