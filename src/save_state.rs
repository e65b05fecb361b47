//! Save state management for the SPU core
//!
//! Snapshots carry every observable register, the per-voice state and the
//! full 512KiB of sample RAM. The serialized body is framed by a small
//! header (magic, version, checksum) and gzip-compressed; the RAM dominates
//! the payload and compresses well.

use crate::error::{Result, SpuError};
use crate::host::Host;
use crate::spu::Spu;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

const SAVE_STATE_VERSION: u32 = 1;
const SAVE_STATE_MAGIC: &[u8; 8] = b"PX1SPUST";
/// Serialized size of `SaveStateHeader`
const HEADER_LEN: usize = 16;

#[derive(Serialize, Deserialize, Debug)]
struct SaveStateHeader {
    magic: [u8; 8],
    version: u32,
    checksum: u32,
}

fn save_state_error(operation: &str, reason: impl ToString) -> SpuError {
    SpuError::SaveStateError {
        operation: operation.to_string(),
        reason: reason.to_string(),
    }
}

/// Serialize the full SPU state into a compressed snapshot
pub fn save(spu: &Spu) -> Result<Vec<u8>> {
    let body = bincode::serialize(spu).map_err(|e| save_state_error("serialize", e))?;

    let header = SaveStateHeader {
        magic: *SAVE_STATE_MAGIC,
        version: SAVE_STATE_VERSION,
        checksum: checksum(&body),
    };
    let header_bytes = bincode::serialize(&header).map_err(|e| save_state_error("serialize", e))?;
    debug_assert_eq!(header_bytes.len(), HEADER_LEN);

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&header_bytes)?;
    encoder.write_all(&body)?;

    encoder
        .finish()
        .map_err(|e| save_state_error("finalize", e))
}

/// Restore a snapshot produced by [`save`], replacing the SPU state
/// wholesale. The audio sink is emptied so stale samples don't play over
/// the restored timeline.
pub fn load(data: &[u8], spu: &mut Spu, host: &mut dyn Host) -> Result<()> {
    let mut decoder = GzDecoder::new(data);
    let mut raw = Vec::new();
    decoder
        .read_to_end(&mut raw)
        .map_err(|e| save_state_error("decompress", e))?;

    if raw.len() < HEADER_LEN {
        return Err(save_state_error("validate", "truncated save state"));
    }

    let header: SaveStateHeader =
        bincode::deserialize(&raw[..HEADER_LEN]).map_err(|e| save_state_error("deserialize", e))?;

    if header.magic != *SAVE_STATE_MAGIC {
        return Err(save_state_error("validate", "invalid magic number"));
    }
    if header.version > SAVE_STATE_VERSION {
        return Err(save_state_error(
            "validate",
            format!("unsupported version: {}", header.version),
        ));
    }

    let body = &raw[HEADER_LEN..];
    if header.checksum != checksum(body) {
        return Err(save_state_error("validate", "checksum mismatch"));
    }

    *spu = bincode::deserialize(body).map_err(|e| save_state_error("deserialize", e))?;

    host.empty_audio_buffers();

    Ok(())
}

/// FNV-1a, enough to catch truncation and bit rot
fn checksum(data: &[u8]) -> u32 {
    let mut hash = 0x811C_9DC5u32;
    for &byte in data {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}
