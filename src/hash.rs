// src/hash.rs

//! SHA-256 helpers for download checksums
//!
//! Checksums are always rendered as 64 lowercase hex characters, which is
//! the form stored in `pkg.info` `checksum` fields.

use sha2::{Digest, Sha256};
use std::io::{self, Read};

/// Length of a SHA-256 digest rendered as hex
pub const SHA256_HEX_LEN: usize = 64;

/// Buffer size for streaming reads (8 KB)
const STREAM_BUFFER_SIZE: usize = 8192;

/// Compute the SHA-256 of an in-memory buffer
#[cfg(test)]
pub(crate) fn sha256(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Compute the SHA-256 of everything a reader yields, without buffering it all
pub fn sha256_reader<R: Read>(mut reader: R) -> io::Result<(String, u64)> {
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; STREAM_BUFFER_SIZE];
    let mut total: u64 = 0;

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..bytes_read]);
        total += bytes_read as u64;
    }

    Ok((hex::encode(hasher.finalize()), total))
}

/// Whether `value` looks like a SHA-256 hex digest
#[cfg(test)]
pub(crate) fn is_sha256_hex(value: &str) -> bool {
    value.len() == SHA256_HEX_LEN && value.chars().all(|c| c.is_ascii_hexdigit())
}
