//! SHA-256 content digests for artifact integrity checks.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::domain::error::Result;

/// Hex SHA-256 of raw bytes.
pub fn content_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Hex SHA-256 of the compact JSON encoding of `value`.
///
/// Struct fields serialize in declaration order, so equal values always
/// produce equal digests.
pub fn value_digest<T: Serialize>(value: &T) -> Result<String> {
    let bytes = serde_json::to_vec(value)?;
    Ok(content_digest(&bytes))
}
