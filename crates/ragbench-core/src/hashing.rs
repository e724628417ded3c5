//! Content-addressed chunk identifiers.
//!
//! Identical text always hashes to the identical id, regardless of which
//! document or offset it came from.

use sha2::{Digest, Sha256};

const DIGEST_PREFIX_LEN: usize = 12;

/// First 12 lowercase hex chars of SHA-256 over the UTF-8 bytes of `content`.
pub fn content_digest(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    let mut hex = hex::encode(digest);
    hex.truncate(DIGEST_PREFIX_LEN);
    hex
}
