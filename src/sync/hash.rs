//! Content hashing for unchanged-output detection.
//!
//! Documents read from disk remember the SHA256 of their text. When the
//! rendered output hashes the same, the file on disk needs no rewrite.

use sha2::{Digest, Sha256};

/// SHA256 of `text`, as lowercase hex.
#[must_use]
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Check if rendered output differs from what was read.
///
/// Returns `true` if:
/// - There is no stored hash (document never read from disk)
/// - The current hash differs from the stored hash
#[must_use]
pub fn has_changed(current_hash: &str, stored_hash: Option<&str>) -> bool {
    stored_hash.is_none_or(|h| h != current_hash)
}
