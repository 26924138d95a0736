use core::fmt::{self, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};

/// Exact length of every signature id, in hex characters.
pub const SIGNATURE_ID_LEN: usize = 32;

/// Derives a deterministic 32-character hex id from the current wall-clock
/// millisecond and the given signature parts.
///
/// Identical parts within the same millisecond produce the same id — by
/// intent, so repeated events deduplicate naturally. Callers that need true
/// uniqueness must vary at least one part per call (or use
/// [`SnowflakeGenerator`] instead).
///
/// [`SnowflakeGenerator`]: crate::SnowflakeGenerator
pub fn signature_id(parts: &[&dyn fmt::Display]) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before UNIX_EPOCH")
        .as_millis() as u64;
    signature_id_at(now, parts)
}

/// Derives a deterministic 32-character hex id from an explicit millisecond
/// timestamp and the given signature parts.
///
/// The id is the hex encoding of the timestamp followed by as many hex
/// characters of the SHA-256 digest of the concatenated parts as needed to
/// reach exactly [`SIGNATURE_ID_LEN`] characters, zero-padded on the right
/// if the digest runs short. Empty parts contribute nothing to the digest.
///
/// Identical `(timestamp, parts)` inputs always yield identical output. The
/// result is *not* monotonic and is safe for unsynchronized concurrent use.
///
/// # Example
///
/// ```
/// let a = firn::signature_id_at(1000, &[&"user-7", &"article-9"]);
/// let b = firn::signature_id_at(1000, &[&"user-7", &"article-9"]);
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 32);
/// ```
pub fn signature_id_at(timestamp_millis: u64, parts: &[&dyn fmt::Display]) -> String {
    let mut signature = String::new();
    for part in parts {
        // Writing to a String cannot fail.
        let _ = write!(signature, "{part}");
    }
    let digest = hex::encode(Sha256::digest(signature.as_bytes()));

    let mut id = format!("{timestamp_millis:x}");
    let remaining = SIGNATURE_ID_LEN - id.len();
    if digest.len() >= remaining {
        id.push_str(&digest[..remaining]);
    } else {
        id.push_str(&digest);
        while id.len() < SIGNATURE_ID_LEN {
            id.push('0');
        }
    }
    id
}
